// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Proxy participant lease expiration.
//!
//! A background thread sweeps the registry at a fixed interval and deletes
//! every proxy participant whose lease ran out, together with its
//! endpoints, groups and dependent participants.

use super::ProxyRegistry;
use crate::core::discovery::Clock;
use crossbeam::channel::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Background lease sweeper.
///
/// Call `stop()` (or drop it) to signal the thread and wait for the join.
pub struct LeaseSweeper {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl LeaseSweeper {
    /// Spawn the sweeper thread.
    ///
    /// # Errors
    /// Propagates the thread spawn failure.
    pub fn start(
        registry: Arc<ProxyRegistry>,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> std::io::Result<Self> {
        let (stop_tx, stop_rx) = channel::bounded::<()>(1);

        let handle = thread::Builder::new()
            .name("hdds-lease-sweeper".to_string())
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        let expired = registry.expire_leases(clock.now());
                        if !expired.is_empty() {
                            log::debug!("[LEASE] swept {} participant(s)", expired.len());
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // dropping the sender wakes the thread
        self.stop_tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for LeaseSweeper {
    fn drop(&mut self) {
        self.shutdown();
    }
}
