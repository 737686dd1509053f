// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Outbound seams of the discovery core: built-in writers, the
//! participant-message (liveliness) consumer and the application listener.

use crate::core::discovery::builtin::ReceiverState;
use crate::core::discovery::topic::TopicEvent;
use crate::core::discovery::{DiscoveryError, DiscoveryResult, GUID};
use crate::protocol::discovery::{KeyHash, StatusInfo};
use crossbeam::channel::{self, Receiver, Sender, TryRecvError};

/// Serialized discovery sample ready for a built-in writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedSample {
    /// PL_CDR_LE parameter list (GUID-only for end-of-life samples).
    pub payload: Vec<u8>,
    pub status: StatusInfo,
    pub key_hash: KeyHash,
}

/// Hands samples to the built-in writer identified by `writer`.
pub trait SampleWriter: Send + Sync {
    fn write_sample(&self, writer: GUID, sample: SerializedSample) -> DiscoveryResult<()>;
}

/// [`SampleWriter`] backed by a channel to the transmit thread.
pub struct SampleQueue {
    tx: Sender<(GUID, SerializedSample)>,
    rx: Receiver<(GUID, SerializedSample)>,
}

impl SampleQueue {
    pub fn new() -> Self {
        let (tx, rx) = channel::unbounded();
        Self { tx, rx }
    }

    /// Receiver side for the transmit thread.
    pub fn receiver(&self) -> Receiver<(GUID, SerializedSample)> {
        self.rx.clone()
    }

    pub fn try_next(&self) -> Option<(GUID, SerializedSample)> {
        match self.rx.try_recv() {
            Ok(item) => Some(item),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    pub fn drain(&self) -> Vec<(GUID, SerializedSample)> {
        self.rx.try_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Default for SampleQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleWriter for SampleQueue {
    fn write_sample(&self, writer: GUID, sample: SerializedSample) -> DiscoveryResult<()> {
        self.tx
            .send((writer, sample))
            .map_err(|_| DiscoveryError::InvalidData {
                reason: format!("sample queue for {} closed", writer),
            })
    }
}

/// Consumer of participant-message (PMD) samples.
pub trait LivelinessHandler: Send + Sync {
    fn handle_pmd(&self, rst: &ReceiverState, status: StatusInfo, payload: &[u8]);
}

/// Application-facing discovery notifications.
pub trait DiscoveryListener: Send + Sync {
    fn on_topic(&self, event: &TopicEvent);
}

/// Liveliness handler and listener that ignore everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl LivelinessHandler for NoopListener {
    fn handle_pmd(&self, _rst: &ReceiverState, _status: StatusInfo, _payload: &[u8]) {}
}

impl DiscoveryListener for NoopListener {
    fn on_topic(&self, _event: &TopicEvent) {}
}
