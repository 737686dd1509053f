// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Collaborators injected into every discovery handler.

use crate::core::discovery::registry::{ProxyModel, ProxyRegistry, RegistryMetrics};
use crate::core::discovery::scheduler::EventScheduler;
use crate::core::discovery::sink::{
    DiscoveryListener, LivelinessHandler, NoopListener, SampleWriter,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Nanosecond time source.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// Wall clock, nanoseconds since the Unix epoch.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
            .unwrap_or(0)
    }
}

/// Clock moved by hand (tests, simulations).
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start_ns: u64) -> Self {
        Self {
            now: AtomicU64::new(start_ns),
        }
    }

    pub fn set(&self, now_ns: u64) {
        self.now.store(now_ns, Ordering::Release);
    }

    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        let _ = self
            .now
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |t| {
                Some(t.saturating_add(nanos))
            });
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::Acquire)
    }
}

/// Everything a handler reaches outside of its own arguments.
#[derive(Clone)]
pub struct DiscoveryServices {
    pub model: Arc<dyn ProxyModel>,
    pub scheduler: Arc<dyn EventScheduler>,
    pub writer: Arc<dyn SampleWriter>,
    pub liveliness: Arc<dyn LivelinessHandler>,
    pub listener: Arc<dyn DiscoveryListener>,
    pub clock: Arc<dyn Clock>,
    pub metrics: Arc<RegistryMetrics>,
}

impl DiscoveryServices {
    pub fn new(
        model: Arc<dyn ProxyModel>,
        scheduler: Arc<dyn EventScheduler>,
        writer: Arc<dyn SampleWriter>,
    ) -> Self {
        Self {
            model,
            scheduler,
            writer,
            liveliness: Arc::new(NoopListener),
            listener: Arc::new(NoopListener),
            clock: Arc::new(SystemClock),
            metrics: Arc::new(RegistryMetrics::new()),
        }
    }

    /// Services over a [`ProxyRegistry`], sharing its counters.
    pub fn with_registry(
        registry: Arc<ProxyRegistry>,
        scheduler: Arc<dyn EventScheduler>,
        writer: Arc<dyn SampleWriter>,
    ) -> Self {
        let metrics = registry.metrics();
        Self::new(registry, scheduler, writer).with_metrics(metrics)
    }

    pub fn with_liveliness(mut self, handler: Arc<dyn LivelinessHandler>) -> Self {
        self.liveliness = handler;
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn DiscoveryListener>) -> Self {
        self.listener = listener;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<RegistryMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn now(&self) -> u64 {
        self.clock.now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(5);
        assert_eq!(clock.now(), 5);
        clock.advance(Duration::from_millis(2));
        assert_eq!(clock.now(), 2_000_005);
        clock.set(1);
        assert_eq!(clock.now(), 1);
        clock.set(u64::MAX - 1);
        clock.advance(Duration::from_secs(1));
        assert_eq!(clock.now(), u64::MAX);
    }

    #[test]
    fn test_system_clock_is_past_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now() > 1_577_836_800_000_000_000);
    }
}
