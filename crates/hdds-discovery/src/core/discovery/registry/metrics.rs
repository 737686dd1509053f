// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registry counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters for proxy lifecycle events.
#[derive(Debug, Default)]
pub struct RegistryMetrics {
    participants_created: AtomicU64,
    participants_deleted: AtomicU64,
    leases_renewed: AtomicU64,
    leases_expired: AtomicU64,
    endpoints_created: AtomicU64,
    endpoints_updated: AtomicU64,
    endpoints_deleted: AtomicU64,
    groups_created: AtomicU64,
    groups_updated: AtomicU64,
    groups_deleted: AtomicU64,
    samples_dropped: AtomicU64,
}

/// Point-in-time copy of [`RegistryMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub participants_created: u64,
    pub participants_deleted: u64,
    pub leases_renewed: u64,
    pub leases_expired: u64,
    pub endpoints_created: u64,
    pub endpoints_updated: u64,
    pub endpoints_deleted: u64,
    pub groups_created: u64,
    pub groups_updated: u64,
    pub groups_deleted: u64,
    pub samples_dropped: u64,
}

macro_rules! counter {
    ($($incr:ident => $field:ident),* $(,)?) => {
        $(
            pub fn $incr(&self) {
                self.$field.fetch_add(1, Ordering::Relaxed);
            }
        )*
    };
}

impl RegistryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    counter!(
        record_participant_created => participants_created,
        record_participant_deleted => participants_deleted,
        record_lease_renewed => leases_renewed,
        record_lease_expired => leases_expired,
        record_endpoint_created => endpoints_created,
        record_endpoint_updated => endpoints_updated,
        record_endpoint_deleted => endpoints_deleted,
        record_group_created => groups_created,
        record_group_updated => groups_updated,
        record_group_deleted => groups_deleted,
        record_drop => samples_dropped,
    );

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            participants_created: self.participants_created.load(Ordering::Relaxed),
            participants_deleted: self.participants_deleted.load(Ordering::Relaxed),
            leases_renewed: self.leases_renewed.load(Ordering::Relaxed),
            leases_expired: self.leases_expired.load(Ordering::Relaxed),
            endpoints_created: self.endpoints_created.load(Ordering::Relaxed),
            endpoints_updated: self.endpoints_updated.load(Ordering::Relaxed),
            endpoints_deleted: self.endpoints_deleted.load(Ordering::Relaxed),
            groups_created: self.groups_created.load(Ordering::Relaxed),
            groups_updated: self.groups_updated.load(Ordering::Relaxed),
            groups_deleted: self.groups_deleted.load(Ordering::Relaxed),
            samples_dropped: self.samples_dropped.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let m = RegistryMetrics::new();
        m.record_participant_created();
        m.record_participant_created();
        m.record_drop();
        let snap = m.snapshot();
        assert_eq!(snap.participants_created, 2);
        assert_eq!(snap.samples_dropped, 1);
        assert_eq!(snap.endpoints_created, 0);
    }
}
