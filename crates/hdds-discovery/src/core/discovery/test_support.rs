// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared fixtures for handler unit tests.

use crate::config::DiscoveryConfig;
use crate::core::discovery::builtin::ReceiverState;
use crate::core::discovery::topic::TopicEvent;
use crate::core::discovery::{
    DiscoveryListener, DiscoveryServices, EntityId, EventQueue, GuidPrefix, LivelinessHandler,
    LocalContext, LocalParticipant, ManualClock, ProxyRegistry, SampleQueue, VendorId, GUID,
};
use crate::protocol::discovery::constants::BES_DEFAULT;
use crate::protocol::discovery::{DiscoveryPayload, StatusInfo};
use crate::transport::Locator;
use parking_lot::Mutex;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

pub(crate) fn guid(n: u8) -> GUID {
    GUID::new(GuidPrefix([n; 12]), EntityId::PARTICIPANT)
}

/// SPDP payload for `guid(n)` reachable at `ip`, with metatraffic multicast.
pub(crate) fn participant_payload(n: u8, ip: Ipv4Addr) -> DiscoveryPayload {
    DiscoveryPayload {
        participant_guid: Some(guid(n)),
        builtin_endpoint_set: Some(BES_DEFAULT),
        vendor_id: Some(VendorId::RTI),
        participant_lease_duration: Some(Duration::from_secs(30)),
        default_unicast_locators: vec![Locator::udpv4(ip, 7411)],
        metatraffic_unicast_locators: vec![Locator::udpv4(ip, 7410)],
        metatraffic_multicast_locators: vec![Locator::udpv4(Ipv4Addr::new(239, 255, 0, 1), 7400)],
        ..Default::default()
    }
}

#[derive(Default)]
pub(crate) struct Recorder {
    pub topics: Mutex<Vec<TopicEvent>>,
    pub pmd: Mutex<Vec<(StatusInfo, Vec<u8>)>>,
}

impl DiscoveryListener for Recorder {
    fn on_topic(&self, event: &TopicEvent) {
        self.topics.lock().push(event.clone());
    }
}

impl LivelinessHandler for Recorder {
    fn handle_pmd(&self, _rst: &ReceiverState, status: StatusInfo, payload: &[u8]) {
        self.pmd.lock().push((status, payload.to_vec()));
    }
}

/// Context on 10.0.0.1/24 plus in-memory collaborators.
pub(crate) struct Harness {
    pub ctx: LocalContext,
    pub registry: Arc<ProxyRegistry>,
    pub events: Arc<EventQueue>,
    pub samples: Arc<SampleQueue>,
    pub clock: Arc<ManualClock>,
    pub recorder: Arc<Recorder>,
    pub svc: DiscoveryServices,
}

impl Harness {
    pub fn new() -> Self {
        let config = DiscoveryConfig::default();
        let ctx = LocalContext::new(config.clone(), "10.0.0.1".parse().expect("ip"))
            .with_interface("eth0", "10.0.0.1/24".parse().expect("cidr"));
        let registry = Arc::new(ProxyRegistry::new(config.deleted_participant_retention));
        let events = Arc::new(EventQueue::new());
        let samples = Arc::new(SampleQueue::new());
        let clock = Arc::new(ManualClock::new(0));
        let recorder = Arc::new(Recorder::default());
        let svc = DiscoveryServices::with_registry(
            Arc::clone(&registry),
            Arc::clone(&events) as _,
            Arc::clone(&samples) as _,
        )
        .with_clock(Arc::clone(&clock) as _)
        .with_listener(Arc::clone(&recorder) as _)
        .with_liveliness(Arc::clone(&recorder) as _);
        Self {
            ctx,
            registry,
            events,
            samples,
            clock,
            recorder,
            svc,
        }
    }

    /// Receiver state for a sample sent by participant prefix `[n; 12]`.
    pub fn rst(&self, n: u8) -> ReceiverState {
        ReceiverState::new(GuidPrefix([n; 12]), VendorId::RTI)
    }

    pub fn add_local(&self, pp: LocalParticipant) {
        self.registry.add_local_participant(pp);
    }
}
