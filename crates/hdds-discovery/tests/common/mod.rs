// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared fixtures for the integration tests.

#![allow(dead_code)] // Not every test binary uses every helper

use hdds_discovery::config::DiscoveryConfig;
use hdds_discovery::core::discovery::{
    AddressSet, BuiltinDispatcher, BuiltinSample, DiscoveryResult, DiscoveryServices, EndpointKind,
    EntityId, EventQueue, GuidPrefix, LocalContext, LocalParticipant, ManualClock, ProxyEndpoint,
    ProxyGroup, ProxyModel, ProxyParticipant, ProxyRegistry, ReceiverState, SampleQueue,
    VendorId, GUID,
};
use hdds_discovery::protocol::discovery::constants::BES_DEFAULT;
use hdds_discovery::protocol::discovery::qos::Qos;
use hdds_discovery::protocol::discovery::{encode, DiscoveryPayload};
use hdds_discovery::transport::Locator;
use parking_lot::Mutex;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

pub fn prefix(n: u8) -> GuidPrefix {
    GuidPrefix([n; 12])
}

pub fn participant(n: u8) -> GUID {
    GUID::new(prefix(n), EntityId::PARTICIPANT)
}

pub fn writer(n: u8, key: u8) -> GUID {
    GUID::new(prefix(n), EntityId([0, 0, key, 0x02]))
}

pub fn reader(n: u8, key: u8) -> GUID {
    GUID::new(prefix(n), EntityId([0, 0, key, 0x07]))
}

pub fn v4(a: u8, b: u8, c: u8, d: u8, port: u16) -> Locator {
    Locator::udpv4(Ipv4Addr::new(a, b, c, d), port)
}

/// SPDP payload advertising both SEDP announcers and a single unicast
/// locator for data and metatraffic.
pub fn spdp_payload(guid: GUID, unicast: Locator, lease: Duration) -> DiscoveryPayload {
    DiscoveryPayload {
        participant_guid: Some(guid),
        builtin_endpoint_set: Some(BES_DEFAULT),
        vendor_id: Some(VendorId::EPROSIMA),
        participant_lease_duration: Some(lease),
        default_unicast_locators: vec![unicast],
        metatraffic_unicast_locators: vec![unicast],
        ..Default::default()
    }
}

/// Publication announcement for `guid` on topic "Square".
pub fn sedp_payload(guid: GUID, unicast: Option<Locator>) -> DiscoveryPayload {
    let mut data = DiscoveryPayload {
        endpoint_guid: Some(guid),
        unicast_locators: unicast.into_iter().collect(),
        ..Default::default()
    };
    data.qos.topic_name = Some("Square".into());
    data.qos.type_name = Some("ShapeType".into());
    data
}

/// Model call as observed by [`RecordingModel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateParticipant(GUID),
    RenewLease(GUID),
    DeleteParticipant(GUID),
    CreateEndpoint(EndpointKind, GUID),
    UpdateEndpoint(EndpointKind, GUID),
    DeleteEndpoint(EndpointKind, GUID),
    CreateGroup(GUID),
    UpdateGroup(GUID),
    DeleteGroup(GUID),
}

/// [`ProxyModel`] that forwards to a [`ProxyRegistry`] and records every
/// mutating call.
pub struct RecordingModel {
    pub inner: Arc<ProxyRegistry>,
    pub calls: Mutex<Vec<Call>>,
}

impl RecordingModel {
    pub fn new(inner: Arc<ProxyRegistry>) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.lock().iter().filter(|c| *c == call).count()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

impl ProxyModel for RecordingModel {
    fn local_participant(&self, guid: &GUID) -> Option<LocalParticipant> {
        self.inner.local_participant(guid)
    }

    fn local_participants(&self) -> Vec<LocalParticipant> {
        self.inner.local_participants()
    }

    fn privileged_participant(&self) -> Option<LocalParticipant> {
        self.inner.privileged_participant()
    }

    fn proxy_participant(&self, guid: &GUID) -> Option<Arc<ProxyParticipant>> {
        self.inner.proxy_participant(guid)
    }

    fn is_recently_deleted(&self, guid: &GUID, now: u64) -> bool {
        self.inner.is_recently_deleted(guid, now)
    }

    fn get_or_create_proxy_participant(
        &self,
        candidate: ProxyParticipant,
    ) -> (Arc<ProxyParticipant>, bool) {
        let guid = candidate.guid;
        let (pp, created) = self.inner.get_or_create_proxy_participant(candidate);
        if created {
            self.record(Call::CreateParticipant(guid));
        }
        (pp, created)
    }

    fn renew_lease(&self, guid: &GUID, now: u64) -> bool {
        let renewed = self.inner.renew_lease(guid, now);
        if renewed {
            self.record(Call::RenewLease(*guid));
        }
        renewed
    }

    fn delete_proxy_participant(&self, guid: &GUID, now: u64) -> DiscoveryResult<()> {
        self.record(Call::DeleteParticipant(*guid));
        self.inner.delete_proxy_participant(guid, now)
    }

    fn update_proxy_participant_qos(&self, guid: &GUID, qos: Qos) -> DiscoveryResult<()> {
        self.inner.update_proxy_participant_qos(guid, qos)
    }

    fn proxy_endpoint(&self, kind: EndpointKind, guid: &GUID) -> Option<Arc<ProxyEndpoint>> {
        self.inner.proxy_endpoint(kind, guid)
    }

    fn create_proxy_endpoint(
        &self,
        endpoint: ProxyEndpoint,
    ) -> DiscoveryResult<(Arc<ProxyEndpoint>, bool)> {
        let call = Call::CreateEndpoint(endpoint.kind, endpoint.guid);
        let result = self.inner.create_proxy_endpoint(endpoint);
        if matches!(result, Ok((_, true))) {
            self.record(call);
        }
        result
    }

    fn update_endpoint_addresses(
        &self,
        kind: EndpointKind,
        guid: &GUID,
        addresses: &AddressSet,
    ) -> DiscoveryResult<()> {
        self.record(Call::UpdateEndpoint(kind, *guid));
        self.inner.update_endpoint_addresses(kind, guid, addresses)
    }

    fn delete_proxy_endpoint(&self, kind: EndpointKind, guid: &GUID) -> DiscoveryResult<()> {
        self.record(Call::DeleteEndpoint(kind, *guid));
        self.inner.delete_proxy_endpoint(kind, guid)
    }

    fn proxy_group(&self, guid: &GUID) -> Option<Arc<ProxyGroup>> {
        self.inner.proxy_group(guid)
    }

    fn create_proxy_group(&self, group: ProxyGroup) -> (Arc<ProxyGroup>, bool) {
        let guid = group.guid;
        let (g, created) = self.inner.create_proxy_group(group);
        if created {
            self.record(Call::CreateGroup(guid));
        }
        (g, created)
    }

    fn update_proxy_group(
        &self,
        guid: &GUID,
        name: Option<String>,
        qos: Qos,
    ) -> DiscoveryResult<Arc<ProxyGroup>> {
        self.record(Call::UpdateGroup(*guid));
        self.inner.update_proxy_group(guid, name, qos)
    }

    fn delete_proxy_group(&self, guid: &GUID) -> DiscoveryResult<()> {
        self.record(Call::DeleteGroup(*guid));
        self.inner.delete_proxy_group(guid)
    }

    fn add_discovery_locators(&self, addresses: &AddressSet) {
        self.inner.add_discovery_locators(addresses);
    }
}

/// Context on 10.0.0.1/24 wired to a recording registry.
pub struct Node {
    pub ctx: LocalContext,
    pub registry: Arc<ProxyRegistry>,
    pub model: Arc<RecordingModel>,
    pub events: Arc<EventQueue>,
    pub samples: Arc<SampleQueue>,
    pub clock: Arc<ManualClock>,
    pub svc: DiscoveryServices,
}

impl Node {
    pub fn new() -> Self {
        Self::with_config(DiscoveryConfig::default())
    }

    pub fn with_config(config: DiscoveryConfig) -> Self {
        let ctx = LocalContext::new(config.clone(), "10.0.0.1".parse().expect("ip"))
            .with_interface("eth0", "10.0.0.1/24".parse().expect("cidr"));
        let registry = Arc::new(ProxyRegistry::new(config.deleted_participant_retention));
        let model = Arc::new(RecordingModel::new(Arc::clone(&registry)));
        let events = Arc::new(EventQueue::new());
        let samples = Arc::new(SampleQueue::new());
        let clock = Arc::new(ManualClock::new(1_000_000_000));
        let svc = DiscoveryServices::new(
            Arc::clone(&model) as _,
            Arc::clone(&events) as _,
            Arc::clone(&samples) as _,
        )
        .with_metrics(registry.metrics())
        .with_clock(Arc::clone(&clock) as _);
        Self {
            ctx,
            registry,
            model,
            events,
            samples,
            clock,
            svc,
        }
    }

    pub fn dispatcher(&self) -> BuiltinDispatcher {
        BuiltinDispatcher::new(self.ctx.clone(), self.svc.clone())
    }
}

/// Receiver state for a sample from prefix `[n; 12]`.
pub fn rst(n: u8, vendor: VendorId) -> ReceiverState {
    ReceiverState::new(prefix(n), vendor)
}

/// DATA sample from `[n; 12]` on `writer` carrying `data`.
pub fn sample(n: u8, vendor: VendorId, writer: EntityId, data: &DiscoveryPayload) -> BuiltinSample {
    BuiltinSample::data(rst(n, vendor), writer, encode(data, vendor).expect("encode"))
}
