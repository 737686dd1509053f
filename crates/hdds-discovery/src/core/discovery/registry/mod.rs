// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Proxy object model: remote participants, endpoints and groups.
//!
//! Handlers talk to the model through [`ProxyModel`]; [`ProxyRegistry`] is
//! the in-process implementation. Every map is a `DashMap`, and creation
//! goes through the entry API so two reception threads racing on the same
//! GUID end up sharing one object.

mod endpoint;
mod lease;
mod metrics;
mod participant;

pub use endpoint::{EndpointKind, ProxyEndpoint, ProxyGroup};
pub use lease::LeaseSweeper;
pub use metrics::{MetricsSnapshot, RegistryMetrics};
pub use participant::{CustomFlags, LocalParticipant, ProxyParticipant};

use crate::core::discovery::{AddressSet, DiscoveryError, DiscoveryResult, GUID};
use crate::protocol::discovery::qos::Qos;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on remembered deleted participants.
const TOMBSTONE_CAPACITY: usize = 1024;

/// Operations the discovery handlers need from the entity model.
pub trait ProxyModel: Send + Sync {
    fn local_participant(&self, guid: &GUID) -> Option<LocalParticipant>;

    fn local_participants(&self) -> Vec<LocalParticipant>;

    /// The process's privileged participant, if one exists.
    fn privileged_participant(&self) -> Option<LocalParticipant>;

    fn is_local_participant(&self, guid: &GUID) -> bool {
        self.local_participant(guid).is_some()
    }

    fn proxy_participant(&self, guid: &GUID) -> Option<Arc<ProxyParticipant>>;

    /// Deleted within the retention window. Looped-back announcements of
    /// a participant being torn down must not resurrect it.
    fn is_recently_deleted(&self, guid: &GUID, now: u64) -> bool;

    /// Insert `candidate` unless its GUID is already present. Returns the
    /// live object and whether it was created by this call.
    fn get_or_create_proxy_participant(
        &self,
        candidate: ProxyParticipant,
    ) -> (Arc<ProxyParticipant>, bool);

    fn renew_lease(&self, guid: &GUID, now: u64) -> bool;

    /// Delete a proxy participant with its endpoints, groups and dependent
    /// participants.
    fn delete_proxy_participant(&self, guid: &GUID, now: u64) -> DiscoveryResult<()>;

    fn update_proxy_participant_qos(&self, guid: &GUID, qos: Qos) -> DiscoveryResult<()>;

    fn proxy_endpoint(&self, kind: EndpointKind, guid: &GUID) -> Option<Arc<ProxyEndpoint>>;

    /// # Errors
    /// `ParticipantNotFound` when the owning proxy participant is absent.
    fn create_proxy_endpoint(
        &self,
        endpoint: ProxyEndpoint,
    ) -> DiscoveryResult<(Arc<ProxyEndpoint>, bool)>;

    fn update_endpoint_addresses(
        &self,
        kind: EndpointKind,
        guid: &GUID,
        addresses: &AddressSet,
    ) -> DiscoveryResult<()>;

    fn delete_proxy_endpoint(&self, kind: EndpointKind, guid: &GUID) -> DiscoveryResult<()>;

    fn proxy_group(&self, guid: &GUID) -> Option<Arc<ProxyGroup>>;

    fn create_proxy_group(&self, group: ProxyGroup) -> (Arc<ProxyGroup>, bool);

    /// Refresh a known group from a newer announcement. A non-empty `name`
    /// replaces the stored one; `qos` replaces the stored QoS.
    ///
    /// # Errors
    /// `GroupNotFound` when no group has this GUID.
    fn update_proxy_group(
        &self,
        guid: &GUID,
        name: Option<String>,
        qos: Qos,
    ) -> DiscoveryResult<Arc<ProxyGroup>>;

    fn delete_proxy_group(&self, guid: &GUID) -> DiscoveryResult<()>;

    /// Add the unicast part of `addresses` to the set SPDP is sent to.
    /// Entries are dropped again when the last participant announcing
    /// them is deleted.
    fn add_discovery_locators(&self, addresses: &AddressSet);
}

/// In-memory [`ProxyModel`].
pub struct ProxyRegistry {
    locals: DashMap<GUID, LocalParticipant>,
    participants: DashMap<GUID, Arc<ProxyParticipant>>,
    writers: DashMap<GUID, Arc<ProxyEndpoint>>,
    readers: DashMap<GUID, Arc<ProxyEndpoint>>,
    groups: DashMap<GUID, Arc<ProxyGroup>>,
    /// GUID -> deletion time (ns)
    tombstones: Mutex<LruCache<GUID, u64>>,
    retention_ns: u64,
    discovery_locators: AddressSet,
    metrics: Arc<RegistryMetrics>,
}

impl ProxyRegistry {
    /// `retention` is how long deleted participants stay tombstoned.
    pub fn new(retention: Duration) -> Self {
        let capacity = NonZeroUsize::new(TOMBSTONE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self {
            locals: DashMap::new(),
            participants: DashMap::new(),
            writers: DashMap::new(),
            readers: DashMap::new(),
            groups: DashMap::new(),
            tombstones: Mutex::new(LruCache::new(capacity)),
            retention_ns: u64::try_from(retention.as_nanos()).unwrap_or(u64::MAX),
            discovery_locators: AddressSet::new(),
            metrics: Arc::new(RegistryMetrics::new()),
        }
    }

    pub fn metrics(&self) -> Arc<RegistryMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn add_local_participant(&self, pp: LocalParticipant) {
        log::debug!("[REGISTRY] local participant {}", pp.guid);
        self.locals.insert(pp.guid, pp);
    }

    pub fn remove_local_participant(&self, guid: &GUID) -> Option<LocalParticipant> {
        self.locals.remove(guid).map(|(_, pp)| pp)
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn endpoint_count(&self, kind: EndpointKind) -> usize {
        self.endpoints(kind).len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Locators SPDP announcements are sent to (unicast peers without
    /// multicast).
    pub fn discovery_locators(&self) -> &AddressSet {
        &self.discovery_locators
    }

    pub fn proxy_participants(&self) -> Vec<Arc<ProxyParticipant>> {
        self.participants.iter().map(|e| Arc::clone(e.value())).collect()
    }

    /// Delete every proxy participant whose lease ran out by `now`.
    ///
    /// Returns the GUIDs that expired; their dependents are removed with
    /// them.
    pub fn expire_leases(&self, now: u64) -> Vec<GUID> {
        let expired: Vec<GUID> = self
            .participants
            .iter()
            .filter(|e| e.value().is_expired(now))
            .map(|e| *e.key())
            .collect();

        let mut removed = Vec::with_capacity(expired.len());
        for guid in expired {
            // may already be gone as a dependent of an earlier one
            if self.delete_proxy_participant(&guid, now).is_ok() {
                log::info!("[LEASE] participant {} expired", guid);
                self.metrics.record_lease_expired();
                removed.push(guid);
            }
        }
        removed
    }

    fn endpoints(&self, kind: EndpointKind) -> &DashMap<GUID, Arc<ProxyEndpoint>> {
        match kind {
            EndpointKind::Writer => &self.writers,
            EndpointKind::Reader => &self.readers,
        }
    }

    fn tombstone(&self, guid: GUID, now: u64) {
        self.tombstones.lock().put(guid, now);
    }

    /// Forget discovery locators of a deleted participant that no
    /// remaining participant announces.
    fn prune_discovery_locators(&self, meta: &AddressSet) {
        for loc in meta.unicast() {
            let shared = self
                .participants
                .iter()
                .any(|e| e.value().metatraffic_locators.contains(&loc));
            if !shared && self.discovery_locators.remove(&loc) {
                log::debug!("[REGISTRY] discovery locator {} dropped", loc);
            }
        }
    }
}

impl Default for ProxyRegistry {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

impl ProxyModel for ProxyRegistry {
    fn local_participant(&self, guid: &GUID) -> Option<LocalParticipant> {
        self.locals.get(guid).map(|e| e.value().clone())
    }

    fn local_participants(&self) -> Vec<LocalParticipant> {
        let mut all: Vec<LocalParticipant> =
            self.locals.iter().map(|e| e.value().clone()).collect();
        all.sort_by_key(|pp| pp.guid.as_bytes());
        all
    }

    fn privileged_participant(&self) -> Option<LocalParticipant> {
        self.locals
            .iter()
            .find(|e| e.value().privileged)
            .map(|e| e.value().clone())
    }

    fn proxy_participant(&self, guid: &GUID) -> Option<Arc<ProxyParticipant>> {
        self.participants.get(guid).map(|e| Arc::clone(e.value()))
    }

    fn is_recently_deleted(&self, guid: &GUID, now: u64) -> bool {
        let mut tombstones = self.tombstones.lock();
        match tombstones.peek(guid).copied() {
            Some(deleted_at) if now.saturating_sub(deleted_at) < self.retention_ns => true,
            Some(_) => {
                tombstones.pop(guid);
                false
            }
            None => false,
        }
    }

    fn get_or_create_proxy_participant(
        &self,
        candidate: ProxyParticipant,
    ) -> (Arc<ProxyParticipant>, bool) {
        match self.participants.entry(candidate.guid) {
            Entry::Occupied(e) => (Arc::clone(e.get()), false),
            Entry::Vacant(v) => {
                let pp = Arc::new(candidate);
                v.insert(Arc::clone(&pp));
                self.metrics.record_participant_created();
                (pp, true)
            }
        }
    }

    fn renew_lease(&self, guid: &GUID, now: u64) -> bool {
        match self.participants.get(guid) {
            Some(pp) => {
                pp.renew_lease(now);
                self.metrics.record_lease_renewed();
                true
            }
            None => false,
        }
    }

    fn delete_proxy_participant(&self, guid: &GUID, now: u64) -> DiscoveryResult<()> {
        let Some((_, pp)) = self.participants.remove(guid) else {
            return Err(DiscoveryError::ParticipantNotFound {
                guid: guid.to_string(),
            });
        };
        self.tombstone(*guid, now);
        self.metrics.record_participant_deleted();
        self.prune_discovery_locators(&pp.metatraffic_locators);

        for map in [&self.writers, &self.readers] {
            let before = map.len();
            map.retain(|_, ep| ep.participant_guid() != *guid);
            for _ in map.len()..before {
                self.metrics.record_endpoint_deleted();
            }
        }
        let before = self.groups.len();
        self.groups.retain(|_, g| g.participant_guid() != *guid);
        for _ in self.groups.len()..before {
            self.metrics.record_group_deleted();
        }

        let dependents: Vec<GUID> = self
            .participants
            .iter()
            .filter(|e| e.value().depends_on == Some(*guid))
            .map(|e| *e.key())
            .collect();
        for dep in dependents {
            log::debug!("[REGISTRY] deleting {} (depends on {})", dep, guid);
            if let Err(e) = self.delete_proxy_participant(&dep, now) {
                log::debug!("[REGISTRY] dependent {} already gone: {}", dep, e);
            }
        }
        Ok(())
    }

    fn update_proxy_participant_qos(&self, guid: &GUID, qos: Qos) -> DiscoveryResult<()> {
        let pp = self
            .participants
            .get(guid)
            .ok_or_else(|| DiscoveryError::ParticipantNotFound {
                guid: guid.to_string(),
            })?;
        pp.set_qos(qos);
        Ok(())
    }

    fn proxy_endpoint(&self, kind: EndpointKind, guid: &GUID) -> Option<Arc<ProxyEndpoint>> {
        self.endpoints(kind).get(guid).map(|e| Arc::clone(e.value()))
    }

    fn create_proxy_endpoint(
        &self,
        endpoint: ProxyEndpoint,
    ) -> DiscoveryResult<(Arc<ProxyEndpoint>, bool)> {
        let ppguid = endpoint.participant_guid();
        if !self.participants.contains_key(&ppguid) {
            return Err(DiscoveryError::ParticipantNotFound {
                guid: ppguid.to_string(),
            });
        }
        match self.endpoints(endpoint.kind).entry(endpoint.guid) {
            Entry::Occupied(e) => Ok((Arc::clone(e.get()), false)),
            Entry::Vacant(v) => {
                let ep = Arc::new(endpoint);
                v.insert(Arc::clone(&ep));
                self.metrics.record_endpoint_created();
                Ok((ep, true))
            }
        }
    }

    fn update_endpoint_addresses(
        &self,
        kind: EndpointKind,
        guid: &GUID,
        addresses: &AddressSet,
    ) -> DiscoveryResult<()> {
        let ep = self
            .endpoints(kind)
            .get(guid)
            .ok_or_else(|| DiscoveryError::EndpointNotFound {
                guid: guid.to_string(),
            })?;
        ep.addresses.replace_with(addresses);
        self.metrics.record_endpoint_updated();
        Ok(())
    }

    fn delete_proxy_endpoint(&self, kind: EndpointKind, guid: &GUID) -> DiscoveryResult<()> {
        match self.endpoints(kind).remove(guid) {
            Some(_) => {
                self.metrics.record_endpoint_deleted();
                Ok(())
            }
            None => Err(DiscoveryError::EndpointNotFound {
                guid: guid.to_string(),
            }),
        }
    }

    fn proxy_group(&self, guid: &GUID) -> Option<Arc<ProxyGroup>> {
        self.groups.get(guid).map(|e| Arc::clone(e.value()))
    }

    fn create_proxy_group(&self, group: ProxyGroup) -> (Arc<ProxyGroup>, bool) {
        match self.groups.entry(group.guid) {
            Entry::Occupied(e) => (Arc::clone(e.get()), false),
            Entry::Vacant(v) => {
                let g = Arc::new(group);
                v.insert(Arc::clone(&g));
                self.metrics.record_group_created();
                (g, true)
            }
        }
    }

    fn update_proxy_group(
        &self,
        guid: &GUID,
        name: Option<String>,
        qos: Qos,
    ) -> DiscoveryResult<Arc<ProxyGroup>> {
        let mut entry = self
            .groups
            .get_mut(guid)
            .ok_or_else(|| DiscoveryError::GroupNotFound {
                guid: guid.to_string(),
            })?;
        let mut group = ProxyGroup::clone(entry.value());
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            group.name = name;
        }
        group.qos = qos;
        let group = Arc::new(group);
        *entry.value_mut() = Arc::clone(&group);
        self.metrics.record_group_updated();
        Ok(group)
    }

    fn delete_proxy_group(&self, guid: &GUID) -> DiscoveryResult<()> {
        match self.groups.remove(guid) {
            Some(_) => {
                self.metrics.record_group_deleted();
                Ok(())
            }
            None => Err(DiscoveryError::GroupNotFound {
                guid: guid.to_string(),
            }),
        }
    }

    fn add_discovery_locators(&self, addresses: &AddressSet) {
        self.discovery_locators.merge_uc_from(addresses);
    }
}
