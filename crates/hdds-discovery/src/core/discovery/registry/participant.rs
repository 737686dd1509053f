// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Local and proxy participant records.

use crate::core::discovery::{
    AddressSet, DiscoveryError, DiscoveryResult, EndpointCapabilities, EntityId, ProtocolVersion,
    VendorId, GUID,
};
use crate::protocol::discovery::constants::{BES_DEFAULT, PTBES_CM_PARTICIPANT_WRITER};
use crate::protocol::discovery::qos::{Qos, DURATION_INFINITE};
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Behaviour flags derived from a peer's announcement.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct CustomFlags(pub u32);

impl CustomFlags {
    pub const INC_KERNEL_SEQUENCE_NUMBERS: u32 = 1 << 0;
    pub const PARTICIPANT_IS_DDSI2: u32 = 1 << 1;
    /// Placeholder materialized for an endpoint relayed by a discovery service.
    pub const IMPLICITLY_CREATED: u32 = 1 << 2;

    pub fn contains(self, bits: u32) -> bool {
        self.0 & bits == bits
    }

    pub fn with(self, bits: u32) -> Self {
        CustomFlags(self.0 | bits)
    }
}

impl fmt::Debug for CustomFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CustomFlags({:#x})", self.0)
    }
}

/// Nanosecond lease expiry for `now + lease`; infinite leases never expire.
pub(crate) fn lease_deadline(now: u64, lease: Duration) -> u64 {
    if lease == DURATION_INFINITE {
        return u64::MAX;
    }
    let nanos = u64::try_from(lease.as_nanos()).unwrap_or(u64::MAX);
    now.saturating_add(nanos)
}

/// Remote participant learned through SPDP (or implied by a discovery
/// service).
///
/// Fields fixed at creation are public; the lease expiry and the QoS are
/// the only mutable state.
#[derive(Debug)]
pub struct ProxyParticipant {
    pub guid: GUID,
    pub vendor: VendorId,
    pub protocol_version: ProtocolVersion,
    pub capabilities: EndpointCapabilities,
    pub default_locators: AddressSet,
    pub metatraffic_locators: AddressSet,
    pub lease_duration: Duration,
    /// Privileged participant whose lease and SEDP this one relies on.
    pub depends_on: Option<GUID>,
    pub custom_flags: CustomFlags,
    pub entity_name: Option<String>,
    lease_expiry: AtomicU64,
    qos: RwLock<Qos>,
}

impl ProxyParticipant {
    pub fn new(guid: GUID, vendor: VendorId, lease_duration: Duration, now: u64) -> Self {
        Self {
            guid,
            vendor,
            protocol_version: ProtocolVersion::default(),
            capabilities: EndpointCapabilities::default(),
            default_locators: AddressSet::new(),
            metatraffic_locators: AddressSet::new(),
            lease_duration,
            depends_on: None,
            custom_flags: CustomFlags::default(),
            entity_name: None,
            lease_expiry: AtomicU64::new(lease_deadline(now, lease_duration)),
            qos: RwLock::new(Qos::participant_default()),
        }
    }

    pub fn with_capabilities(mut self, caps: EndpointCapabilities) -> Self {
        self.capabilities = caps;
        self
    }

    pub fn with_addresses(mut self, default: AddressSet, meta: AddressSet) -> Self {
        self.default_locators = default;
        self.metatraffic_locators = meta;
        self
    }

    pub fn with_protocol_version(mut self, version: ProtocolVersion) -> Self {
        self.protocol_version = version;
        self
    }

    pub fn with_depends_on(mut self, guid: Option<GUID>) -> Self {
        self.depends_on = guid;
        self
    }

    pub fn with_custom_flags(mut self, flags: CustomFlags) -> Self {
        self.custom_flags = flags;
        self
    }

    pub fn with_entity_name(mut self, name: Option<String>) -> Self {
        self.entity_name = name;
        self
    }

    pub fn with_qos(self, qos: Qos) -> Self {
        *self.qos.write() = qos;
        self
    }

    pub fn renew_lease(&self, now: u64) {
        self.lease_expiry
            .store(lease_deadline(now, self.lease_duration), Ordering::Release);
    }

    pub fn lease_expiry(&self) -> u64 {
        self.lease_expiry.load(Ordering::Acquire)
    }

    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.lease_expiry()
    }

    pub fn qos(&self) -> Qos {
        self.qos.read().clone()
    }

    pub(crate) fn set_qos(&self, qos: Qos) {
        *self.qos.write() = qos;
    }

    pub fn is_implicitly_created(&self) -> bool {
        self.custom_flags.contains(CustomFlags::IMPLICITLY_CREATED)
    }
}

/// Built-in writers every local participant owns.
const DEFAULT_BUILTIN_WRITERS: [EntityId; 8] = [
    EntityId::SPDP_PARTICIPANT_WRITER,
    EntityId::SEDP_PUBLICATIONS_WRITER,
    EntityId::SEDP_SUBSCRIPTIONS_WRITER,
    EntityId::SEDP_TOPIC_WRITER,
    EntityId::P2P_PARTICIPANT_MESSAGE_WRITER,
    EntityId::SEDP_CM_PARTICIPANT_WRITER,
    EntityId::SEDP_CM_PUBLISHER_WRITER,
    EntityId::SEDP_CM_SUBSCRIBER_WRITER,
];

/// Participant hosted by this process.
#[derive(Debug, Clone)]
pub struct LocalParticipant {
    pub guid: GUID,
    pub name: String,
    pub capabilities: EndpointCapabilities,
    pub lease_duration: Duration,
    pub default_locators: AddressSet,
    pub metatraffic_locators: AddressSet,
    pub qos: Qos,
    /// Privileged (DDSI2 service) participant of this process.
    pub privileged: bool,
    pub service_type: Option<u32>,
    pub builtin_writers: Vec<EntityId>,
}

impl LocalParticipant {
    pub fn new(guid: GUID) -> Self {
        Self {
            guid,
            name: String::new(),
            capabilities: EndpointCapabilities::new(
                BES_DEFAULT,
                Some(PTBES_CM_PARTICIPANT_WRITER),
            ),
            lease_duration: crate::config::DEFAULT_LEASE_DURATION,
            default_locators: AddressSet::new(),
            metatraffic_locators: AddressSet::new(),
            qos: Qos::participant_default(),
            privileged: false,
            service_type: None,
            builtin_writers: DEFAULT_BUILTIN_WRITERS.to_vec(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_lease(mut self, lease: Duration) -> Self {
        self.lease_duration = lease;
        self
    }

    pub fn privileged(mut self) -> Self {
        self.privileged = true;
        self
    }

    pub fn without_builtin_writer(mut self, writer: EntityId) -> Self {
        self.builtin_writers.retain(|w| *w != writer);
        self
    }

    /// GUID of the built-in writer `writer` of this participant.
    ///
    /// # Errors
    /// `DiscoveryError::BuiltinWriterMissing` when the participant has no
    /// such writer.
    pub fn builtin_writer(&self, writer: EntityId) -> DiscoveryResult<GUID> {
        if self.builtin_writers.contains(&writer) {
            Ok(GUID::new(self.guid.prefix, writer))
        } else {
            Err(DiscoveryError::BuiltinWriterMissing {
                participant: self.guid.to_string(),
                writer: format!("{:?}", writer),
            })
        }
    }
}
