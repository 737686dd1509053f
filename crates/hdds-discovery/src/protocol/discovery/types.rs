// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::constants::{STATUS_INFO_DISPOSE, STATUS_INFO_UNREGISTER};
use super::qos::Qos;
use crate::core::discovery::{ProtocolVersion, VendorId, GUID};
use crate::transport::Locator;
use std::fmt;
use std::time::Duration;

/// Parse error types for parameter lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    TruncatedData,
    InvalidEncapsulation,
    InvalidFormat,
    EncodingError,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TruncatedData => write!(f, "truncated parameter list"),
            Self::InvalidEncapsulation => write!(f, "unsupported encapsulation"),
            Self::InvalidFormat => write!(f, "malformed parameter"),
            Self::EncodingError => write!(f, "invalid string encoding"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Status info from inline QoS: alive, disposed and/or unregistered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusInfo(pub u32);

impl StatusInfo {
    pub const ALIVE: StatusInfo = StatusInfo(0);
    pub const DISPOSE: StatusInfo = StatusInfo(STATUS_INFO_DISPOSE);
    pub const UNREGISTER: StatusInfo = StatusInfo(STATUS_INFO_UNREGISTER);
    pub const DISPOSE_UNREGISTER: StatusInfo =
        StatusInfo(STATUS_INFO_DISPOSE | STATUS_INFO_UNREGISTER);

    /// Neither dispose nor unregister set. Other bits are ignored.
    pub fn is_alive(self) -> bool {
        self.0 & (STATUS_INFO_DISPOSE | STATUS_INFO_UNREGISTER) == 0
    }
}

/// 16-byte instance key hash. For discovery data it is the GUID.
pub type KeyHash = [u8; 16];

/// Participant version info (PrismTech-compatible vendors).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParticipantVersionInfo {
    pub version: u32,
    pub flags: u32,
    pub unused: [u32; 3],
    /// Free-form "host/version/..." string.
    pub internals: String,
}

/// Presence bits of a [`DiscoveryPayload`], for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Presence(pub u64);

impl Presence {
    pub const PARTICIPANT_GUID: u64 = 1 << 0;
    pub const ENDPOINT_GUID: u64 = 1 << 1;
    pub const GROUP_GUID: u64 = 1 << 2;
    pub const BUILTIN_ENDPOINT_SET: u64 = 1 << 3;
    pub const PRISMTECH_BUILTIN_ENDPOINT_SET: u64 = 1 << 4;
    pub const PROTOCOL_VERSION: u64 = 1 << 5;
    pub const VENDOR_ID: u64 = 1 << 6;
    pub const PARTICIPANT_LEASE_DURATION: u64 = 1 << 7;
    pub const DEFAULT_UNICAST_LOCATOR: u64 = 1 << 8;
    pub const DEFAULT_MULTICAST_LOCATOR: u64 = 1 << 9;
    pub const METATRAFFIC_UNICAST_LOCATOR: u64 = 1 << 10;
    pub const METATRAFFIC_MULTICAST_LOCATOR: u64 = 1 << 11;
    pub const UNICAST_LOCATOR: u64 = 1 << 12;
    pub const MULTICAST_LOCATOR: u64 = 1 << 13;
    pub const ENTITY_NAME: u64 = 1 << 14;
    pub const EXPECTS_INLINE_QOS: u64 = 1 << 15;
    pub const READER_FAVOURS_SSM: u64 = 1 << 16;
    pub const PARTICIPANT_VERSION_INFO: u64 = 1 << 17;
    pub const SERVICE_TYPE: u64 = 1 << 18;
    pub const TYPE_DESCRIPTION: u64 = 1 << 19;
    pub const KEY_HASH: u64 = 1 << 20;
    pub const STATUS_INFO: u64 = 1 << 21;
    pub const TOPIC_NAME: u64 = 1 << 22;
    pub const TYPE_NAME: u64 = 1 << 23;

    pub fn contains(self, bits: u64) -> bool {
        self.0 & bits == bits
    }
}

impl fmt::LowerHex for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// Decoded discovery parameter list (SPDP, SEDP, topic, CM, group).
///
/// Only fields that were on the wire are `Some`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoveryPayload {
    pub participant_guid: Option<GUID>,
    pub endpoint_guid: Option<GUID>,
    pub group_guid: Option<GUID>,
    pub builtin_endpoint_set: Option<u32>,
    pub prismtech_builtin_endpoint_set: Option<u32>,
    pub protocol_version: Option<ProtocolVersion>,
    pub vendor_id: Option<VendorId>,
    pub participant_lease_duration: Option<Duration>,
    pub default_unicast_locators: Vec<Locator>,
    pub default_multicast_locators: Vec<Locator>,
    pub metatraffic_unicast_locators: Vec<Locator>,
    pub metatraffic_multicast_locators: Vec<Locator>,
    pub unicast_locators: Vec<Locator>,
    pub multicast_locators: Vec<Locator>,
    pub entity_name: Option<String>,
    pub expects_inline_qos: Option<bool>,
    pub reader_favours_ssm: Option<bool>,
    pub participant_version_info: Option<ParticipantVersionInfo>,
    pub service_type: Option<u32>,
    pub type_description: Option<String>,
    pub key_hash: Option<KeyHash>,
    pub status_info: Option<StatusInfo>,
    pub qos: Qos,
}

impl DiscoveryPayload {
    pub fn present(&self) -> Presence {
        let mut bits = 0u64;
        let mut set = |cond: bool, bit: u64| {
            if cond {
                bits |= bit;
            }
        };
        set(self.participant_guid.is_some(), Presence::PARTICIPANT_GUID);
        set(self.endpoint_guid.is_some(), Presence::ENDPOINT_GUID);
        set(self.group_guid.is_some(), Presence::GROUP_GUID);
        set(
            self.builtin_endpoint_set.is_some(),
            Presence::BUILTIN_ENDPOINT_SET,
        );
        set(
            self.prismtech_builtin_endpoint_set.is_some(),
            Presence::PRISMTECH_BUILTIN_ENDPOINT_SET,
        );
        set(self.protocol_version.is_some(), Presence::PROTOCOL_VERSION);
        set(self.vendor_id.is_some(), Presence::VENDOR_ID);
        set(
            self.participant_lease_duration.is_some(),
            Presence::PARTICIPANT_LEASE_DURATION,
        );
        set(
            !self.default_unicast_locators.is_empty(),
            Presence::DEFAULT_UNICAST_LOCATOR,
        );
        set(
            !self.default_multicast_locators.is_empty(),
            Presence::DEFAULT_MULTICAST_LOCATOR,
        );
        set(
            !self.metatraffic_unicast_locators.is_empty(),
            Presence::METATRAFFIC_UNICAST_LOCATOR,
        );
        set(
            !self.metatraffic_multicast_locators.is_empty(),
            Presence::METATRAFFIC_MULTICAST_LOCATOR,
        );
        set(!self.unicast_locators.is_empty(), Presence::UNICAST_LOCATOR);
        set(
            !self.multicast_locators.is_empty(),
            Presence::MULTICAST_LOCATOR,
        );
        set(self.entity_name.is_some(), Presence::ENTITY_NAME);
        set(self.expects_inline_qos.is_some(), Presence::EXPECTS_INLINE_QOS);
        set(self.reader_favours_ssm.is_some(), Presence::READER_FAVOURS_SSM);
        set(
            self.participant_version_info.is_some(),
            Presence::PARTICIPANT_VERSION_INFO,
        );
        set(self.service_type.is_some(), Presence::SERVICE_TYPE);
        set(self.type_description.is_some(), Presence::TYPE_DESCRIPTION);
        set(self.key_hash.is_some(), Presence::KEY_HASH);
        set(self.status_info.is_some(), Presence::STATUS_INFO);
        set(self.qos.topic_name.is_some(), Presence::TOPIC_NAME);
        set(self.qos.type_name.is_some(), Presence::TYPE_NAME);
        Presence(bits)
    }

    /// Payload carrying only a key field, as used for dispose/unregister.
    pub fn key_only(pid_field: KeyField, guid: GUID) -> Self {
        let mut payload = Self::default();
        match pid_field {
            KeyField::Participant => payload.participant_guid = Some(guid),
            KeyField::Group => payload.group_guid = Some(guid),
            KeyField::Endpoint => payload.endpoint_guid = Some(guid),
        }
        payload
    }
}

/// Which GUID field identifies the instance of a built-in topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyField {
    Participant,
    Group,
    Endpoint,
}
