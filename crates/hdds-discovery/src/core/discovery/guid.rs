// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! RTPS GUID, GUID prefix and entity id.

use std::fmt;

/// 12-byte GUID prefix identifying a participant (host/process unique).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct GuidPrefix(pub [u8; 12]);

impl GuidPrefix {
    pub const ZERO: GuidPrefix = GuidPrefix([0; 12]);

    /// Prefix as three big-endian 32-bit words.
    pub fn words(&self) -> [u32; 3] {
        let b = &self.0;
        [
            u32::from_be_bytes([b[0], b[1], b[2], b[3]]),
            u32::from_be_bytes([b[4], b[5], b[6], b[7]]),
            u32::from_be_bytes([b[8], b[9], b[10], b[11]]),
        ]
    }

    /// A zero prefix marks a multicast (undirected) destination.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl fmt::Debug for GuidPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.words();
        write!(f, "{:x}:{:x}:{:x}", a, b, c)
    }
}

/// Entity id: 3-byte key followed by the entity kind octet.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct EntityId(pub [u8; 4]);

/// Entity kind bits selecting the entity source.
pub const ENTITY_SOURCE_MASK: u8 = 0xc0;
pub const ENTITY_SOURCE_USER: u8 = 0x00;
pub const ENTITY_SOURCE_BUILTIN: u8 = 0xc0;
pub const ENTITY_SOURCE_VENDOR: u8 = 0x40;

/// Entity kind bits selecting the entity type.
pub const ENTITY_KIND_MASK: u8 = 0x3f;
pub const ENTITY_KIND_PARTICIPANT: u8 = 0x01;
pub const ENTITY_KIND_WRITER_WITH_KEY: u8 = 0x02;
pub const ENTITY_KIND_WRITER_NO_KEY: u8 = 0x03;
pub const ENTITY_KIND_READER_NO_KEY: u8 = 0x04;
pub const ENTITY_KIND_READER_WITH_KEY: u8 = 0x07;
pub const ENTITY_KIND_PRISMTECH_PUBLISHER: u8 = 0x0a;
pub const ENTITY_KIND_PRISMTECH_SUBSCRIBER: u8 = 0x0b;

impl EntityId {
    pub const UNKNOWN: EntityId = EntityId([0x00, 0x00, 0x00, 0x00]);
    pub const PARTICIPANT: EntityId = EntityId([0x00, 0x00, 0x01, 0xc1]);
    pub const SPDP_PARTICIPANT_WRITER: EntityId = EntityId([0x00, 0x01, 0x00, 0xc2]);
    pub const SEDP_TOPIC_WRITER: EntityId = EntityId([0x00, 0x00, 0x02, 0xc2]);
    pub const SEDP_PUBLICATIONS_WRITER: EntityId = EntityId([0x00, 0x00, 0x03, 0xc2]);
    pub const SEDP_SUBSCRIPTIONS_WRITER: EntityId = EntityId([0x00, 0x00, 0x04, 0xc2]);
    pub const P2P_PARTICIPANT_MESSAGE_WRITER: EntityId = EntityId([0x00, 0x02, 0x00, 0xc2]);
    pub const SEDP_CM_PARTICIPANT_WRITER: EntityId = EntityId([0xff, 0x00, 0x01, 0xc2]);
    pub const SEDP_CM_PUBLISHER_WRITER: EntityId = EntityId([0xff, 0x00, 0x03, 0xc2]);
    pub const SEDP_CM_SUBSCRIBER_WRITER: EntityId = EntityId([0xff, 0x00, 0x04, 0xc2]);

    pub fn from_u32(value: u32) -> Self {
        Self(value.to_be_bytes())
    }

    pub fn as_u32(&self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    pub fn kind(&self) -> u8 {
        self.0[3]
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 4]
    }

    pub fn is_vendor_specific(&self) -> bool {
        self.kind() & ENTITY_SOURCE_MASK == ENTITY_SOURCE_VENDOR
    }

    pub fn is_writer(&self) -> bool {
        matches!(
            self.kind() & ENTITY_KIND_MASK,
            ENTITY_KIND_WRITER_WITH_KEY | ENTITY_KIND_WRITER_NO_KEY
        )
    }

    pub fn is_reader(&self) -> bool {
        matches!(
            self.kind() & ENTITY_KIND_MASK,
            ENTITY_KIND_READER_NO_KEY | ENTITY_KIND_READER_WITH_KEY
        )
    }

    /// Whether this id names a built-in entity for a peer of `vendor`.
    ///
    /// PrismTech-compatible peers also mark their CM publisher/subscriber
    /// groups as vendor-specific built-ins.
    pub fn is_builtin(&self, vendor: super::VendorId) -> bool {
        match self.kind() & ENTITY_SOURCE_MASK {
            ENTITY_SOURCE_BUILTIN => true,
            ENTITY_SOURCE_VENDOR if vendor.is_prismtech_compatible() => matches!(
                self.kind() & ENTITY_KIND_MASK,
                ENTITY_KIND_PRISMTECH_PUBLISHER | ENTITY_KIND_PRISMTECH_SUBSCRIBER
            ),
            _ => false,
        }
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.as_u32())
    }
}

/// RTPS GUID (Globally Unique Identifier)
///
/// 16-byte identifier following DDS-RTPS v2.3 spec.
///
/// # Structure
/// - Prefix: 12 bytes (host/vendor unique)
/// - Entity ID: 4 bytes (entity within participant)
///
/// # Display Format
/// Hex with dots: "01.0f.ac.10.00.00.00.00.00.00.00.01.00.00.01.c1"
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct GUID {
    pub prefix: GuidPrefix,
    pub entity_id: EntityId,
}

impl GUID {
    /// Create GUID from raw bytes (16 bytes total)
    ///
    /// # Examples
    /// ```
    /// use hdds_discovery::core::discovery::{EntityId, GUID};
    ///
    /// let bytes = [1, 15, 172, 16, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 1, 193];
    /// let guid = GUID::from_bytes(bytes);
    /// assert_eq!(guid.entity_id, EntityId::PARTICIPANT);
    /// ```
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        let mut prefix = [0u8; 12];
        let mut entity_id = [0u8; 4];
        prefix.copy_from_slice(&bytes[0..12]);
        entity_id.copy_from_slice(&bytes[12..16]);
        Self {
            prefix: GuidPrefix(prefix),
            entity_id: EntityId(entity_id),
        }
    }

    pub fn new(prefix: GuidPrefix, entity_id: EntityId) -> Self {
        Self { prefix, entity_id }
    }

    /// Participant GUID sharing this GUID's prefix.
    pub fn participant(&self) -> GUID {
        GUID::new(self.prefix, EntityId::PARTICIPANT)
    }

    /// Convert GUID to 16-byte array
    pub fn as_bytes(&self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        bytes[0..12].copy_from_slice(&self.prefix.0);
        bytes[12..16].copy_from_slice(&self.entity_id.0);
        bytes
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.prefix.is_zero() && self.entity_id.is_zero()
    }
}

impl fmt::Display for GUID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.prefix.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        for byte in &self.entity_id.0 {
            write!(f, ".{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for GUID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GUID({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::discovery::VendorId;

    #[test]
    fn test_guid_roundtrip_bytes() {
        let bytes = [1, 15, 172, 16, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 1, 193];
        let guid = GUID::from_bytes(bytes);
        assert_eq!(guid.as_bytes(), bytes);
        assert_eq!(guid.entity_id, EntityId::PARTICIPANT);
    }

    #[test]
    fn test_guid_display() {
        let guid = GUID::from_bytes([1, 15, 172, 16, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 1, 193]);
        assert_eq!(
            guid.to_string(),
            "01.0f.ac.10.00.00.00.00.00.00.00.01.00.00.01.c1"
        );
    }

    #[test]
    fn test_guid_zero() {
        assert!(GUID::zero().is_zero());
        let guid = GUID::new(GuidPrefix([1; 12]), EntityId::PARTICIPANT);
        assert!(!guid.is_zero());
    }

    #[test]
    fn test_prefix_words_are_big_endian() {
        let prefix = GuidPrefix([0, 0, 0, 1, 0, 0, 0, 2, 0x10, 0, 0, 0]);
        assert_eq!(prefix.words(), [1, 2, 0x1000_0000]);
    }

    #[test]
    fn test_entity_kind_classification() {
        assert!(EntityId::SEDP_PUBLICATIONS_WRITER.is_writer());
        assert!(!EntityId::SEDP_PUBLICATIONS_WRITER.is_reader());
        let user_reader = EntityId([0, 0, 0x12, ENTITY_KIND_READER_WITH_KEY]);
        assert!(user_reader.is_reader());
        assert!(!user_reader.is_builtin(VendorId::RTI));
        assert!(EntityId::SPDP_PARTICIPANT_WRITER.is_builtin(VendorId::RTI));
    }

    #[test]
    fn test_vendor_group_ids_builtin_only_for_prismtech() {
        let group = EntityId([0, 0, 1, ENTITY_SOURCE_VENDOR | ENTITY_KIND_PRISMTECH_PUBLISHER]);
        assert!(group.is_vendor_specific());
        assert!(group.is_builtin(VendorId::PRISMTECH_OSPL));
        assert!(!group.is_builtin(VendorId::RTI));
    }

    #[test]
    fn test_participant_of_endpoint() {
        let ep = GUID::new(GuidPrefix([7; 12]), EntityId([0, 0, 3, 0x02]));
        assert_eq!(ep.participant().entity_id, EntityId::PARTICIPANT);
        assert_eq!(ep.participant().prefix, ep.prefix);
    }
}
