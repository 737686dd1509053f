// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Vendor ids and protocol version as carried in discovery data.
//!
//! Vendor classification drives the interop quirks applied during
//! discovery: RTI peers may omit PMD endpoint bits, PrismTech-compatible
//! peers speak the CM extensions, and cloud (discovery service) peers relay
//! endpoint announcements on behalf of other participants.

use std::fmt;

/// Two-byte RTPS vendor id.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct VendorId(pub [u8; 2]);

impl VendorId {
    pub const UNKNOWN: VendorId = VendorId([0x00, 0x00]);
    pub const RTI: VendorId = VendorId([0x01, 0x01]);
    pub const PRISMTECH_OSPL: VendorId = VendorId([0x01, 0x02]);
    pub const OCI: VendorId = VendorId([0x01, 0x03]);
    pub const TWINOAKS: VendorId = VendorId([0x01, 0x06]);
    pub const PRISMTECH_JAVA: VendorId = VendorId([0x01, 0x0b]);
    pub const PRISMTECH_GATEWAY: VendorId = VendorId([0x01, 0x0c]);
    pub const PRISMTECH_LITE: VendorId = VendorId([0x01, 0x0d]);
    pub const EPROSIMA: VendorId = VendorId([0x01, 0x0f]);
    pub const PRISMTECH_CLOUD: VendorId = VendorId([0x01, 0x20]);
    pub const HDDS: VendorId = VendorId([0x01, 0xaa]);

    pub fn is_rti(&self) -> bool {
        *self == Self::RTI
    }

    pub fn is_prismtech(&self) -> bool {
        matches!(
            *self,
            Self::PRISMTECH_OSPL
                | Self::PRISMTECH_JAVA
                | Self::PRISMTECH_GATEWAY
                | Self::PRISMTECH_LITE
                | Self::PRISMTECH_CLOUD
        )
    }

    /// PrismTech family or HDDS itself: both understand the CM extensions,
    /// vendor-specific PIDs and vendor-specific entity ids.
    pub fn is_prismtech_compatible(&self) -> bool {
        self.is_prismtech() || *self == Self::HDDS
    }

    /// Discovery-service vendor, allowed to announce endpoints on behalf of
    /// participants it mediates.
    pub fn is_cloud(&self) -> bool {
        *self == Self::PRISMTECH_CLOUD
    }
}

impl fmt::Debug for VendorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0[0], self.0[1])
    }
}

impl fmt::Display for VendorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// RTPS protocol version (major.minor).
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ProtocolVersion {
    pub major: u8,
    pub minor: u8,
}

impl ProtocolVersion {
    pub const V2_1: ProtocolVersion = ProtocolVersion { major: 2, minor: 1 };
    pub const V2_4: ProtocolVersion = ProtocolVersion { major: 2, minor: 4 };
}

impl Default for ProtocolVersion {
    fn default() -> Self {
        Self::V2_1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_classes() {
        assert!(VendorId::RTI.is_rti());
        assert!(!VendorId::RTI.is_prismtech_compatible());
        assert!(VendorId::PRISMTECH_LITE.is_prismtech());
        assert!(VendorId::HDDS.is_prismtech_compatible());
        assert!(!VendorId::HDDS.is_prismtech());
        assert!(VendorId::PRISMTECH_CLOUD.is_cloud());
        assert!(VendorId::PRISMTECH_CLOUD.is_prismtech());
        assert!(!VendorId::EPROSIMA.is_cloud());
    }

    #[test]
    fn test_vendor_display() {
        assert_eq!(VendorId::PRISMTECH_OSPL.to_string(), "1.2");
    }
}
