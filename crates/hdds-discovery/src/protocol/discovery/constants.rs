// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire constants for discovery parameter lists.

// Encapsulation identifiers (CDR header, always big-endian on the wire)
pub const PL_CDR_BE: u16 = 0x0002;
pub const PL_CDR_LE: u16 = 0x0003;

pub const PID_PAD: u16 = 0x0000;
pub const PID_SENTINEL: u16 = 0x0001;
pub const PID_PARTICIPANT_LEASE_DURATION: u16 = 0x0002;
pub const PID_TOPIC_NAME: u16 = 0x0005;
pub const PID_OWNERSHIP_STRENGTH: u16 = 0x0006;
pub const PID_TYPE_NAME: u16 = 0x0007;
pub const PID_PROTOCOL_VERSION: u16 = 0x0015;
pub const PID_VENDOR_ID: u16 = 0x0016;
pub const PID_RELIABILITY: u16 = 0x001a;
pub const PID_LIVELINESS: u16 = 0x001b;
pub const PID_DURABILITY: u16 = 0x001d;
pub const PID_OWNERSHIP: u16 = 0x001f;
pub const PID_PRESENTATION: u16 = 0x0021;
pub const PID_DEADLINE: u16 = 0x0023;
pub const PID_DESTINATION_ORDER: u16 = 0x0025;
pub const PID_LATENCY_BUDGET: u16 = 0x0027;
pub const PID_PARTITION: u16 = 0x0029;
pub const PID_USER_DATA: u16 = 0x002c;
pub const PID_GROUP_DATA: u16 = 0x002d;
pub const PID_TOPIC_DATA: u16 = 0x002e;
pub const PID_UNICAST_LOCATOR: u16 = 0x002f;
pub const PID_MULTICAST_LOCATOR: u16 = 0x0030;
pub const PID_DEFAULT_UNICAST_LOCATOR: u16 = 0x0031;
pub const PID_METATRAFFIC_UNICAST_LOCATOR: u16 = 0x0032;
pub const PID_METATRAFFIC_MULTICAST_LOCATOR: u16 = 0x0033;
pub const PID_HISTORY: u16 = 0x0040;
pub const PID_EXPECTS_INLINE_QOS: u16 = 0x0043;
pub const PID_DEFAULT_MULTICAST_LOCATOR: u16 = 0x0048;
pub const PID_PARTICIPANT_GUID: u16 = 0x0050;
pub const PID_GROUP_GUID: u16 = 0x0052;
pub const PID_BUILTIN_ENDPOINT_SET: u16 = 0x0058;
pub const PID_ENDPOINT_GUID: u16 = 0x005a;
pub const PID_ENTITY_NAME: u16 = 0x0062;
pub const PID_KEY_HASH: u16 = 0x0070;
pub const PID_STATUS_INFO: u16 = 0x0071;

// Vendor-specific PIDs (0x8000+)
// NOTE: only interpreted when the sender is PrismTech-compatible; other
// vendors reuse the same numbers for unrelated parameters.
pub const PID_VENDORSPECIFIC_FLAG: u16 = 0x8000;
pub const PID_PRISMTECH_WRITER_INFO: u16 = 0x8001;
pub const PID_PRISMTECH_PARTICIPANT_VERSION_INFO: u16 = 0x8007;
pub const PID_PRISMTECH_NODE_NAME: u16 = 0x8008;
pub const PID_PRISMTECH_TYPE_DESCRIPTION: u16 = 0x800b;
pub const PID_PRISMTECH_SERVICE_TYPE: u16 = 0x8010;
pub const PID_PRISMTECH_BUILTIN_ENDPOINT_SET: u16 = 0x8014;
pub const PID_PRISMTECH_WRITER_AUTODISPOSE: u16 = 0x8015;
pub const PID_PRISMTECH_READER_FAVOURS_SSM: u16 = 0x8072;

// PID flags: the top bit marks vendor-specific, the next marks
// must-understand.
pub const PID_MUST_UNDERSTAND_FLAG: u16 = 0x4000;
pub const PID_ID_MASK: u16 = 0x3fff;

/// RTPS v2.3 BuiltinEndpointSet_t bits (Table 9.12)
pub const BES_PARTICIPANT_ANNOUNCER: u32 = 1 << 0;
pub const BES_PARTICIPANT_DETECTOR: u32 = 1 << 1;
pub const BES_PUBLICATION_ANNOUNCER: u32 = 1 << 2;
pub const BES_PUBLICATION_DETECTOR: u32 = 1 << 3;
pub const BES_SUBSCRIPTION_ANNOUNCER: u32 = 1 << 4;
pub const BES_SUBSCRIPTION_DETECTOR: u32 = 1 << 5;
pub const BES_PARTICIPANT_MESSAGE_DATA_WRITER: u32 = 1 << 10;
pub const BES_PARTICIPANT_MESSAGE_DATA_READER: u32 = 1 << 11;
pub const BES_TOPIC_ANNOUNCER: u32 = 1 << 28;
pub const BES_TOPIC_DETECTOR: u32 = 1 << 29;

/// Both SEDP announcers.
pub const BES_SEDP_ANNOUNCERS: u32 = BES_PUBLICATION_ANNOUNCER | BES_SUBSCRIPTION_ANNOUNCER;

/// PMD (participant message data) reader and writer.
pub const BES_PMD_ENDPOINTS: u32 =
    BES_PARTICIPANT_MESSAGE_DATA_WRITER | BES_PARTICIPANT_MESSAGE_DATA_READER;

/// Endpoints every HDDS participant provides.
pub const BES_DEFAULT: u32 = BES_PARTICIPANT_ANNOUNCER
    | BES_PARTICIPANT_DETECTOR
    | BES_PUBLICATION_ANNOUNCER
    | BES_PUBLICATION_DETECTOR
    | BES_SUBSCRIPTION_ANNOUNCER
    | BES_SUBSCRIPTION_DETECTOR
    | BES_PMD_ENDPOINTS
    | BES_TOPIC_ANNOUNCER
    | BES_TOPIC_DETECTOR;

/// PrismTech CM builtin endpoint bits (vendor builtin endpoint set)
pub const PTBES_CM_PARTICIPANT_WRITER: u32 = 1 << 0;
pub const PTBES_CM_PARTICIPANT_READER: u32 = 1 << 1;
pub const PTBES_CM_PUBLISHER_WRITER: u32 = 1 << 2;
pub const PTBES_CM_PUBLISHER_READER: u32 = 1 << 3;
pub const PTBES_CM_SUBSCRIBER_WRITER: u32 = 1 << 4;
pub const PTBES_CM_SUBSCRIBER_READER: u32 = 1 << 5;

/// Participant version info flags
pub const PTFL_KERNEL_SEQUENCE_NUMBER: u32 = 1 << 0;
pub const PTFL_DISCOVERY_INCLUDES_GID: u32 = 1 << 1;
pub const PTFL_PTBES_FIXED_0: u32 = 1 << 2;
pub const PTFL_DDSI2_PARTICIPANT_FLAG: u32 = 1 << 3;
pub const PTFL_PARTICIPANT_IS_DDSI2: u32 = 1 << 4;

/// Service types advertised by PrismTech-compatible peers.
pub const SERVICE_TYPE_DDSI2: u32 = 4;
pub const SERVICE_TYPE_DDSI2E: u32 = 5;

/// Version number advertised in our participant version info.
pub const HDDS_VERSION_INFO: u32 = 0x0001_0000;

/// Status info bits (inline QoS, RTPS v2.3 Sec.9.6.3.9)
pub const STATUS_INFO_DISPOSE: u32 = 0x1;
pub const STATUS_INFO_UNREGISTER: u32 = 0x2;

/// DATA submessage flags relevant to built-in samples.
pub const DATA_FLAG_DATA: u8 = 0x04;
pub const DATA_FLAG_KEY: u8 = 0x08;
