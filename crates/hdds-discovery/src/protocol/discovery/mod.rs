// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Discovery wire format: parameter IDs, QoS model and PL_CDR codec.

pub mod codec;
pub mod constants;
pub mod qos;
pub mod types;

pub use codec::{decode, encode, encode_key_only, guid_from_key_hash, guid_key_hash, InlineQos};
pub use qos::Qos;
pub use types::{
    DiscoveryPayload, KeyField, KeyHash, ParseError, ParticipantVersionInfo, Presence, StatusInfo,
};
