// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! SPDP/SEDP discovery core.
//!
//! Receives built-in discovery samples, maintains the proxy participant,
//! endpoint and group model, and publishes local announcements.

pub mod addrset;
pub mod builtin;
pub mod capabilities;
pub mod context;
pub mod fragment;
pub mod group;
pub mod guid;
pub mod registry;
pub mod scheduler;
pub mod sedp;
pub mod services;
pub mod sink;
pub mod spdp;
#[cfg(test)]
pub(crate) mod test_support;
pub mod topic;
pub mod vendor;

use crate::protocol::discovery::ParseError;
use std::fmt;

pub use addrset::AddressSet;
pub use builtin::{BuiltinDispatcher, BuiltinSample, DataFlags, DispatchOutcome, ReceiverState};
pub use capabilities::EndpointCapabilities;
pub use context::LocalContext;
pub use fragment::Fragment;
pub use guid::{EntityId, GuidPrefix, GUID};
pub use group::LocalGroup;
pub use registry::{
    CustomFlags, EndpointKind, LeaseSweeper, LocalParticipant, MetricsSnapshot, ProxyEndpoint,
    ProxyGroup, ProxyModel, ProxyParticipant, ProxyRegistry, RegistryMetrics,
};
pub use scheduler::{EventQueue, EventScheduler, ScheduledEvent};
pub use sedp::LocalEndpoint;
pub use services::{Clock, DiscoveryServices, ManualClock, SystemClock};
pub use sink::{
    DiscoveryListener, LivelinessHandler, NoopListener, SampleQueue, SampleWriter, SerializedSample,
};
pub use topic::{LocalTopic, TopicEvent};
pub use vendor::{ProtocolVersion, VendorId};

/// Result alias for discovery-related operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// Discovery subsystem error categorisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    /// Requested participant not present in the registry.
    ParticipantNotFound { guid: String },
    /// Requested proxy endpoint not present in the registry.
    EndpointNotFound { guid: String },
    /// Requested proxy group not present in the registry.
    GroupNotFound { guid: String },
    /// Parsing or decoding failed.
    ParseFailed { reason: String },
    /// A local participant lacks the built-in writer an announcement needs.
    /// Internal inconsistency; callers treat it as fatal.
    BuiltinWriterMissing { participant: String, writer: String },
    /// Generic invalid data or invariant violation.
    InvalidData { reason: String },
    /// Configuration could not be loaded or failed validation.
    InvalidConfig { reason: String },
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryError::ParticipantNotFound { guid } => {
                write!(f, "Participant not found: {}", guid)
            }
            DiscoveryError::EndpointNotFound { guid } => write!(f, "Endpoint not found: {}", guid),
            DiscoveryError::GroupNotFound { guid } => write!(f, "Group not found: {}", guid),
            DiscoveryError::ParseFailed { reason } => write!(f, "Parse failed: {}", reason),
            DiscoveryError::BuiltinWriterMissing {
                participant,
                writer,
            } => write!(
                f,
                "Built-in writer {} missing on participant {}",
                writer, participant
            ),
            DiscoveryError::InvalidData { reason } => write!(f, "Invalid data: {}", reason),
            DiscoveryError::InvalidConfig { reason } => write!(f, "Invalid config: {}", reason),
        }
    }
}

impl std::error::Error for DiscoveryError {}

impl From<ParseError> for DiscoveryError {
    fn from(err: ParseError) -> Self {
        DiscoveryError::ParseFailed {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovery_error_display_variants() {
        let err = DiscoveryError::ParticipantNotFound {
            guid: "GUID:001".into(),
        };
        assert_eq!(err.to_string(), "Participant not found: GUID:001");

        let err = DiscoveryError::GroupNotFound {
            guid: "GUID:002".into(),
        };
        assert_eq!(err.to_string(), "Group not found: GUID:002");

        let err = DiscoveryError::BuiltinWriterMissing {
            participant: "p".into(),
            writer: "w".into(),
        };
        assert_eq!(err.to_string(), "Built-in writer w missing on participant p");

        let err = DiscoveryError::InvalidConfig {
            reason: "bad ttl".into(),
        };
        assert_eq!(err.to_string(), "Invalid config: bad ttl");
    }

    #[test]
    fn test_parse_error_conversion() {
        let err: DiscoveryError = ParseError::TruncatedData.into();
        assert!(matches!(err, DiscoveryError::ParseFailed { .. }));
        assert!(err.to_string().contains("truncated"));
    }
}
