// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use crate::core::discovery::{AddressSet, VendorId, GUID};
use crate::protocol::discovery::qos::Qos;
use std::fmt;

/// Writer or reader side of a proxy endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointKind {
    Writer,
    Reader,
}

impl EndpointKind {
    /// Kind implied by a GUID's entity id.
    pub fn of(guid: &GUID) -> Self {
        if guid.entity_id.is_writer() {
            EndpointKind::Writer
        } else {
            EndpointKind::Reader
        }
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointKind::Writer => write!(f, "writer"),
            EndpointKind::Reader => write!(f, "reader"),
        }
    }
}

/// Remote writer or reader learned through SEDP.
///
/// The address set is shared: a discovery-service refresh replaces its
/// contents in place.
#[derive(Debug)]
pub struct ProxyEndpoint {
    pub guid: GUID,
    pub kind: EndpointKind,
    pub vendor: VendorId,
    pub addresses: AddressSet,
    pub qos: Qos,
    pub group_guid: Option<GUID>,
    /// Writer publishes to an SSM address, or reader prefers SSM.
    pub ssm: bool,
}

impl ProxyEndpoint {
    pub fn participant_guid(&self) -> GUID {
        self.guid.participant()
    }

    pub fn topic_name(&self) -> &str {
        self.qos.topic_name.as_deref().unwrap_or("")
    }
}

/// Remote publisher or subscriber (CM group).
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyGroup {
    pub guid: GUID,
    pub name: String,
    pub qos: Qos,
}

impl ProxyGroup {
    pub fn participant_guid(&self) -> GUID {
        self.guid.participant()
    }
}
