// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Topic definitions exchanged through the SEDP topic writer.
//!
//! No proxy topics are kept: a received definition is handed to the
//! [`DiscoveryListener`](crate::core::discovery::DiscoveryListener) and
//! forgotten.

use crate::core::discovery::builtin::ReceiverState;
use crate::core::discovery::{
    DiscoveryResult, DiscoveryServices, EntityId, LocalContext, LocalParticipant,
    SerializedSample, GUID,
};
use crate::protocol::discovery::qos::Qos;
use crate::protocol::discovery::{decode, encode, DiscoveryPayload, KeyHash, StatusInfo};
use md5::{Digest, Md5};

/// Topic definition received from a peer.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicEvent {
    /// Participant that sent the definition.
    pub participant: GUID,
    pub name: String,
    pub type_name: String,
    pub type_description: String,
    /// Received QoS completed with the topic defaults.
    pub qos: Qos,
}

/// Locally defined topic.
#[derive(Debug, Clone)]
pub struct LocalTopic {
    pub name: String,
    pub type_name: String,
    pub type_description: String,
    pub qos: Qos,
}

impl LocalTopic {
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<String>,
        type_description: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let type_name = type_name.into();
        let mut qos = Qos::topic_default();
        qos.topic_name = Some(name.clone());
        qos.type_name = Some(type_name.clone());
        Self {
            name,
            type_name,
            type_description: type_description.into(),
            qos,
        }
    }

    #[must_use]
    pub fn with_qos(mut self, mut qos: Qos) -> Self {
        qos.topic_name = Some(self.name.clone());
        qos.type_name = Some(self.type_name.clone());
        self.qos = qos;
        self
    }
}

/// Instance key of a topic: MD5 over the CDR string encoding of its name
/// (big-endian length including the terminating NUL, then the bytes).
pub fn topic_key(name: &str) -> KeyHash {
    let len = u32::try_from(name.len() + 1).unwrap_or(u32::MAX);
    let mut hasher = Md5::new();
    hasher.update(len.to_be_bytes());
    hasher.update(name.as_bytes());
    hasher.update([0u8]);
    hasher.finalize().into()
}

/// Publish a topic definition.
///
/// # Errors
/// `BuiltinWriterMissing` when `pp` has no SEDP topic writer.
pub fn sedp_write_topic(
    ctx: &LocalContext,
    svc: &DiscoveryServices,
    pp: &LocalParticipant,
    topic: &LocalTopic,
) -> DiscoveryResult<()> {
    let writer = pp.builtin_writer(EntityId::SEDP_TOPIC_WRITER)?;

    let qos = if ctx.config.explicitly_publish_qos_set_to_default {
        topic.qos.clone()
    } else {
        topic.qos.delta(&Qos::topic_default())
    };
    let payload = DiscoveryPayload {
        type_description: Some(topic.type_description.clone()),
        qos,
        ..Default::default()
    };

    log::trace!("[SEDP-TOPIC] write {} via {}", topic.name, writer);
    svc.writer.write_sample(
        writer,
        SerializedSample {
            payload: encode(&payload, ctx.vendor)?,
            status: StatusInfo::ALIVE,
            key_hash: topic_key(&topic.name),
        },
    )
}

/// Entry point for samples of the topic writer.
pub fn handle_sedp_topic(
    _ctx: &LocalContext,
    svc: &DiscoveryServices,
    rst: &ReceiverState,
    status: StatusInfo,
    bytes: &[u8],
) {
    crate::trace_fn!("handle_sedp_topic");
    let mut data = match decode(bytes, rst.vendor) {
        Ok(d) => d,
        Err(e) => {
            log::warn!(
                "[SEDP-TOPIC] data (vendor {}): invalid qos/parameters: {}",
                rst.vendor,
                e
            );
            svc.metrics.record_drop();
            return;
        }
    };

    if !status.is_alive() {
        log::trace!(
            "[SEDP-TOPIC] dispose of {} ignored",
            data.qos.topic_name.as_deref().unwrap_or("(anonymous)")
        );
        return;
    }

    let (Some(name), Some(type_name), Some(type_description)) = (
        data.qos.topic_name.clone(),
        data.qos.type_name.clone(),
        data.type_description.take(),
    ) else {
        log::debug!(
            "[SEDP-TOPIC] (vendor {}): missing qos/parameters for topic {}",
            rst.vendor,
            data.qos.topic_name.as_deref().unwrap_or("(anonymous)")
        );
        return;
    };

    data.qos.merge_missing(&Qos::topic_default());
    log::debug!("[SEDP-TOPIC] {}/{}: {}", name, type_name, data.qos.describe());

    svc.listener.on_topic(&TopicEvent {
        participant: GUID::new(rst.src_prefix, EntityId::PARTICIPANT),
        name,
        type_name,
        type_description,
        qos: data.qos,
    });
}
