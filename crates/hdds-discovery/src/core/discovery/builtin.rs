// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Built-in sample dispatch.
//!
//! Every sample received on a built-in reader lands here. The dispatcher
//! reassembles the payload, settles the effective status (inline QoS wins
//! over the pipeline's value), rebuilds a key record for payload-less
//! dispose/unregister samples, and routes by writer entity id through
//! [`HANDLERS`].

use crate::core::discovery::fragment::{defragment, Fragment};
use crate::core::discovery::{
    group, sedp, spdp, topic, DiscoveryServices, EntityId, GuidPrefix, LocalContext,
    ProtocolVersion, VendorId,
};
use crate::protocol::discovery::{encode_key_only, InlineQos, KeyField, KeyHash, StatusInfo};
use crate::transport::Locator;
use arc_swap::ArcSwap;
use std::fmt;
use std::sync::Arc;

/// What the message receiver knew about the sender of a sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverState {
    pub src_prefix: GuidPrefix,
    pub vendor: VendorId,
    pub protocol_version: ProtocolVersion,
    /// Zero when the sample was not addressed to a specific participant.
    pub dst_prefix: GuidPrefix,
    /// Source address the datagram came from, if known.
    pub peer_locator: Option<Locator>,
}

impl ReceiverState {
    pub fn new(src_prefix: GuidPrefix, vendor: VendorId) -> Self {
        Self {
            src_prefix,
            vendor,
            protocol_version: ProtocolVersion::default(),
            dst_prefix: GuidPrefix::ZERO,
            peer_locator: None,
        }
    }

    #[must_use]
    pub fn with_dst_prefix(mut self, dst: GuidPrefix) -> Self {
        self.dst_prefix = dst;
        self
    }

    #[must_use]
    pub fn with_peer_locator(mut self, loc: Locator) -> Self {
        self.peer_locator = Some(loc);
        self
    }
}

/// DATA submessage payload flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DataFlags {
    pub data: bool,
    pub key: bool,
}

impl DataFlags {
    pub const DATA: DataFlags = DataFlags {
        data: true,
        key: false,
    };
    pub const KEY: DataFlags = DataFlags {
        data: false,
        key: true,
    };
    pub const NONE: DataFlags = DataFlags {
        data: false,
        key: false,
    };
}

/// Sample as delivered by the reception pipeline.
#[derive(Debug, Clone)]
pub struct BuiltinSample {
    pub rst: ReceiverState,
    /// Entity id of the writer that sent it.
    pub writer: EntityId,
    pub seq: i64,
    /// Serialized size; zero for a payload-less sample.
    pub size: u32,
    pub flags: DataFlags,
    /// Status as determined by the pipeline (no inline QoS).
    pub status: StatusInfo,
    pub inline_qos: Option<InlineQos>,
    pub fragments: Vec<Fragment>,
}

impl BuiltinSample {
    /// Unfragmented DATA sample carrying `payload`.
    pub fn data(rst: ReceiverState, writer: EntityId, payload: Vec<u8>) -> Self {
        Self {
            rst,
            writer,
            seq: 1,
            size: payload.len() as u32,
            flags: DataFlags::DATA,
            status: StatusInfo::ALIVE,
            inline_qos: None,
            fragments: vec![Fragment::whole(payload)],
        }
    }

    /// Payload-less dispose/unregister identified only by its key hash.
    pub fn keyhash_only(
        rst: ReceiverState,
        writer: EntityId,
        status: StatusInfo,
        key_hash: KeyHash,
    ) -> Self {
        Self {
            rst,
            writer,
            seq: 1,
            size: 0,
            flags: DataFlags::NONE,
            status,
            inline_qos: Some(InlineQos {
                status_info: Some(status),
                key_hash: Some(key_hash),
            }),
            fragments: Vec::new(),
        }
    }
}

/// Target of a routed sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    Spdp,
    Sedp,
    Liveliness,
    CmParticipant,
    SedpGroup,
    SedpTopic,
}

/// Writer entity id -> handler.
pub static HANDLERS: &[(EntityId, HandlerKind)] = &[
    (EntityId::SPDP_PARTICIPANT_WRITER, HandlerKind::Spdp),
    (EntityId::SEDP_PUBLICATIONS_WRITER, HandlerKind::Sedp),
    (EntityId::SEDP_SUBSCRIPTIONS_WRITER, HandlerKind::Sedp),
    (EntityId::P2P_PARTICIPANT_MESSAGE_WRITER, HandlerKind::Liveliness),
    (EntityId::SEDP_CM_PARTICIPANT_WRITER, HandlerKind::CmParticipant),
    (EntityId::SEDP_CM_PUBLISHER_WRITER, HandlerKind::SedpGroup),
    (EntityId::SEDP_CM_SUBSCRIBER_WRITER, HandlerKind::SedpGroup),
    (EntityId::SEDP_TOPIC_WRITER, HandlerKind::SedpTopic),
];

fn handler_for(writer: EntityId) -> Option<HandlerKind> {
    HANDLERS
        .iter()
        .find(|(eid, _)| *eid == writer)
        .map(|&(_, kind)| kind)
}

/// Result of [`BuiltinDispatcher::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Routed(HandlerKind),
    /// Malformed or content-less; logged and discarded.
    Dropped,
    /// No handler for the writer.
    Unhandled,
}

struct SampleId<'a>(&'a BuiltinSample);

impl fmt::Display for SampleId<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}:{:?} #{}",
            self.0.rst.src_prefix, self.0.writer, self.0.seq
        )
    }
}

/// Routes built-in samples to the discovery handlers.
pub struct BuiltinDispatcher {
    ctx: ArcSwap<LocalContext>,
    svc: DiscoveryServices,
}

impl BuiltinDispatcher {
    pub fn new(ctx: LocalContext, svc: DiscoveryServices) -> Self {
        Self {
            ctx: ArcSwap::from_pointee(ctx),
            svc,
        }
    }

    pub fn context(&self) -> Arc<LocalContext> {
        self.ctx.load_full()
    }

    /// Swap in a new local view (interfaces changed, config reloaded).
    pub fn update_context(&self, ctx: LocalContext) {
        self.ctx.store(Arc::new(ctx));
    }

    pub fn services(&self) -> &DiscoveryServices {
        &self.svc
    }

    pub fn dispatch(&self, sample: BuiltinSample) -> DispatchOutcome {
        crate::trace_fn!("BuiltinDispatcher::dispatch");
        let ctx = self.ctx.load();

        let payload = match defragment(sample.size, &sample.fragments) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("[BUILTIN] {}: {}", SampleId(&sample), e);
                return self.dropped();
            }
        };

        let need_keyhash = sample.size == 0 || !(sample.flags.data || sample.flags.key);
        let (status, key_hash) = match &sample.inline_qos {
            Some(iq) => (
                iq.status_info.unwrap_or(StatusInfo::ALIVE),
                if need_keyhash { iq.key_hash } else { None },
            ),
            None => (sample.status, None),
        };

        let body = if status.is_alive() {
            if sample.size == 0 || !sample.flags.data {
                log::warn!("[BUILTIN] {}: data without payload", SampleId(&sample));
                return self.dropped();
            }
            payload
        } else if sample.size > 0 {
            if !sample.flags.key {
                log::warn!(
                    "[BUILTIN] {}: dispose/unregister without key flag",
                    SampleId(&sample)
                );
                return self.dropped();
            }
            payload
        } else if let (Some(kh), false) = (key_hash, ctx.config.strict_keyhash) {
            synthesize_key(sample.writer, &kh)
        } else {
            log::warn!(
                "[BUILTIN] {}: dispose/unregister with no content",
                SampleId(&sample)
            );
            return self.dropped();
        };

        let Some(kind) = handler_for(sample.writer) else {
            log::debug!("[BUILTIN] {}: not handled", SampleId(&sample));
            return DispatchOutcome::Unhandled;
        };

        let rst = &sample.rst;
        match kind {
            HandlerKind::Spdp => spdp::handle_spdp(&ctx, &self.svc, rst, status, &body),
            HandlerKind::Sedp => sedp::handle_sedp(&ctx, &self.svc, rst, status, &body),
            HandlerKind::Liveliness => self.svc.liveliness.handle_pmd(rst, status, &body),
            HandlerKind::CmParticipant => {
                group::handle_cm_participant(&ctx, &self.svc, rst, status, &body)
            }
            HandlerKind::SedpGroup => group::handle_sedp_group(&ctx, &self.svc, rst, status, &body),
            HandlerKind::SedpTopic => topic::handle_sedp_topic(&ctx, &self.svc, rst, status, &body),
        }
        DispatchOutcome::Routed(kind)
    }

    fn dropped(&self) -> DispatchOutcome {
        self.svc.metrics.record_drop();
        DispatchOutcome::Dropped
    }
}

/// Key record for a payload-less dispose/unregister.
fn synthesize_key(writer: EntityId, kh: &KeyHash) -> Vec<u8> {
    let field = match writer {
        EntityId::P2P_PARTICIPANT_MESSAGE_WRITER => return kh.to_vec(),
        EntityId::SPDP_PARTICIPANT_WRITER | EntityId::SEDP_CM_PARTICIPANT_WRITER => {
            KeyField::Participant
        }
        EntityId::SEDP_CM_PUBLISHER_WRITER | EntityId::SEDP_CM_SUBSCRIBER_WRITER => {
            KeyField::Group
        }
        EntityId::SEDP_PUBLICATIONS_WRITER
        | EntityId::SEDP_SUBSCRIPTIONS_WRITER
        | EntityId::SEDP_TOPIC_WRITER => KeyField::Endpoint,
        other => {
            log::warn!(
                "[BUILTIN] synthesizing key for unknown writer {:?} as endpoint GUID",
                other
            );
            KeyField::Endpoint
        }
    };
    encode_key_only(field, kh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::discovery::{decode, guid_key_hash};
    use crate::core::discovery::GUID;

    #[test]
    fn test_handler_table_covers_builtin_writers() {
        assert_eq!(
            handler_for(EntityId::SPDP_PARTICIPANT_WRITER),
            Some(HandlerKind::Spdp)
        );
        assert_eq!(
            handler_for(EntityId::SEDP_SUBSCRIPTIONS_WRITER),
            Some(HandlerKind::Sedp)
        );
        assert_eq!(
            handler_for(EntityId::SEDP_CM_SUBSCRIBER_WRITER),
            Some(HandlerKind::SedpGroup)
        );
        assert_eq!(handler_for(EntityId([0, 0, 0x10, 0xc2])), None);
    }

    #[test]
    fn test_synthesize_key_by_writer() {
        let guid = GUID::from_bytes([3; 16]);
        let kh = guid_key_hash(&guid);

        let spdp = decode(&synthesize_key(EntityId::SPDP_PARTICIPANT_WRITER, &kh), VendorId::HDDS)
            .expect("decodes");
        assert_eq!(spdp.participant_guid, Some(guid));

        let grp = decode(&synthesize_key(EntityId::SEDP_CM_PUBLISHER_WRITER, &kh), VendorId::HDDS)
            .expect("decodes");
        assert_eq!(grp.group_guid, Some(guid));

        let ep = decode(&synthesize_key(EntityId::SEDP_TOPIC_WRITER, &kh), VendorId::HDDS)
            .expect("decodes");
        assert_eq!(ep.endpoint_guid, Some(guid));

        assert_eq!(
            synthesize_key(EntityId::P2P_PARTICIPANT_MESSAGE_WRITER, &kh),
            kh.to_vec()
        );
    }
}
