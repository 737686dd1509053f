// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! PrismTech CM extensions: participant, publisher and subscriber
//! announcements.

use crate::core::discovery::builtin::ReceiverState;
use crate::core::discovery::{
    DiscoveryResult, DiscoveryServices, EntityId, LocalContext, LocalParticipant, ProxyGroup,
    SerializedSample, GUID,
};
use crate::protocol::discovery::qos::Qos;
use crate::protocol::discovery::{
    decode, encode, guid_key_hash, DiscoveryPayload, KeyField, StatusInfo,
};

/// Local publisher or subscriber.
#[derive(Debug, Clone)]
pub struct LocalGroup {
    pub guid: GUID,
    pub name: String,
    pub qos: Qos,
}

impl LocalGroup {
    pub fn new(guid: GUID, name: impl Into<String>) -> Self {
        Self {
            guid,
            name: name.into(),
            qos: Qos::group_default(),
        }
    }

    #[must_use]
    pub fn with_qos(mut self, qos: Qos) -> Self {
        self.qos = qos;
        self
    }
}

fn status_for(alive: bool) -> StatusInfo {
    if alive {
        StatusInfo::ALIVE
    } else {
        StatusInfo::DISPOSE_UNREGISTER
    }
}

/// Publish (or withdraw) the CM participant record of `pp`.
///
/// # Errors
/// `BuiltinWriterMissing` when `pp` has no CM participant writer.
pub fn sedp_write_cm_participant(
    ctx: &LocalContext,
    svc: &DiscoveryServices,
    pp: &LocalParticipant,
    alive: bool,
) -> DiscoveryResult<()> {
    let writer = pp.builtin_writer(EntityId::SEDP_CM_PARTICIPANT_WRITER)?;

    let mut payload = DiscoveryPayload {
        participant_guid: Some(pp.guid),
        ..Default::default()
    };
    if alive {
        if !pp.name.is_empty() {
            payload.entity_name = Some(pp.name.clone());
        }
        payload.service_type = pp.service_type;
    }

    let status = status_for(alive);
    log::trace!("[CM] write participant {:?} for {} via {}", status, pp.guid, writer);
    svc.writer.write_sample(
        writer,
        SerializedSample {
            payload: encode(&payload, ctx.vendor)?,
            status,
            key_hash: guid_key_hash(&pp.guid),
        },
    )
}

/// Entry point for samples of the CM participant writer.
///
/// Disposal is ignored: deleting the proxy participant covers it.
pub fn handle_cm_participant(
    _ctx: &LocalContext,
    svc: &DiscoveryServices,
    rst: &ReceiverState,
    status: StatusInfo,
    bytes: &[u8],
) {
    crate::trace_fn!("handle_cm_participant");
    let data = match decode(bytes, rst.vendor) {
        Ok(d) => d,
        Err(e) => {
            log::warn!("[CM] data (vendor {}): invalid qos/parameters: {}", rst.vendor, e);
            svc.metrics.record_drop();
            return;
        }
    };
    if !status.is_alive() {
        return;
    }
    let Some(guid) = data.participant_guid else {
        log::warn!("[CM] data (vendor {}): missing participant GUID", rst.vendor);
        return;
    };
    let Some(pp) = svc.model.proxy_participant(&guid) else {
        log::trace!("[CM] {} unknown", guid);
        return;
    };
    let mut qos = data.qos;
    qos.merge_missing(&pp.qos());
    if let Err(e) = svc.model.update_proxy_participant_qos(&guid, qos) {
        log::debug!("[CM] {}: {}", guid, e);
    }
}

fn sedp_write_cm_group(
    ctx: &LocalContext,
    svc: &DiscoveryServices,
    group: &LocalGroup,
    alive: bool,
    sedp_writer: EntityId,
    what: &str,
) -> DiscoveryResult<()> {
    let Some(pp) = svc.model.local_participant(&group.guid.participant()) else {
        log::trace!(
            "[CM] write {} alive:{} for {} dropped: no participant",
            what,
            alive,
            group.guid
        );
        return Ok(());
    };
    let writer = pp.builtin_writer(sedp_writer)?;

    let payload = if alive {
        let qos = if ctx.config.explicitly_publish_qos_set_to_default {
            group.qos.clone()
        } else {
            group.qos.delta(&Qos::group_default())
        };
        DiscoveryPayload {
            group_guid: Some(group.guid),
            entity_name: (!group.name.is_empty()).then(|| group.name.clone()),
            qos,
            ..Default::default()
        }
    } else {
        DiscoveryPayload::key_only(KeyField::Group, group.guid)
    };

    let status = status_for(alive);
    log::trace!("[CM] write {} {:?} for {} via {}", what, status, group.guid, writer);
    svc.writer.write_sample(
        writer,
        SerializedSample {
            payload: encode(&payload, ctx.vendor)?,
            status,
            key_hash: guid_key_hash(&group.guid),
        },
    )
}

/// Publish (or withdraw) a local publisher.
///
/// A no-op when no local participant owns the group's prefix.
pub fn sedp_write_cm_publisher(
    ctx: &LocalContext,
    svc: &DiscoveryServices,
    group: &LocalGroup,
    alive: bool,
) -> DiscoveryResult<()> {
    sedp_write_cm_group(
        ctx,
        svc,
        group,
        alive,
        EntityId::SEDP_CM_PUBLISHER_WRITER,
        "publisher",
    )
}

/// Publish (or withdraw) a local subscriber.
pub fn sedp_write_cm_subscriber(
    ctx: &LocalContext,
    svc: &DiscoveryServices,
    group: &LocalGroup,
    alive: bool,
) -> DiscoveryResult<()> {
    sedp_write_cm_group(
        ctx,
        svc,
        group,
        alive,
        EntityId::SEDP_CM_SUBSCRIBER_WRITER,
        "subscriber",
    )
}

fn handle_sedp_group_alive(svc: &DiscoveryServices, data: DiscoveryPayload) {
    let Some(guid) = data.group_guid else {
        log::trace!("[SEDP-GROUP] no guid");
        return;
    };
    if svc.model.proxy_participant(&guid.participant()).is_none() {
        log::trace!("[SEDP-GROUP] {}: unknown proxy participant", guid);
        return;
    }
    let mut qos = data.qos;
    qos.merge_missing(&Qos::group_default());
    let (_, created) = svc.model.create_proxy_group(ProxyGroup {
        guid,
        name: data.entity_name.clone().unwrap_or_default(),
        qos: qos.clone(),
    });
    if created {
        log::debug!("[SEDP-GROUP] new proxy group {}", guid);
        return;
    }
    match svc.model.update_proxy_group(&guid, data.entity_name, qos) {
        Ok(group) => log::trace!("[SEDP-GROUP] {} updated (name {:?})", guid, group.name),
        // disposed between the two calls
        Err(e) => log::debug!("[SEDP-GROUP] update of {} failed: {}", guid, e),
    }
}

fn handle_sedp_group_dead(svc: &DiscoveryServices, data: &DiscoveryPayload) {
    let Some(guid) = data.group_guid else {
        log::trace!("[SEDP-GROUP] dispose without guid");
        return;
    };
    match svc.model.delete_proxy_group(&guid) {
        Ok(()) => log::debug!("[SEDP-GROUP] proxy group {} deleted", guid),
        Err(_) => log::debug!("[SEDP-GROUP] dispose of unknown group {}", guid),
    }
}

/// Entry point for samples of the CM publisher and subscriber writers.
pub fn handle_sedp_group(
    _ctx: &LocalContext,
    svc: &DiscoveryServices,
    rst: &ReceiverState,
    status: StatusInfo,
    bytes: &[u8],
) {
    crate::trace_fn!("handle_sedp_group");
    let data = match decode(bytes, rst.vendor) {
        Ok(d) => d,
        Err(e) => {
            log::warn!(
                "[SEDP-GROUP] data (vendor {}): invalid qos/parameters: {}",
                rst.vendor,
                e
            );
            svc.metrics.record_drop();
            return;
        }
    };
    if status.is_alive() {
        handle_sedp_group_alive(svc, data);
    } else {
        handle_sedp_group_dead(svc, &data);
    }
}
