// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! SEDP: endpoint announcements and the proxy writer/reader lifecycle.
//!
//! Endpoints relayed by a discovery service may refer to participants we
//! never saw in SPDP. Those get a placeholder proxy participant that
//! depends on the service's own participant, and the service is the only
//! source allowed to refresh an existing endpoint's addresses.

use crate::core::discovery::builtin::ReceiverState;
use crate::core::discovery::{
    AddressSet, CustomFlags, DiscoveryResult, DiscoveryServices, EndpointKind, EntityId,
    LocalContext, LocalParticipant, ProxyEndpoint, ProxyGroup, ProxyParticipant,
    SerializedSample, GUID,
};
use crate::protocol::discovery::qos::{Qos, DURATION_INFINITE};
use crate::protocol::discovery::{
    decode, encode, guid_key_hash, DiscoveryPayload, KeyField, StatusInfo,
};
use crate::transport::select_locator;

/// Local writer or reader as announced through SEDP.
#[derive(Debug, Clone)]
pub struct LocalEndpoint {
    pub guid: GUID,
    pub name: String,
    /// Full QoS, including topic and type name.
    pub qos: Qos,
    pub group_guid: Option<GUID>,
    /// Addresses the endpoint is reachable on beyond its participant's.
    pub addresses: AddressSet,
    pub favours_ssm: bool,
}

impl LocalEndpoint {
    pub fn new(guid: GUID, topic: impl Into<String>, type_name: impl Into<String>) -> Self {
        let mut qos = match EndpointKind::of(&guid) {
            EndpointKind::Writer => Qos::writer_default(),
            EndpointKind::Reader => Qos::reader_default(),
        };
        qos.topic_name = Some(topic.into());
        qos.type_name = Some(type_name.into());
        Self {
            guid,
            name: String::new(),
            qos,
            group_guid: None,
            addresses: AddressSet::new(),
            favours_ssm: false,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_group(mut self, group: GUID) -> Self {
        self.group_guid = Some(group);
        self
    }

    #[must_use]
    pub fn with_qos(mut self, qos: Qos) -> Self {
        self.qos = qos;
        self
    }

    pub fn kind(&self) -> EndpointKind {
        EndpointKind::of(&self.guid)
    }
}

fn sedp_writer_of(pp: &LocalParticipant, kind: EndpointKind) -> DiscoveryResult<GUID> {
    match kind {
        EndpointKind::Writer => pp.builtin_writer(EntityId::SEDP_PUBLICATIONS_WRITER),
        EndpointKind::Reader => pp.builtin_writer(EntityId::SEDP_SUBSCRIPTIONS_WRITER),
    }
}

fn sedp_write_endpoint(
    ctx: &LocalContext,
    svc: &DiscoveryServices,
    pp: &LocalParticipant,
    ep: &LocalEndpoint,
    end_of_life: bool,
) -> DiscoveryResult<()> {
    if ep.guid.entity_id.is_builtin(ctx.vendor) {
        return Ok(());
    }
    let kind = ep.kind();
    let writer = sedp_writer_of(pp, kind)?;

    let mut payload = DiscoveryPayload::key_only(KeyField::Endpoint, ep.guid);
    if !ep.name.is_empty() {
        payload.entity_name = Some(ep.name.clone());
    }

    if !end_of_life {
        payload.protocol_version = Some(ctx.protocol_version);
        payload.vendor_id = Some(ctx.vendor);
        payload.group_guid = ep.group_guid.filter(|g| !g.entity_id.is_zero());
        if kind == EndpointKind::Reader && ep.favours_ssm {
            payload.reader_favours_ssm = Some(true);
        }
        payload.qos = if ctx.config.explicitly_publish_qos_set_to_default {
            ep.qos.clone()
        } else {
            let default = match kind {
                EndpointKind::Writer => Qos::writer_default(),
                EndpointKind::Reader => Qos::reader_default(),
            };
            ep.qos.delta(&default)
        };
        payload.unicast_locators = ep.addresses.unicast();
        payload.multicast_locators = ep.addresses.multicast();
    }

    let status = if end_of_life {
        StatusInfo::DISPOSE_UNREGISTER
    } else {
        StatusInfo::ALIVE
    };
    log::trace!("[SEDP] write {} {} via {}", kind, ep.guid, writer);
    svc.writer.write_sample(
        writer,
        SerializedSample {
            payload: encode(&payload, ctx.vendor)?,
            status,
            key_hash: guid_key_hash(&ep.guid),
        },
    )
}

/// Announce a local writer.
///
/// # Errors
/// `BuiltinWriterMissing` when `pp` lacks the publications writer;
/// `InvalidData` when the QoS does not fit a parameter list.
pub fn sedp_write_writer(
    ctx: &LocalContext,
    svc: &DiscoveryServices,
    pp: &LocalParticipant,
    wr: &LocalEndpoint,
) -> DiscoveryResult<()> {
    sedp_write_endpoint(ctx, svc, pp, wr, false)
}

/// Announce a local reader.
///
/// # Errors
/// `BuiltinWriterMissing` when `pp` lacks the subscriptions writer;
/// `InvalidData` when the QoS does not fit a parameter list.
pub fn sedp_write_reader(
    ctx: &LocalContext,
    svc: &DiscoveryServices,
    pp: &LocalParticipant,
    rd: &LocalEndpoint,
) -> DiscoveryResult<()> {
    sedp_write_endpoint(ctx, svc, pp, rd, false)
}

pub fn sedp_dispose_unregister_writer(
    ctx: &LocalContext,
    svc: &DiscoveryServices,
    pp: &LocalParticipant,
    wr: &LocalEndpoint,
) -> DiscoveryResult<()> {
    sedp_write_endpoint(ctx, svc, pp, wr, true)
}

pub fn sedp_dispose_unregister_reader(
    ctx: &LocalContext,
    svc: &DiscoveryServices,
    pp: &LocalParticipant,
    rd: &LocalEndpoint,
) -> DiscoveryResult<()> {
    sedp_write_endpoint(ctx, svc, pp, rd, true)
}

/// Implicit proxy participant for an endpoint relayed by a discovery
/// service.
fn create_placeholder(
    svc: &DiscoveryServices,
    rst: &ReceiverState,
    ppguid: GUID,
    data: &DiscoveryPayload,
) -> bool {
    if data.unicast_locators.is_empty() && data.multicast_locators.is_empty() {
        log::debug!("[SEDP] relayed endpoint of {} has no locators", ppguid);
        return false;
    }
    let service = GUID::new(rst.src_prefix, EntityId::PARTICIPANT);
    let placeholder = ProxyParticipant::new(ppguid, rst.vendor, DURATION_INFINITE, svc.now())
        .with_depends_on(Some(service))
        .with_custom_flags(CustomFlags::default().with(CustomFlags::IMPLICITLY_CREATED));
    let (_, created) = svc.model.get_or_create_proxy_participant(placeholder);
    if created {
        log::info!("[SEDP] implicit participant {} via {}", ppguid, service);
    }
    true
}

/// Process an alive endpoint announcement.
///
/// Returns `true` when a new proxy endpoint was created.
pub fn handle_sedp_alive(
    ctx: &LocalContext,
    svc: &DiscoveryServices,
    rst: &ReceiverState,
    data: &DiscoveryPayload,
) -> bool {
    crate::trace_fn!("handle_sedp_alive");
    let cfg = &ctx.config;
    let vendor = rst.vendor;

    let Some(guid) = data.endpoint_guid else {
        log::debug!("[SEDP] no guid");
        return false;
    };
    let ppguid = guid.participant();
    if svc.model.is_recently_deleted(&ppguid, svc.now()) {
        log::debug!("[SEDP] {}: participant recently deleted", guid);
        return false;
    }
    if !cfg.enable_loopback && svc.model.is_local_participant(&ppguid) {
        log::trace!("[SEDP] {}: local participant", guid);
        return false;
    }
    if guid.entity_id.is_builtin(vendor) {
        log::debug!("[SEDP] {}: built-in", guid);
        return false;
    }
    if data.qos.topic_name.is_none() {
        log::debug!("[SEDP] {}: no topic", guid);
        return false;
    }
    if data.qos.type_name.is_none() {
        log::debug!("[SEDP] {}: no type name", guid);
        return false;
    }

    let pp = match svc.model.proxy_participant(&ppguid) {
        Some(pp) => pp,
        None if ppguid.prefix != rst.src_prefix && vendor.is_cloud() => {
            if !create_placeholder(svc, rst, ppguid, data) {
                return false;
            }
            match svc.model.proxy_participant(&ppguid) {
                Some(pp) => pp,
                None => return false,
            }
        }
        None => {
            log::debug!("[SEDP] {}: no participant", guid);
            return false;
        }
    };

    let kind = EndpointKind::of(&guid);
    let mut qos = data.qos.clone();
    match kind {
        EndpointKind::Reader => qos.merge_missing(&Qos::reader_default()),
        EndpointKind::Writer if vendor.is_prismtech_compatible() => {
            qos.merge_missing(&Qos::writer_default())
        }
        EndpointKind::Writer => qos.merge_missing(&Qos::writer_default_nad()),
    }
    log::debug!("[SEDP] {} {}: {}", kind, guid, qos.describe());

    if kind == EndpointKind::Reader && data.expects_inline_qos == Some(true) {
        log::warn!("[SEDP] reader {} expects inline QoS, ignored", guid);
        return false;
    }

    let existing = svc.model.proxy_endpoint(kind, &guid);
    if existing.is_some() && !vendor.is_cloud() {
        log::trace!("[SEDP] {} known", guid);
        return false;
    }

    let addresses = AddressSet::new();
    match select_locator(ctx, &data.unicast_locators, false) {
        Some(loc) => addresses.add(loc),
        None => addresses.merge_uc_from(&pp.default_locators),
    }
    match select_locator(ctx, &data.multicast_locators, false) {
        Some(loc) => {
            addresses.add_if_allowed(loc, cfg.allow_multicast);
        }
        None => addresses.merge_mc_from(&pp.default_locators),
    }
    if addresses.is_empty() {
        log::debug!("[SEDP] {}: no address", guid);
        svc.metrics.record_drop();
        return false;
    }

    let ssm = match kind {
        EndpointKind::Writer => addresses.locators().iter().any(|l| l.is_ssm()),
        EndpointKind::Reader => data.reader_favours_ssm.unwrap_or(false),
    };

    if guid.entity_id.is_vendor_specific() && !vendor.is_prismtech_compatible() {
        log::debug!("[SEDP] ignoring vendor-specific endpoint {}", guid);
        return false;
    }

    if let Some(group) = data.group_guid {
        if vendor.is_prismtech_compatible()
            && group.prefix == ppguid.prefix
            && svc.model.proxy_group(&group).is_none()
        {
            svc.model.create_proxy_group(ProxyGroup {
                guid: group,
                name: String::new(),
                qos: Qos::group_default(),
            });
        }
    }

    if existing.is_some() {
        if let Err(e) = svc.model.update_endpoint_addresses(kind, &guid, &addresses) {
            log::debug!("[SEDP] update of {} failed: {}", guid, e);
        } else {
            log::debug!("[SEDP] {} {} refreshed by discovery service", kind, guid);
        }
        return false;
    }

    let endpoint = ProxyEndpoint {
        guid,
        kind,
        vendor,
        addresses,
        qos,
        group_guid: data.group_guid,
        ssm,
    };
    match svc.model.create_proxy_endpoint(endpoint) {
        Ok((ep, created)) => {
            if created {
                log::info!(
                    "[SEDP] new proxy {} {} on '{}'",
                    kind,
                    guid,
                    ep.topic_name()
                );
            }
            created
        }
        Err(e) => {
            log::debug!("[SEDP] {}: {}", guid, e);
            false
        }
    }
}

/// Process a disposed/unregistered endpoint.
pub fn handle_sedp_dead(svc: &DiscoveryServices, data: &DiscoveryPayload) {
    let Some(guid) = data.endpoint_guid else {
        log::debug!("[SEDP] dispose without guid");
        return;
    };
    let kind = EndpointKind::of(&guid);
    match svc.model.delete_proxy_endpoint(kind, &guid) {
        Ok(()) => log::info!("[SEDP] proxy {} {} deleted", kind, guid),
        Err(_) => log::debug!("[SEDP] dispose of unknown {} {}", kind, guid),
    }
}

/// Entry point for samples of the publications and subscriptions writers.
pub fn handle_sedp(
    ctx: &LocalContext,
    svc: &DiscoveryServices,
    rst: &ReceiverState,
    status: StatusInfo,
    bytes: &[u8],
) {
    let data = match decode(bytes, rst.vendor) {
        Ok(d) => d,
        Err(e) => {
            log::warn!(
                "[SEDP] data (vendor {}): invalid qos/parameters: {}",
                rst.vendor,
                e
            );
            svc.metrics.record_drop();
            return;
        }
    };
    if status.is_alive() {
        handle_sedp_alive(ctx, svc, rst, &data);
    } else {
        handle_sedp_dead(svc, &data);
    }
}
