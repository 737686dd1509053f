// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! SPDP: participant announcement, proxy participant lifecycle and
//! jittered responses to new peers.

use crate::core::discovery::builtin::ReceiverState;
use crate::core::discovery::capabilities::{fixup_prismtech_cm, fixup_rti_pmd};
use crate::core::discovery::{
    AddressSet, CustomFlags, DiscoveryResult, DiscoveryServices, EndpointCapabilities, EntityId,
    LocalContext, LocalParticipant, ProxyParticipant, SerializedSample, VendorId, GUID,
};
use crate::protocol::discovery::constants::*;
use crate::protocol::discovery::qos::Qos;
use crate::protocol::discovery::{
    decode, encode, guid_key_hash, DiscoveryPayload, KeyField, ParticipantVersionInfo, StatusInfo,
};
use crate::transport::{select_locator, Locator};

/// Announce `pp` through its SPDP writer.
///
/// # Errors
/// `BuiltinWriterMissing` when `pp` has no SPDP writer, `InvalidData` when
/// a parameter (typically user data) is too large to encode; whatever the
/// sample writer reports otherwise.
pub fn spdp_write(
    ctx: &LocalContext,
    svc: &DiscoveryServices,
    pp: &LocalParticipant,
) -> DiscoveryResult<()> {
    crate::trace_fn!("spdp_write");
    let writer = pp.builtin_writer(EntityId::SPDP_PARTICIPANT_WRITER)?;
    let cfg = &ctx.config;

    let mut payload = DiscoveryPayload {
        participant_guid: Some(pp.guid),
        builtin_endpoint_set: Some(pp.capabilities.standard),
        prismtech_builtin_endpoint_set: pp.capabilities.vendor.filter(|&v| v != 0),
        protocol_version: Some(ctx.protocol_version),
        vendor_id: Some(ctx.vendor),
        participant_lease_duration: Some(pp.lease_duration),
        service_type: pp.service_type,
        ..Default::default()
    };

    if cfg.publish_uc_locators {
        payload.default_unicast_locators = pp.default_locators.unicast();
        payload.metatraffic_unicast_locators = pp.metatraffic_locators.unicast();
    }
    let allowed = |locs: Vec<Locator>| -> Vec<Locator> {
        locs.into_iter()
            .filter(|l| cfg.allow_multicast.allows(l))
            .collect()
    };
    payload.default_multicast_locators = allowed(pp.default_locators.multicast());
    payload.metatraffic_multicast_locators = allowed(pp.metatraffic_locators.multicast());

    let mut flags = PTFL_DDSI2_PARTICIPANT_FLAG | PTFL_PTBES_FIXED_0;
    if pp.privileged {
        flags |= PTFL_PARTICIPANT_IS_DDSI2;
    }
    payload.participant_version_info = Some(ParticipantVersionInfo {
        version: HDDS_VERSION_INFO,
        flags,
        unused: [0; 3],
        internals: format!("{}/{}", ctx.host_name, env!("CARGO_PKG_VERSION")),
    });

    if !pp.name.is_empty() {
        payload.entity_name = Some(pp.name.clone());
    }

    let user_data = pp.qos.user_data.clone().unwrap_or_default();
    if cfg.explicitly_publish_qos_set_to_default || !user_data.is_empty() {
        payload.qos.user_data = Some(user_data);
    }

    log::trace!("[SPDP] write {} via {}", pp.guid, writer);
    svc.writer.write_sample(
        writer,
        SerializedSample {
            payload: encode(&payload, ctx.vendor)?,
            status: StatusInfo::ALIVE,
            key_hash: guid_key_hash(&pp.guid),
        },
    )
}

/// End-of-life announcement for `pp`: the GUID only, disposed and
/// unregistered.
///
/// # Errors
/// Same as [`spdp_write`].
pub fn spdp_dispose_unregister(
    ctx: &LocalContext,
    svc: &DiscoveryServices,
    pp: &LocalParticipant,
) -> DiscoveryResult<()> {
    crate::trace_fn!("spdp_dispose_unregister");
    let writer = pp.builtin_writer(EntityId::SPDP_PARTICIPANT_WRITER)?;
    let payload = DiscoveryPayload::key_only(KeyField::Participant, pp.guid);
    svc.writer.write_sample(
        writer,
        SerializedSample {
            payload: encode(&payload, ctx.vendor)?,
            status: StatusInfo::DISPOSE_UNREGISTER,
            key_hash: guid_key_hash(&pp.guid),
        },
    )
}

const DELAY_CONSTANTS: [u64; 10] = [
    15_385_148_050_874_689_571,
    17_503_036_526_311_582_379,
    11_075_621_958_654_396_447,
    9_748_227_842_331_024_047,
    14_689_485_562_394_710_107,
    17_256_284_993_973_210_745,
    9_288_286_355_086_959_209,
    17_718_429_552_426_935_775,
    10_054_290_541_876_311_021,
    13_417_933_704_571_658_407,
];

/// Deterministic hash of two GUIDs and a timestamp, used to spread SPDP
/// replies over time.
pub fn pseudo_random_delay(x: &GUID, y: &GUID, tnow: u64) -> u32 {
    let [a, b, c] = x.prefix.words();
    let d = x.entity_id.as_u32();
    let [e, f, g] = y.prefix.words();
    let h = y.entity_id.as_u32();
    let i = (tnow >> 32) as u32;
    let j = tnow as u32;

    let cs = &DELAY_CONSTANTS;
    let term = |p: u32, q: u32, k: usize| -> u64 {
        u64::from(p)
            .wrapping_add(cs[k])
            .wrapping_mul(u64::from(q).wrapping_add(cs[k + 1]))
    };
    let m = term(a, b, 0)
        .wrapping_add(term(c, d, 2))
        .wrapping_add(term(e, f, 4))
        .wrapping_add(term(g, h, 6))
        .wrapping_add(term(i, j, 8));
    (m >> 32) as u32
}

/// Make every local participant announce itself to `dest` soon.
pub fn respond_to_spdp(ctx: &LocalContext, svc: &DiscoveryServices, dest: &GUID) {
    let now = svc.now();
    let delay_max_ms =
        u64::try_from(ctx.config.spdp_response_max_delay.as_millis()).unwrap_or(u64::MAX);

    for pp in svc.model.local_participants() {
        let norm = u64::from(pseudo_random_delay(&pp.guid, dest, now) >> 2);
        let delay_ns = norm.saturating_mul(delay_max_ms) / 1000;
        let at = now.saturating_add(delay_ns);
        log::trace!("[SPDP] {} responds to {} in {} ns", pp.guid, dest, delay_ns);
        if ctx.config.unicast_response_to_spdp {
            svc.scheduler.schedule_spdp_reply(at, pp.guid, dest.prefix);
        } else {
            svc.scheduler.reschedule_spdp_if_earlier(pp.guid, at);
        }
    }
}

fn is_local_participant(
    ctx: &LocalContext,
    svc: &DiscoveryServices,
    guid: &GUID,
    vendor: VendorId,
) -> bool {
    if svc.model.is_local_participant(guid) {
        return true;
    }
    ctx.is_own_vendor(vendor)
        && svc
            .model
            .privileged_participant()
            .is_some_and(|pp| pp.guid.prefix.words()[0] == guid.prefix.words()[0])
}

fn unicast_or_peer(
    ctx: &LocalContext,
    candidates: &[Locator],
    same_subnet: bool,
    rst: &ReceiverState,
) -> Option<Locator> {
    select_locator(ctx, candidates, same_subnet).or(rst.peer_locator)
}

/// Process an alive participant announcement.
///
/// Returns `true` when a new proxy participant was created.
pub fn handle_spdp_alive(
    ctx: &LocalContext,
    svc: &DiscoveryServices,
    rst: &ReceiverState,
    data: &DiscoveryPayload,
) -> bool {
    crate::trace_fn!("handle_spdp_alive");
    let (Some(guid), Some(bes)) = (data.participant_guid, data.builtin_endpoint_set) else {
        log::warn!(
            "[SPDP] data (vendor {}): no/invalid payload",
            rst.vendor
        );
        svc.metrics.record_drop();
        return false;
    };
    let cfg = &ctx.config;
    let now = svc.now();

    let caps = EndpointCapabilities::new(bes, data.prismtech_builtin_endpoint_set);
    let caps = fixup_rti_pmd(rst.vendor, cfg.assume_rti_has_pmd_endpoints, caps);
    let caps = fixup_prismtech_cm(data.participant_version_info.as_ref(), caps);

    if svc.model.is_recently_deleted(&guid, now) {
        log::debug!("[SPDP] {} recently deleted", guid);
        return false;
    }

    let announced_vendor = data.vendor_id.unwrap_or(rst.vendor);
    if !cfg.enable_loopback && is_local_participant(ctx, svc, &guid, announced_vendor) {
        log::trace!("[SPDP] {} is local", guid);
        return false;
    }

    if svc.model.renew_lease(&guid, now) {
        log::trace!("[SPDP] {} known, lease renewed", guid);
        return false;
    }

    let lease = data
        .participant_lease_duration
        .unwrap_or(cfg.default_lease_duration);

    let privileged = GUID::new(rst.src_prefix, EntityId::PARTICIPANT);
    let depends_on = (!caps.has_sedp_announcers() && privileged != guid).then_some(privileged);
    if let Some(dep) = depends_on {
        log::debug!("[SPDP] {} depends on {}", guid, dep);
    }

    let mut flags = CustomFlags::default();
    if matches!(
        data.service_type,
        Some(SERVICE_TYPE_DDSI2 | SERVICE_TYPE_DDSI2E)
    ) {
        flags = flags.with(CustomFlags::PARTICIPANT_IS_DDSI2);
    }
    if let Some(info) = &data.participant_version_info {
        if info.flags & PTFL_KERNEL_SEQUENCE_NUMBER != 0 {
            flags = flags.with(CustomFlags::INC_KERNEL_SEQUENCE_NUMBERS);
        }
        if info.flags & (PTFL_DDSI2_PARTICIPANT_FLAG | PTFL_PARTICIPANT_IS_DDSI2)
            == (PTFL_DDSI2_PARTICIPANT_FLAG | PTFL_PARTICIPANT_IS_DDSI2)
        {
            flags = flags.with(CustomFlags::PARTICIPANT_IS_DDSI2);
        }
    }

    let as_default = AddressSet::new();
    let as_meta = AddressSet::new();
    if let Some(loc) = select_locator(ctx, &data.default_multicast_locators, false) {
        as_default.add_if_allowed(loc, cfg.allow_multicast);
    }
    if let Some(loc) = select_locator(ctx, &data.metatraffic_multicast_locators, false) {
        as_meta.add_if_allowed(loc, cfg.allow_multicast);
    }

    // without multicast, or with routed multicast, any unicast address goes
    let same_subnet =
        !(as_default.is_empty_mc() && as_meta.is_empty_mc()) && cfg.multicast_ttl <= 1;

    if let Some(loc) = unicast_or_peer(ctx, &data.default_unicast_locators, same_subnet, rst) {
        as_default.add(loc);
    }
    if let Some(loc) = unicast_or_peer(ctx, &data.metatraffic_unicast_locators, same_subnet, rst) {
        as_meta.add(loc);
    }
    log::trace!("[SPDP] {} data {:?} meta {:?}", guid, as_default, as_meta);

    if as_default.is_empty_uc() || as_meta.is_empty_uc() {
        log::debug!("[SPDP] {} has no usable unicast address", guid);
        svc.metrics.record_drop();
        return false;
    }

    if as_meta.is_empty_mc() {
        svc.model.add_discovery_locators(&as_meta);
    }

    let mut qos = data.qos.clone();
    qos.merge_missing(&Qos::participant_default());

    let candidate = ProxyParticipant::new(guid, rst.vendor, lease, now)
        .with_capabilities(caps)
        .with_protocol_version(rst.protocol_version)
        .with_addresses(as_default, as_meta)
        .with_depends_on(depends_on)
        .with_custom_flags(flags)
        .with_entity_name(data.entity_name.clone())
        .with_qos(qos);

    let (_, created) = svc.model.get_or_create_proxy_participant(candidate);
    if created {
        log::info!(
            "[SPDP] new participant {} (vendor {}, lease {:?})",
            guid,
            rst.vendor,
            lease
        );
    } else {
        log::trace!("[SPDP] {} created concurrently", guid);
    }

    if rst.dst_prefix.is_zero() {
        respond_to_spdp(ctx, svc, &guid);
    }
    created
}

/// Process a disposed/unregistered participant.
pub fn handle_spdp_dead(svc: &DiscoveryServices, rst: &ReceiverState, data: &DiscoveryPayload) {
    crate::trace_fn!("handle_spdp_dead");
    let Some(guid) = data.participant_guid else {
        log::warn!("[SPDP] dispose (vendor {}): no participant GUID", rst.vendor);
        return;
    };
    match svc.model.delete_proxy_participant(&guid, svc.now()) {
        Ok(()) => log::info!("[SPDP] participant {} gone", guid),
        Err(_) => log::debug!("[SPDP] dispose of unknown participant {}", guid),
    }
}

/// Entry point for samples of the SPDP built-in writer.
pub fn handle_spdp(
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
                "[SPDP] data (vendor {}): invalid qos/parameters: {}",
                rst.vendor,
                e
            );
            svc.metrics.record_drop();
            return;
        }
    };
    if status.is_alive() {
        handle_spdp_alive(ctx, svc, rst, &data);
    } else {
        handle_spdp_dead(svc, rst, &data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::discovery::test_support::{guid, participant_payload, Harness};
    use crate::core::discovery::{Clock, GuidPrefix, ProxyModel};
    use std::net::Ipv4Addr;
    use std::time::Duration;

    #[test]
    fn test_pseudo_random_delay_is_deterministic() {
        let x = guid(1);
        let y = guid(2);
        assert_eq!(
            pseudo_random_delay(&x, &y, 12345),
            pseudo_random_delay(&x, &y, 12345)
        );
        assert_ne!(
            pseudo_random_delay(&x, &y, 12345),
            pseudo_random_delay(&y, &x, 12345)
        );
    }

    #[test]
    fn test_response_delay_bounded_by_max() {
        let mut h = Harness::new();
        h.ctx.config.spdp_response_max_delay = Duration::from_millis(1000);
        h.add_local(LocalParticipant::new(guid(0x10)));
        for n in 0..50u8 {
            let now = u64::from(n) * 7_919_000_003;
            h.clock.set(now);
            respond_to_spdp(&h.ctx, &h.svc, &guid(n));
            let due = h.events.pop_due(u64::MAX);
            assert_eq!(due.len(), 1);
            // (u32::MAX >> 2) * 1000 ms / 1000
            assert!(due[0].at() - now <= u64::from(u32::MAX >> 2));
        }
    }

    #[test]
    fn test_alive_creates_then_renews() {
        let h = Harness::new();
        let rst = h.rst(3);
        let data = participant_payload(3, Ipv4Addr::new(10, 0, 0, 5));

        assert!(handle_spdp_alive(&h.ctx, &h.svc, &rst, &data));
        let first = h.registry.proxy_participant(&guid(3)).expect("created");
        let expiry = first.lease_expiry();

        h.clock.advance(Duration::from_secs(1));
        assert!(!handle_spdp_alive(&h.ctx, &h.svc, &rst, &data));
        let again = h.registry.proxy_participant(&guid(3)).expect("still there");
        assert!(std::sync::Arc::ptr_eq(&first, &again));
        assert_eq!(again.lease_expiry(), expiry + 1_000_000_000);
        assert_eq!(h.registry.participant_count(), 1);
    }

    #[test]
    fn test_alive_without_guid_or_bes_is_dropped() {
        let h = Harness::new();
        let mut data = participant_payload(3, Ipv4Addr::new(10, 0, 0, 5));
        data.builtin_endpoint_set = None;
        assert!(!handle_spdp_alive(&h.ctx, &h.svc, &h.rst(3), &data));
        assert_eq!(h.registry.participant_count(), 0);
        assert_eq!(h.registry.metrics().snapshot().samples_dropped, 1);
    }

    #[test]
    fn test_local_participant_filtered_unless_loopback() {
        let mut h = Harness::new();
        h.add_local(LocalParticipant::new(guid(7)));
        let data = participant_payload(7, Ipv4Addr::new(10, 0, 0, 1));

        assert!(!handle_spdp_alive(&h.ctx, &h.svc, &h.rst(7), &data));
        assert!(h.registry.proxy_participant(&guid(7)).is_none());

        h.ctx.config.enable_loopback = true;
        assert!(handle_spdp_alive(&h.ctx, &h.svc, &h.rst(7), &data));
    }

    #[test]
    fn test_privileged_prefix_word_marks_local() {
        let h = Harness::new();
        let mut privileged = GuidPrefix([0x20; 12]);
        privileged.0[11] = 1;
        h.add_local(
            LocalParticipant::new(GUID::new(privileged, EntityId::PARTICIPANT)).privileged(),
        );

        let mut other = GuidPrefix([0x20; 12]);
        other.0[11] = 9;
        let mut data = participant_payload(0, Ipv4Addr::new(10, 0, 0, 9));
        data.participant_guid = Some(GUID::new(other, EntityId::PARTICIPANT));
        data.vendor_id = Some(VendorId::HDDS);
        assert!(!handle_spdp_alive(&h.ctx, &h.svc, &h.rst(0x21), &data));

        data.vendor_id = Some(VendorId::RTI);
        assert!(handle_spdp_alive(&h.ctx, &h.svc, &h.rst(0x21), &data));
    }

    #[test]
    fn test_recently_deleted_is_ignored() {
        let h = Harness::new();
        let data = participant_payload(4, Ipv4Addr::new(10, 0, 0, 4));
        assert!(handle_spdp_alive(&h.ctx, &h.svc, &h.rst(4), &data));
        handle_spdp_dead(&h.svc, &h.rst(4), &data);
        assert!(h.registry.proxy_participant(&guid(4)).is_none());
        assert!(!handle_spdp_alive(&h.ctx, &h.svc, &h.rst(4), &data));
    }

    #[test]
    fn test_depends_on_relay() {
        let h = Harness::new();
        let mut data = participant_payload(5, Ipv4Addr::new(10, 0, 0, 5));
        data.builtin_endpoint_set = Some(BES_PARTICIPANT_ANNOUNCER | BES_PARTICIPANT_DETECTOR);
        assert!(handle_spdp_alive(&h.ctx, &h.svc, &h.rst(6), &data));
        let pp = h.registry.proxy_participant(&guid(5)).expect("created");
        assert_eq!(pp.depends_on, Some(guid(6)));

        let mut own = participant_payload(8, Ipv4Addr::new(10, 0, 0, 8));
        own.builtin_endpoint_set = Some(BES_PARTICIPANT_ANNOUNCER);
        assert!(handle_spdp_alive(&h.ctx, &h.svc, &h.rst(8), &own));
        let pp = h.registry.proxy_participant(&guid(8)).expect("created");
        assert_eq!(pp.depends_on, None);
    }

    #[test]
    fn test_custom_flags() {
        let h = Harness::new();
        let mut data = participant_payload(5, Ipv4Addr::new(10, 0, 0, 5));
        data.service_type = Some(SERVICE_TYPE_DDSI2E);
        data.participant_version_info = Some(ParticipantVersionInfo {
            flags: PTFL_KERNEL_SEQUENCE_NUMBER | PTFL_PTBES_FIXED_0,
            ..Default::default()
        });
        handle_spdp_alive(&h.ctx, &h.svc, &h.rst(5), &data);
        let pp = h.registry.proxy_participant(&guid(5)).expect("created");
        assert!(pp.custom_flags.contains(CustomFlags::PARTICIPANT_IS_DDSI2));
        assert!(pp
            .custom_flags
            .contains(CustomFlags::INC_KERNEL_SEQUENCE_NUMBERS));
    }

    #[test]
    fn test_missing_unicast_uses_peer_locator() {
        let h = Harness::new();
        let mut data = participant_payload(5, Ipv4Addr::new(10, 0, 0, 5));
        data.default_unicast_locators.clear();
        data.metatraffic_unicast_locators.clear();
        assert!(!handle_spdp_alive(&h.ctx, &h.svc, &h.rst(5), &data));

        let peer = Locator::udpv4(Ipv4Addr::new(10, 0, 0, 5), 7410);
        let rst = h.rst(5).with_peer_locator(peer);
        assert!(handle_spdp_alive(&h.ctx, &h.svc, &rst, &data));
        let pp = h.registry.proxy_participant(&guid(5)).expect("created");
        assert_eq!(pp.metatraffic_locators.unicast(), vec![peer]);
    }

    #[test]
    fn test_response_scheduling_modes() {
        let mut h = Harness::new();
        h.add_local(LocalParticipant::new(guid(0x10)));
        let data = participant_payload(3, Ipv4Addr::new(10, 0, 0, 5));

        let directed = h.rst(3).with_dst_prefix(GuidPrefix([0x10; 12]));
        handle_spdp_alive(&h.ctx, &h.svc, &directed, &data);
        assert_eq!(h.events.pending_replies(), 0);

        handle_spdp_dead(&h.svc, &directed, &data);
        h.clock.advance(Duration::from_secs(60));
        handle_spdp_alive(&h.ctx, &h.svc, &h.rst(3), &data);
        assert_eq!(h.events.pending_replies(), 1);

        h.ctx.config.unicast_response_to_spdp = false;
        h.events.set_periodic_spdp(guid(0x10), u64::MAX);
        respond_to_spdp(&h.ctx, &h.svc, &guid(3));
        assert_eq!(h.events.next_spdp_time(&guid(0x10)), Some(h.clock.now()));
        assert_eq!(h.events.pending_replies(), 1);
    }

    #[test]
    fn test_spdp_write_contents() {
        let h = Harness::new();
        let mut pp = LocalParticipant::new(guid(0x10)).with_name("pp").privileged();
        pp.metatraffic_locators
            .add(Locator::udpv4(Ipv4Addr::new(10, 0, 0, 1), 7410));
        pp.metatraffic_locators
            .add(Locator::udpv4(Ipv4Addr::new(239, 255, 0, 1), 7400));
        pp.metatraffic_locators
            .add(Locator::udpv4(Ipv4Addr::new(232, 1, 1, 1), 7400));
        pp.qos.user_data = Some(vec![1, 2]);

        let mut ctx = h.ctx.clone();
        ctx.config.allow_multicast = crate::config::AllowMulticast::ASM;
        spdp_write(&ctx, &h.svc, &pp).expect("written");

        let (writer, sample) = h.samples.try_next().expect("one sample");
        assert_eq!(writer.entity_id, EntityId::SPDP_PARTICIPANT_WRITER);
        assert_eq!(sample.status, StatusInfo::ALIVE);
        assert_eq!(sample.key_hash, pp.guid.as_bytes());

        let data = decode(&sample.payload, VendorId::HDDS).expect("decodes");
        assert_eq!(data.participant_guid, Some(pp.guid));
        assert_eq!(data.metatraffic_unicast_locators.len(), 1);
        assert_eq!(
            data.metatraffic_multicast_locators,
            vec![Locator::udpv4(Ipv4Addr::new(239, 255, 0, 1), 7400)]
        );
        let info = data.participant_version_info.expect("version info");
        assert_ne!(info.flags & PTFL_PARTICIPANT_IS_DDSI2, 0);
        assert_ne!(info.flags & PTFL_PTBES_FIXED_0, 0);
        assert_eq!(data.qos.user_data, Some(vec![1, 2]));
        assert_eq!(data.entity_name.as_deref(), Some("pp"));
    }

    #[test]
    fn test_spdp_write_needs_writer() {
        let h = Harness::new();
        let pp = LocalParticipant::new(guid(0x10))
            .without_builtin_writer(EntityId::SPDP_PARTICIPANT_WRITER);
        assert!(matches!(
            spdp_write(&h.ctx, &h.svc, &pp),
            Err(crate::core::discovery::DiscoveryError::BuiltinWriterMissing { .. })
        ));
        assert!(h.samples.is_empty());
    }

    #[test]
    fn test_spdp_write_oversized_user_data() {
        let h = Harness::new();
        let mut pp = LocalParticipant::new(guid(0x10));
        pp.qos.user_data = Some(vec![0xee; 70_000]);
        assert!(matches!(
            spdp_write(&h.ctx, &h.svc, &pp),
            Err(crate::core::discovery::DiscoveryError::InvalidData { .. })
        ));
        assert!(h.samples.is_empty());
    }

    #[test]
    fn test_dispose_unregister_is_key_only() {
        let h = Harness::new();
        let pp = LocalParticipant::new(guid(0x10));
        spdp_dispose_unregister(&h.ctx, &h.svc, &pp).expect("written");
        let (_, sample) = h.samples.try_next().expect("one sample");
        assert_eq!(sample.status, StatusInfo::DISPOSE_UNREGISTER);
        let data = decode(&sample.payload, VendorId::HDDS).expect("decodes");
        assert_eq!(data, DiscoveryPayload::key_only(KeyField::Participant, pp.guid));
    }

    #[test]
    fn test_handle_spdp_rejects_garbage() {
        let h = Harness::new();
        handle_spdp(&h.ctx, &h.svc, &h.rst(1), StatusInfo::ALIVE, &[0xde, 0xad]);
        assert_eq!(h.registry.participant_count(), 0);
    }
}
