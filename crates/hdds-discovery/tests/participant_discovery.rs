// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! SPDP through the built-in dispatcher: creation, renewal, self-filter and
//! disposal.

mod common;

use common::{participant, sample, spdp_payload, v4, Call, Node};
use hdds_discovery::config::DiscoveryConfig;
use hdds_discovery::core::discovery::builtin::HandlerKind;
use hdds_discovery::core::discovery::{
    BuiltinSample, DispatchOutcome, EntityId, Fragment, LocalParticipant, ProxyModel, VendorId,
};
use hdds_discovery::protocol::discovery::{encode, guid_key_hash, StatusInfo};
use std::sync::Arc;
use std::time::Duration;

const SPDP: EntityId = EntityId::SPDP_PARTICIPANT_WRITER;

#[test]
fn test_g1_created_once_then_renewed() {
    let node = Node::new();
    let dispatcher = node.dispatcher();
    let g1 = participant(5);
    let data = spdp_payload(g1, v4(10, 0, 0, 5, 7400), Duration::from_secs(30));

    assert_eq!(
        dispatcher.dispatch(sample(5, VendorId::EPROSIMA, SPDP, &data)),
        DispatchOutcome::Routed(HandlerKind::Spdp)
    );
    assert_eq!(node.model.count(&Call::CreateParticipant(g1)), 1);
    let pp = node.registry.proxy_participant(&g1).expect("proxy");
    assert_eq!(pp.lease_expiry(), 31_000_000_000);
    assert_eq!(pp.default_locators.unicast(), vec![v4(10, 0, 0, 5, 7400)]);

    node.clock.advance(Duration::from_secs(1));
    dispatcher.dispatch(sample(5, VendorId::EPROSIMA, SPDP, &data));

    assert_eq!(node.model.count(&Call::CreateParticipant(g1)), 1);
    assert_eq!(node.model.count(&Call::RenewLease(g1)), 1);
    assert_eq!(pp.lease_expiry(), 32_000_000_000);
}

#[test]
fn test_reannouncement_does_not_touch_fields() {
    let node = Node::new();
    let dispatcher = node.dispatcher();
    let guid = participant(5);
    let data = spdp_payload(guid, v4(10, 0, 0, 5, 7400), Duration::from_secs(30));
    dispatcher.dispatch(sample(5, VendorId::EPROSIMA, SPDP, &data));
    let before = node.registry.proxy_participant(&guid).expect("proxy");
    let caps = before.capabilities;
    let default_uc = before.default_locators.unicast();
    let meta_uc = before.metatraffic_locators.unicast();

    let mut moved = spdp_payload(guid, v4(10, 0, 0, 6, 7400), Duration::from_secs(5));
    moved.builtin_endpoint_set = Some(0x3);
    dispatcher.dispatch(sample(5, VendorId::EPROSIMA, SPDP, &moved));

    let after = node.registry.proxy_participant(&guid).expect("proxy");
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(after.capabilities, caps);
    assert_eq!(after.default_locators.unicast(), default_uc);
    assert_eq!(after.metatraffic_locators.unicast(), meta_uc);
    assert_eq!(after.lease_duration, Duration::from_secs(30));
}

#[test]
fn test_self_filter_and_loopback() {
    let own = participant(0x10);
    let data = spdp_payload(own, v4(10, 0, 0, 1, 7400), Duration::from_secs(30));

    let node = Node::new();
    node.registry.add_local_participant(LocalParticipant::new(own));
    node.dispatcher()
        .dispatch(sample(0x10, VendorId::HDDS, SPDP, &data));
    assert!(node.registry.proxy_participant(&own).is_none());
    assert!(node.model.calls().is_empty());

    let node = Node::with_config(DiscoveryConfig::default().with_loopback(true));
    node.registry.add_local_participant(LocalParticipant::new(own));
    node.dispatcher()
        .dispatch(sample(0x10, VendorId::HDDS, SPDP, &data));
    assert!(node.registry.proxy_participant(&own).is_some());
}

#[test]
fn test_keyhash_only_dispose_deletes_participant() {
    let node = Node::new();
    let dispatcher = node.dispatcher();
    let guid = participant(5);
    let data = spdp_payload(guid, v4(10, 0, 0, 5, 7400), Duration::from_secs(30));
    dispatcher.dispatch(sample(5, VendorId::EPROSIMA, SPDP, &data));

    let dispose = BuiltinSample::keyhash_only(
        common::rst(5, VendorId::EPROSIMA),
        SPDP,
        StatusInfo::DISPOSE_UNREGISTER,
        guid_key_hash(&guid),
    );
    assert_eq!(
        dispatcher.dispatch(dispose),
        DispatchOutcome::Routed(HandlerKind::Spdp)
    );
    assert!(node.registry.proxy_participant(&guid).is_none());
    assert!(node.registry.is_recently_deleted(&guid, node.svc.now()));

    // a looped-back announcement does not resurrect it
    dispatcher.dispatch(sample(5, VendorId::EPROSIMA, SPDP, &data));
    assert_eq!(node.model.count(&Call::CreateParticipant(guid)), 1);
}

#[test]
fn test_fragments_in_any_order() {
    let node = Node::new();
    let dispatcher = node.dispatcher();
    let guid = participant(5);
    let bytes = encode(
        &spdp_payload(guid, v4(10, 0, 0, 5, 7400), Duration::from_secs(30)),
        VendorId::EPROSIMA,
    )
    .expect("encode");
    let mut fragments: Vec<Fragment> = bytes
        .chunks(16)
        .enumerate()
        .map(|(i, chunk)| Fragment::new((i * 16) as u32, chunk))
        .collect();
    // duplicate one chunk to exercise overlap handling
    fragments.push(fragments[1].clone());
    fastrand::Rng::with_seed(42).shuffle(&mut fragments);

    let mut s = BuiltinSample::data(common::rst(5, VendorId::EPROSIMA), SPDP, Vec::new());
    s.size = bytes.len() as u32;
    s.fragments = fragments;
    assert_eq!(
        dispatcher.dispatch(s),
        DispatchOutcome::Routed(HandlerKind::Spdp)
    );
    assert!(node.registry.proxy_participant(&guid).is_some());
}

#[test]
fn test_empty_alive_sample_dropped() {
    let node = Node::new();
    let s = BuiltinSample::data(common::rst(5, VendorId::EPROSIMA), SPDP, Vec::new());
    assert_eq!(node.dispatcher().dispatch(s), DispatchOutcome::Dropped);
    assert_eq!(node.registry.metrics().snapshot().samples_dropped, 1);
}
