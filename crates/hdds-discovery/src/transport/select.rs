// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Best-locator selection among the addresses a remote entity advertises.
//!
//! Priority order:
//! 1. NAT un-translation: a UDPv4 candidate in the configured external
//!    subnet is rewritten to the internal address and wins outright.
//! 2. A candidate on the subnet of the interface owning our primary
//!    address wins outright.
//! 3. Otherwise the first candidate on any local subnet ("same-net"), then
//!    the first acceptable candidate, unless `require_same_subnet` is set,
//!    in which case nothing is returned and the caller relies on multicast.
//!
//! Selection is pure: the same candidates and context always give the same
//! result.

use super::{Locator, LocatorKind};
use crate::core::discovery::LocalContext;
use std::net::IpAddr;

/// Pick one locator from `candidates`, see module docs for the rules.
pub fn select_locator(
    ctx: &LocalContext,
    candidates: &[Locator],
    require_same_subnet: bool,
) -> Option<Locator> {
    let mut first: Option<Locator> = None;
    let mut same_net: Option<Locator> = None;

    for cand in candidates {
        if !ctx.supports_kind(cand.kind) {
            continue;
        }

        if cand.kind == LocatorKind::UdpV4 {
            if let (Some(nat), Some(addr), IpAddr::V4(own)) = (ctx.nat, cand.ipv4(), ctx.own_ip) {
                if nat.matches(addr) {
                    let internal = cand.with_ipv4(nat.untranslate(addr, own));
                    log::trace!("[LOCATOR] NAT {} -> {}", cand, internal);
                    return Some(internal);
                }
            }
        }

        if cand.is_ipv6_link_local() && !ctx.config.ipv6_link_local {
            log::trace!("[LOCATOR] Skipping link-local {}", cand);
            continue;
        }

        if first.is_none() {
            first = Some(*cand);
        }

        let Some(ip) = cand.ip() else {
            continue;
        };
        for iface in &ctx.interfaces {
            if !iface.network.contains(ip) {
                continue;
            }
            if iface.addr() == ctx.own_ip {
                return Some(*cand);
            }
            if same_net.is_none() {
                same_net = Some(*cand);
            }
        }
    }

    if require_same_subnet {
        log::trace!("[LOCATOR] No locator on the primary interface subnet");
        None
    } else {
        same_net.or(first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiscoveryConfig;
    use crate::transport::NatMapping;
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn ctx() -> LocalContext {
        LocalContext::new(DiscoveryConfig::default(), "10.0.0.1".parse().unwrap())
            .with_interface("eth0", "10.0.0.1/24".parse().unwrap())
            .with_interface("eth1", "172.16.0.1/16".parse().unwrap())
    }

    fn v4(a: u8, b: u8, c: u8, d: u8) -> Locator {
        Locator::udpv4(Ipv4Addr::new(a, b, c, d), 7400)
    }

    #[test]
    fn test_primary_interface_wins() {
        let cands = [v4(192, 168, 9, 9), v4(172, 16, 3, 3), v4(10, 0, 0, 9)];
        assert_eq!(select_locator(&ctx(), &cands, false), Some(v4(10, 0, 0, 9)));
        assert_eq!(select_locator(&ctx(), &cands, true), Some(v4(10, 0, 0, 9)));
    }

    #[test]
    fn test_same_net_preferred_over_first() {
        let cands = [v4(192, 168, 9, 9), v4(172, 16, 3, 3)];
        assert_eq!(select_locator(&ctx(), &cands, false), Some(v4(172, 16, 3, 3)));
    }

    #[test]
    fn test_first_when_no_subnet_match() {
        let cands = [v4(192, 168, 9, 9), v4(8, 8, 8, 8)];
        assert_eq!(select_locator(&ctx(), &cands, false), Some(v4(192, 168, 9, 9)));
    }

    #[test]
    fn test_same_subnet_veto() {
        let cands = [v4(192, 168, 9, 9), v4(8, 8, 8, 8)];
        assert_eq!(select_locator(&ctx(), &cands, true), None);
    }

    #[test]
    fn test_same_net_only_is_vetoed_when_required() {
        let cands = [v4(172, 16, 3, 3)];
        assert_eq!(select_locator(&ctx(), &cands, true), None);
    }

    #[test]
    fn test_nat_rewrite_takes_precedence() {
        let nat = NatMapping::new(Ipv4Addr::new(203, 0, 113, 1), Ipv4Addr::new(255, 255, 255, 0));
        let ctx = ctx().with_nat(nat);
        let cands = [v4(10, 0, 0, 9), v4(203, 0, 113, 77)];
        assert_eq!(select_locator(&ctx, &cands, true), Some(v4(10, 0, 0, 9)));

        let cands = [v4(172, 16, 3, 3), v4(203, 0, 113, 77)];
        assert_eq!(select_locator(&ctx, &cands, false), Some(v4(10, 0, 0, 77)));
    }

    #[test]
    fn test_unsupported_kind_skipped() {
        let ctx = ctx().with_supported_kinds(vec![LocatorKind::UdpV4]);
        let v6 = Locator::udpv6("2001:db8::1".parse::<Ipv6Addr>().unwrap(), 7400);
        assert_eq!(select_locator(&ctx, &[v6], false), None);
        assert_eq!(
            select_locator(&ctx, &[v6, v4(8, 8, 8, 8)], false),
            Some(v4(8, 8, 8, 8))
        );
    }

    #[test]
    fn test_link_local_requires_opt_in() {
        let ll = Locator::udpv6("fe80::1".parse::<Ipv6Addr>().unwrap(), 7400);
        assert_eq!(select_locator(&ctx(), &[ll], false), None);

        let mut ctx = ctx();
        ctx.config = DiscoveryConfig::default().with_ipv6_link_local(true);
        assert_eq!(select_locator(&ctx, &[ll], false), Some(ll));
    }

    #[test]
    fn test_empty_candidates() {
        assert_eq!(select_locator(&ctx(), &[], false), None);
    }
}
