// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Static NAT mapping used to un-translate advertised external addresses.
//!
//! Participants behind a 1:1 NAT advertise their external address. Peers on
//! the same inside network see that address and must map it back to the
//! internal one: `(addr & !mask) | (own_ip & mask)`.

use std::net::Ipv4Addr;

/// External address and the mask of bits that the NAT rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NatMapping {
    pub external: Ipv4Addr,
    pub mask: Ipv4Addr,
}

impl NatMapping {
    pub fn new(external: Ipv4Addr, mask: Ipv4Addr) -> Self {
        Self { external, mask }
    }

    /// Whether `addr` lies in the external subnet. A zero mask disables NAT.
    pub fn matches(&self, addr: Ipv4Addr) -> bool {
        let mask = u32::from(self.mask);
        mask != 0 && (u32::from(addr) & mask) == (u32::from(self.external) & mask)
    }

    /// Replace the masked bits of `addr` with those of `internal`.
    pub fn untranslate(&self, addr: Ipv4Addr, internal: Ipv4Addr) -> Ipv4Addr {
        let mask = u32::from(self.mask);
        Ipv4Addr::from((u32::from(addr) & !mask) | (u32::from(internal) & mask))
    }

    /// Read `HDDS_EXTERNAL_ADDRESS` / `HDDS_EXTERNAL_MASK`.
    pub fn from_env() -> Option<Self> {
        let external = std::env::var("HDDS_EXTERNAL_ADDRESS").ok()?;
        let mask = std::env::var("HDDS_EXTERNAL_MASK").ok()?;
        match (external.trim().parse(), mask.trim().parse()) {
            (Ok(external), Ok(mask)) => Some(Self::new(external, mask)),
            _ => {
                log::warn!(
                    "[CONFIG] Ignoring invalid NAT mapping {}/{}",
                    external,
                    mask
                );
                None
            }
        }
    }
}
