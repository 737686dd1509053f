// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Local network interfaces and CIDR subnet matching.

use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

/// An interface address with its subnet prefix ("10.0.0.5/24").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IpNetwork {
    /// Interface (host) address, not normalized to the network address.
    pub addr: IpAddr,
    /// Prefix length (0-32 for IPv4, 0-128 for IPv6)
    pub prefix_len: u8,
}

impl IpNetwork {
    /// Prefix lengths beyond the family maximum are clamped.
    #[must_use]
    pub fn new(addr: IpAddr, prefix_len: u8) -> Self {
        let max = if addr.is_ipv4() { 32 } else { 128 };
        Self {
            addr,
            prefix_len: prefix_len.min(max),
        }
    }

    #[must_use]
    pub fn v4(addr: Ipv4Addr, prefix_len: u8) -> Self {
        Self::new(IpAddr::V4(addr), prefix_len)
    }

    /// Check if an IP address lies in this network's subnet.
    #[must_use]
    pub fn contains(&self, ip: IpAddr) -> bool {
        match (self.addr, ip) {
            (IpAddr::V4(net), IpAddr::V4(ip)) => {
                let mask = v4_mask(self.prefix_len);
                (u32::from(net) & mask) == (u32::from(ip) & mask)
            }
            (IpAddr::V6(net), IpAddr::V6(ip)) => {
                let mask = v6_mask(self.prefix_len);
                (u128::from(net) & mask) == (u128::from(ip) & mask)
            }
            _ => false,
        }
    }

    /// Network mask as an IPv4 address, `None` for IPv6 networks.
    #[must_use]
    pub fn v4_netmask(&self) -> Option<Ipv4Addr> {
        self.addr
            .is_ipv4()
            .then(|| Ipv4Addr::from(v4_mask(self.prefix_len)))
    }
}

fn v4_mask(prefix_len: u8) -> u32 {
    if prefix_len == 0 {
        0
    } else {
        !0u32 << (32 - u32::from(prefix_len.min(32)))
    }
}

fn v6_mask(prefix_len: u8) -> u128 {
    if prefix_len == 0 {
        0
    } else {
        !0u128 << (128 - u32::from(prefix_len.min(128)))
    }
}

/// Convert a dotted netmask ("255.255.255.0") to a prefix length.
#[must_use]
pub fn prefix_len_from_mask(mask: Ipv4Addr) -> u8 {
    u32::from(mask).leading_ones() as u8
}

impl FromStr for IpNetwork {
    type Err = NetworkParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((addr, prefix)) = s.split_once('/') else {
            // Single IP: host route
            let addr: IpAddr = s.parse().map_err(|_| NetworkParseError::InvalidAddress)?;
            let host_len = if addr.is_ipv4() { 32 } else { 128 };
            return Ok(Self::new(addr, host_len));
        };

        let addr: IpAddr = addr
            .trim()
            .parse()
            .map_err(|_| NetworkParseError::InvalidAddress)?;
        let prefix_len: u8 = prefix
            .trim()
            .parse()
            .map_err(|_| NetworkParseError::InvalidPrefix)?;
        let max = if addr.is_ipv4() { 32 } else { 128 };
        if prefix_len > max {
            return Err(NetworkParseError::InvalidPrefix);
        }
        Ok(Self::new(addr, prefix_len))
    }
}

impl std::fmt::Display for IpNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix_len)
    }
}

/// Error parsing a CIDR network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkParseError {
    /// Invalid IP address
    InvalidAddress,
    /// Invalid prefix length
    InvalidPrefix,
}

impl std::fmt::Display for NetworkParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAddress => write!(f, "invalid IP address"),
            Self::InvalidPrefix => write!(f, "invalid prefix length"),
        }
    }
}

impl std::error::Error for NetworkParseError {}

/// A local network interface as seen by the locator selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInterface {
    pub name: String,
    pub network: IpNetwork,
}

impl NetworkInterface {
    pub fn new(name: impl Into<String>, network: IpNetwork) -> Self {
        Self {
            name: name.into(),
            network,
        }
    }

    pub fn addr(&self) -> IpAddr {
        self.network.addr
    }
}

/// Default prefix assumed for detected interfaces, whose netmask the OS
/// listing does not report.
const DETECTED_V4_PREFIX: u8 = 24;
const DETECTED_V6_PREFIX: u8 = 64;

/// Enumerate non-loopback interfaces via the `local_ip_address` crate.
///
/// `HDDS_INTERFACE_PREFIX_V4` overrides the assumed IPv4 prefix length.
pub fn detect_interfaces() -> Vec<NetworkInterface> {
    let v4_prefix = std::env::var("HDDS_INTERFACE_PREFIX_V4")
        .ok()
        .and_then(|v| v.parse::<u8>().ok())
        .filter(|p| *p <= 32)
        .unwrap_or(DETECTED_V4_PREFIX);

    let interfaces = match local_ip_address::list_afinet_netifas() {
        Ok(ifs) => ifs,
        Err(e) => {
            log::debug!("[LOCATOR] Failed to list network interfaces: {}", e);
            return Vec::new();
        }
    };

    interfaces
        .into_iter()
        .filter(|(_, ip)| !ip.is_loopback())
        .map(|(name, ip)| {
            let prefix = match ip {
                IpAddr::V4(_) => v4_prefix,
                IpAddr::V6(_) => DETECTED_V6_PREFIX,
            };
            log::debug!("[LOCATOR] Detected interface {} {}/{}", name, ip, prefix);
            NetworkInterface::new(name, IpNetwork::new(ip, prefix))
        })
        .collect()
}

/// The process's primary address, if one can be determined.
pub fn detect_primary_address() -> Option<IpAddr> {
    match local_ip_address::local_ip() {
        Ok(ip) => Some(ip),
        Err(e) => {
            log::debug!("[LOCATOR] No primary address: {}", e);
            None
        }
    }
}
