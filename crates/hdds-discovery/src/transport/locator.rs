// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! RTPS Locator_t (kind + port + 16-byte address).
//!
//! # RTPS v2.3 Sec.9.3.1 Locator_t Structure
//! ```text
//! struct Locator_t {
//!   long kind;          // 4 bytes: LOCATOR_KIND_UDPv4 (1), LOCATOR_KIND_UDPv6 (2)
//!   unsigned long port; // 4 bytes
//!   octet address[16];  // 16 bytes: IPv4 in last 4 bytes, first 12 are zeros
//! };
//! ```

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

/// Wire size of a Locator_t.
pub const LOCATOR_SIZE: usize = 24;

/// Transport kind carried in a locator.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LocatorKind {
    UdpV4,
    UdpV6,
    TcpV4,
    TcpV6,
    Other(i32),
}

impl LocatorKind {
    pub fn from_wire(raw: i32) -> Self {
        match raw {
            1 => Self::UdpV4,
            2 => Self::UdpV6,
            4 => Self::TcpV4,
            8 => Self::TcpV6,
            other => Self::Other(other),
        }
    }

    pub fn to_wire(self) -> i32 {
        match self {
            Self::UdpV4 => 1,
            Self::UdpV6 => 2,
            Self::TcpV4 => 4,
            Self::TcpV6 => 8,
            Self::Other(raw) => raw,
        }
    }

    fn is_v4(self) -> bool {
        matches!(self, Self::UdpV4 | Self::TcpV4)
    }
}

/// A transport address advertised in discovery data.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Locator {
    pub kind: LocatorKind,
    pub port: u32,
    pub address: [u8; 16],
}

impl Locator {
    pub fn udpv4(addr: Ipv4Addr, port: u16) -> Self {
        let mut address = [0u8; 16];
        address[12..16].copy_from_slice(&addr.octets());
        Self {
            kind: LocatorKind::UdpV4,
            port: u32::from(port),
            address,
        }
    }

    pub fn udpv6(addr: Ipv6Addr, port: u16) -> Self {
        Self {
            kind: LocatorKind::UdpV6,
            port: u32::from(port),
            address: addr.octets(),
        }
    }

    pub fn from_socket_addr(addr: SocketAddr) -> Self {
        match addr {
            SocketAddr::V4(v4) => Self::udpv4(*v4.ip(), v4.port()),
            SocketAddr::V6(v6) => Self::udpv6(*v6.ip(), v6.port()),
        }
    }

    /// IPv4 address for v4 kinds (last four address octets).
    pub fn ipv4(&self) -> Option<Ipv4Addr> {
        if !self.kind.is_v4() {
            return None;
        }
        let a = &self.address;
        Some(Ipv4Addr::new(a[12], a[13], a[14], a[15]))
    }

    pub fn ip(&self) -> Option<IpAddr> {
        match self.kind {
            LocatorKind::UdpV4 | LocatorKind::TcpV4 => self.ipv4().map(IpAddr::V4),
            LocatorKind::UdpV6 | LocatorKind::TcpV6 => {
                Some(IpAddr::V6(Ipv6Addr::from(self.address)))
            }
            LocatorKind::Other(_) => None,
        }
    }

    pub fn socket_addr(&self) -> Option<SocketAddr> {
        let port = u16::try_from(self.port).ok()?;
        self.ip().map(|ip| SocketAddr::new(ip, port))
    }

    /// Copy of this locator with its IPv4 address replaced.
    pub fn with_ipv4(&self, addr: Ipv4Addr) -> Self {
        let mut loc = *self;
        loc.address[12..16].copy_from_slice(&addr.octets());
        loc
    }

    pub fn is_multicast(&self) -> bool {
        self.ip().is_some_and(|ip| ip.is_multicast())
    }

    /// Source-specific multicast range: 232.0.0.0/8 or ff3x::/32.
    pub fn is_ssm(&self) -> bool {
        match self.ip() {
            Some(IpAddr::V4(v4)) => v4.octets()[0] == 232,
            Some(IpAddr::V6(v6)) => {
                let o = v6.octets();
                o[0] == 0xff && (o[1] & 0xf0) == 0x30
            }
            None => false,
        }
    }

    /// fe80::/10
    pub fn is_ipv6_link_local(&self) -> bool {
        match self.ip() {
            Some(IpAddr::V6(v6)) => {
                let o = v6.octets();
                o[0] == 0xfe && (o[1] & 0xc0) == 0x80
            }
            _ => false,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = match self.kind {
            LocatorKind::UdpV4 => "udp",
            LocatorKind::UdpV6 => "udp6",
            LocatorKind::TcpV4 => "tcp",
            LocatorKind::TcpV6 => "tcp6",
            LocatorKind::Other(_) => "?",
        };
        match self.ip() {
            Some(IpAddr::V6(ip)) => write!(f, "{}/[{}]:{}", scheme, ip, self.port),
            Some(ip) => write!(f, "{}/{}:{}", scheme, ip, self.port),
            None => write!(f, "{}/{:02x?}:{}", scheme, self.address, self.port),
        }
    }
}

impl fmt::Debug for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Locator({})", self)
    }
}
