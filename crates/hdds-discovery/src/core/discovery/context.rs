// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Read-only local identity and network view passed to every handler.

use super::{ProtocolVersion, VendorId};
use crate::config::DiscoveryConfig;
use crate::transport::network::{self, IpNetwork, NetworkInterface};
use crate::transport::{LocatorKind, NatMapping};
use std::net::{IpAddr, Ipv4Addr};

/// Own vendor, configuration and interface table.
///
/// Handlers never read process globals; everything they need about the
/// local process comes through this struct, so tests can build arbitrary
/// network views.
#[derive(Debug, Clone)]
pub struct LocalContext {
    pub vendor: VendorId,
    pub protocol_version: ProtocolVersion,
    pub config: DiscoveryConfig,
    /// Local interfaces with their subnets.
    pub interfaces: Vec<NetworkInterface>,
    /// Primary address of this process (the interface it binds to).
    pub own_ip: IpAddr,
    /// External address/mask for NAT un-translation.
    pub nat: Option<NatMapping>,
    /// Locator kinds the active transport can reach.
    pub supported_kinds: Vec<LocatorKind>,
    /// Host name advertised in participant version info.
    pub host_name: String,
}

impl LocalContext {
    pub fn new(config: DiscoveryConfig, own_ip: IpAddr) -> Self {
        Self {
            vendor: VendorId::HDDS,
            protocol_version: ProtocolVersion::V2_1,
            config,
            interfaces: Vec::new(),
            own_ip,
            nat: None,
            supported_kinds: vec![LocatorKind::UdpV4, LocatorKind::UdpV6],
            host_name: String::new(),
        }
    }

    /// Build from the host's interfaces.
    ///
    /// `HDDS_EXTERNAL_ADDRESS` and `HDDS_EXTERNAL_MASK` configure NAT
    /// un-translation.
    pub fn detect(config: DiscoveryConfig) -> Self {
        let interfaces = network::detect_interfaces();
        let own_ip = network::detect_primary_address()
            .or_else(|| interfaces.first().map(NetworkInterface::addr))
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));

        let mut ctx = Self::new(config, own_ip).with_interfaces(interfaces);
        ctx.nat = NatMapping::from_env();
        ctx.host_name = std::env::var("HOSTNAME").unwrap_or_default();
        log::debug!(
            "[CONFIG] Local context: own_ip={} interfaces={} nat={:?}",
            ctx.own_ip,
            ctx.interfaces.len(),
            ctx.nat
        );
        ctx
    }

    #[must_use]
    pub fn with_interfaces(mut self, interfaces: Vec<NetworkInterface>) -> Self {
        self.interfaces = interfaces;
        self
    }

    /// Add an interface given in CIDR form, e.g. `"10.0.0.1/24"`.
    #[must_use]
    pub fn with_interface(mut self, name: &str, network: IpNetwork) -> Self {
        self.interfaces.push(NetworkInterface::new(name, network));
        self
    }

    #[must_use]
    pub fn with_nat(mut self, nat: NatMapping) -> Self {
        self.nat = Some(nat);
        self
    }

    #[must_use]
    pub fn with_vendor(mut self, vendor: VendorId) -> Self {
        self.vendor = vendor;
        self
    }

    #[must_use]
    pub fn with_supported_kinds(mut self, kinds: Vec<LocatorKind>) -> Self {
        self.supported_kinds = kinds;
        self
    }

    pub fn supports_kind(&self, kind: LocatorKind) -> bool {
        self.supported_kinds.contains(&kind)
    }

    pub fn is_own_vendor(&self, vendor: VendorId) -> bool {
        self.vendor == vendor
    }
}
