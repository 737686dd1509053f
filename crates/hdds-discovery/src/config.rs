// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Discovery configuration.
//!
//! Values are consumed as already-parsed settings by the handlers through
//! [`LocalContext`](crate::core::discovery::LocalContext). They can be built
//! in code (`with_*` builders), overridden from `HDDS_*` environment
//! variables, or loaded from YAML (feature `config-loaders`):
//!
//! ```yaml
//! allow_multicast: asm
//! multicast_ttl: 1
//! spdp_response_max_delay_ms: 0
//! unicast_response_to_spdp: true
//! enable_loopback: false
//! default_lease_duration_ms: 100000
//! ```

use crate::transport::Locator;
use std::time::Duration;

/// RTPS default multicast TTL (link-local scope).
pub const DEFAULT_MULTICAST_TTL: u8 = 1;

/// Lease assumed for participants that don't advertise one.
pub const DEFAULT_LEASE_DURATION: Duration = Duration::from_secs(100);

/// Upper bound accepted for the SPDP response jitter.
pub const MAX_SPDP_RESPONSE_DELAY: Duration = Duration::from_secs(1);

/// Which multicast flavours this process sends to and accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AllowMulticast {
    /// Any-source multicast (e.g. 239.255.0.1).
    pub asm: bool,
    /// Source-specific multicast (232.0.0.0/8, ff3x::/32).
    pub ssm: bool,
}

impl AllowMulticast {
    pub const NONE: AllowMulticast = AllowMulticast {
        asm: false,
        ssm: false,
    };
    pub const ASM: AllowMulticast = AllowMulticast {
        asm: true,
        ssm: false,
    };
    pub const ALL: AllowMulticast = AllowMulticast {
        asm: true,
        ssm: true,
    };

    pub fn any(&self) -> bool {
        self.asm || self.ssm
    }

    /// Whether a multicast locator may be used under this policy.
    pub fn allows(&self, loc: &Locator) -> bool {
        if loc.is_ssm() {
            self.ssm
        } else {
            self.asm
        }
    }

    /// Parse "false", "asm", "ssm", "true"/"any" (comma-separated allowed).
    pub fn parse(value: &str) -> Option<Self> {
        let mut policy = Self::NONE;
        for item in value.split(',').map(|s| s.trim().to_ascii_lowercase()) {
            match item.as_str() {
                "false" | "none" | "" => {}
                "asm" => policy.asm = true,
                "ssm" => policy.ssm = true,
                "true" | "any" => policy = Self::ALL,
                _ => return None,
            }
        }
        Some(policy)
    }
}

/// Discovery behaviour knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryConfig {
    /// Multicast acceptance policy (ASM/SSM).
    pub allow_multicast: AllowMulticast,

    /// Multicast TTL; above 1 routing is trusted and the unicast
    /// same-subnet filter is not applied.
    pub multicast_ttl: u8,

    /// Maximum jitter before answering a multicast SPDP announcement.
    pub spdp_response_max_delay: Duration,

    /// Answer broadcast SPDP with a directed one-off reply instead of
    /// advancing the periodic announcement.
    pub unicast_response_to_spdp: bool,

    /// Accept our own participants as proxies (loopback testing).
    pub enable_loopback: bool,

    /// RTI peers are assumed to have PMD endpoints even if not advertised.
    pub assume_rti_has_pmd_endpoints: bool,

    /// Include unicast locators in SPDP announcements.
    pub publish_uc_locators: bool,

    /// Publish every QoS policy, not only non-default ones.
    pub explicitly_publish_qos_set_to_default: bool,

    /// Accept IPv6 link-local locators.
    pub ipv6_link_local: bool,

    /// Lease applied when a participant doesn't advertise one.
    pub default_lease_duration: Duration,

    /// How long a deleted participant stays tombstoned.
    pub deleted_participant_retention: Duration,

    /// Reject keyhash-only dispose/unregister samples.
    pub strict_keyhash: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            allow_multicast: AllowMulticast::ALL,
            multicast_ttl: DEFAULT_MULTICAST_TTL,
            spdp_response_max_delay: Duration::ZERO,
            unicast_response_to_spdp: true,
            enable_loopback: false,
            assume_rti_has_pmd_endpoints: false,
            publish_uc_locators: true,
            explicitly_publish_qos_set_to_default: false,
            ipv6_link_local: false,
            default_lease_duration: DEFAULT_LEASE_DURATION,
            deleted_participant_retention: Duration::from_secs(10),
            strict_keyhash: false,
        }
    }
}

impl DiscoveryConfig {
    /// Builder: set multicast policy.
    pub fn with_allow_multicast(mut self, policy: AllowMulticast) -> Self {
        self.allow_multicast = policy;
        self
    }

    /// Builder: set multicast TTL.
    pub fn with_multicast_ttl(mut self, ttl: u8) -> Self {
        self.multicast_ttl = ttl;
        self
    }

    /// Builder: set SPDP response jitter bound.
    pub fn with_spdp_response_max_delay(mut self, delay: Duration) -> Self {
        self.spdp_response_max_delay = delay;
        self
    }

    /// Builder: reschedule the periodic SPDP instead of sending a reply.
    pub fn with_periodic_spdp_response(mut self) -> Self {
        self.unicast_response_to_spdp = false;
        self
    }

    /// Builder: accept own participants.
    pub fn with_loopback(mut self, enable: bool) -> Self {
        self.enable_loopback = enable;
        self
    }

    /// Builder: assume RTI PMD endpoints.
    pub fn with_rti_pmd_assumption(mut self, assume: bool) -> Self {
        self.assume_rti_has_pmd_endpoints = assume;
        self
    }

    /// Builder: publish full QoS.
    pub fn with_explicit_qos(mut self, explicit: bool) -> Self {
        self.explicitly_publish_qos_set_to_default = explicit;
        self
    }

    /// Builder: accept IPv6 link-local addresses.
    pub fn with_ipv6_link_local(mut self, enable: bool) -> Self {
        self.ipv6_link_local = enable;
        self
    }

    /// Builder: set the default participant lease.
    pub fn with_default_lease(mut self, lease: Duration) -> Self {
        self.default_lease_duration = lease;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.spdp_response_max_delay > MAX_SPDP_RESPONSE_DELAY {
            return Err("spdp_response_max_delay must be <= 1s");
        }
        if self.multicast_ttl == 0 && self.allow_multicast.any() {
            return Err("multicast_ttl must be > 0 when multicast is allowed");
        }
        if self.default_lease_duration.is_zero() {
            return Err("default_lease_duration must be > 0");
        }
        Ok(())
    }

    /// Apply `HDDS_*` environment overrides on top of `self`.
    ///
    /// - `HDDS_ALLOW_MULTICAST`: false | asm | ssm | true
    /// - `HDDS_MULTICAST_TTL`: 0-255
    /// - `HDDS_SPDP_RESPONSE_DELAY_MS`: milliseconds
    /// - `HDDS_SPDP_UNICAST_RESPONSE`: 0/1
    /// - `HDDS_DISCOVERY_LOOPBACK`: 0/1
    pub fn from_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("HDDS_ALLOW_MULTICAST") {
            match AllowMulticast::parse(&v) {
                Some(policy) => self.allow_multicast = policy,
                None => log::warn!("[CONFIG] Ignoring HDDS_ALLOW_MULTICAST={}", v),
            }
        }
        if let Some(v) = lookup("HDDS_MULTICAST_TTL") {
            match v.trim().parse::<u8>() {
                Ok(ttl) => self.multicast_ttl = ttl,
                Err(_) => log::warn!("[CONFIG] Ignoring HDDS_MULTICAST_TTL={}", v),
            }
        }
        if let Some(v) = lookup("HDDS_SPDP_RESPONSE_DELAY_MS") {
            match v.trim().parse::<u64>() {
                Ok(ms) => self.spdp_response_max_delay = Duration::from_millis(ms),
                Err(_) => log::warn!("[CONFIG] Ignoring HDDS_SPDP_RESPONSE_DELAY_MS={}", v),
            }
        }
        if let Some(v) = lookup("HDDS_SPDP_UNICAST_RESPONSE") {
            self.unicast_response_to_spdp = parse_flag(&v);
        }
        if let Some(v) = lookup("HDDS_DISCOVERY_LOOPBACK") {
            self.enable_loopback = parse_flag(&v);
        }
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(feature = "config-loaders")]
mod yaml {
    use super::{AllowMulticast, DiscoveryConfig};
    use crate::core::discovery::{DiscoveryError, DiscoveryResult};
    use serde::Deserialize;
    use std::path::Path;
    use std::time::Duration;

    /// YAML document; every key is optional and falls back to the default.
    #[derive(Debug, Deserialize, Default)]
    #[serde(default, deny_unknown_fields)]
    struct YamlDiscoveryConfig {
        allow_multicast: Option<String>,
        multicast_ttl: Option<u8>,
        spdp_response_max_delay_ms: Option<u64>,
        unicast_response_to_spdp: Option<bool>,
        enable_loopback: Option<bool>,
        assume_rti_has_pmd_endpoints: Option<bool>,
        publish_uc_locators: Option<bool>,
        explicitly_publish_qos_set_to_default: Option<bool>,
        ipv6_link_local: Option<bool>,
        default_lease_duration_ms: Option<u64>,
        deleted_participant_retention_ms: Option<u64>,
        strict_keyhash: Option<bool>,
    }

    impl DiscoveryConfig {
        /// Parse a YAML document and validate the result.
        pub fn from_yaml_str(text: &str) -> DiscoveryResult<Self> {
            let doc: YamlDiscoveryConfig =
                serde_yaml::from_str(text).map_err(|e| DiscoveryError::InvalidConfig {
                    reason: e.to_string(),
                })?;

            let mut cfg = DiscoveryConfig::default();
            if let Some(policy) = doc.allow_multicast {
                cfg.allow_multicast =
                    AllowMulticast::parse(&policy).ok_or_else(|| DiscoveryError::InvalidConfig {
                        reason: format!("allow_multicast: unknown policy '{}'", policy),
                    })?;
            }
            if let Some(ttl) = doc.multicast_ttl {
                cfg.multicast_ttl = ttl;
            }
            if let Some(ms) = doc.spdp_response_max_delay_ms {
                cfg.spdp_response_max_delay = Duration::from_millis(ms);
            }
            if let Some(v) = doc.unicast_response_to_spdp {
                cfg.unicast_response_to_spdp = v;
            }
            if let Some(v) = doc.enable_loopback {
                cfg.enable_loopback = v;
            }
            if let Some(v) = doc.assume_rti_has_pmd_endpoints {
                cfg.assume_rti_has_pmd_endpoints = v;
            }
            if let Some(v) = doc.publish_uc_locators {
                cfg.publish_uc_locators = v;
            }
            if let Some(v) = doc.explicitly_publish_qos_set_to_default {
                cfg.explicitly_publish_qos_set_to_default = v;
            }
            if let Some(v) = doc.ipv6_link_local {
                cfg.ipv6_link_local = v;
            }
            if let Some(ms) = doc.default_lease_duration_ms {
                cfg.default_lease_duration = Duration::from_millis(ms);
            }
            if let Some(ms) = doc.deleted_participant_retention_ms {
                cfg.deleted_participant_retention = Duration::from_millis(ms);
            }
            if let Some(v) = doc.strict_keyhash {
                cfg.strict_keyhash = v;
            }

            cfg.validate().map_err(|reason| DiscoveryError::InvalidConfig {
                reason: reason.to_string(),
            })?;
            log::debug!("[CONFIG] Loaded discovery config: {:?}", cfg);
            Ok(cfg)
        }

        /// Load from a YAML file.
        pub fn from_yaml_file(path: impl AsRef<Path>) -> DiscoveryResult<Self> {
            let path = path.as_ref();
            let text = std::fs::read_to_string(path).map_err(|e| DiscoveryError::InvalidConfig {
                reason: format!("{}: {}", path.display(), e),
            })?;
            Self::from_yaml_str(&text)
        }
    }
}
