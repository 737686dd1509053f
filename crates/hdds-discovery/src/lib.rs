// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # hdds-discovery - SPDP/SEDP discovery core
//!
//! Receives the built-in discovery traffic of an RTPS domain, keeps the
//! model of remote participants, endpoints and groups current, and
//! publishes the local ones.
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |   BuiltinDispatcher (defragment, keyhash, route by writer id)       |
//! +---------------------------------------------------------------------+
//! |   spdp       |   sedp        |   topic        |   group (CM)        |
//! +---------------------------------------------------------------------+
//! |   ProxyModel / ProxyRegistry    |   EventScheduler   | SampleWriter |
//! +---------------------------------------------------------------------+
//! |   select_locator (interfaces, NAT, multicast policy)                |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use hdds_discovery::config::DiscoveryConfig;
//! use hdds_discovery::core::discovery::{
//!     BuiltinDispatcher, DiscoveryServices, EventQueue, LocalContext, ProxyRegistry, SampleQueue,
//! };
//! use std::sync::Arc;
//!
//! let config = DiscoveryConfig::default().from_env();
//! let ctx = LocalContext::detect(config.clone());
//! let registry = Arc::new(ProxyRegistry::new(config.deleted_participant_retention));
//! let svc = DiscoveryServices::with_registry(
//!     registry,
//!     Arc::new(EventQueue::new()),
//!     Arc::new(SampleQueue::new()),
//! );
//! let dispatcher = BuiltinDispatcher::new(ctx, svc);
//! # let _ = dispatcher;
//! ```

// Clippy: No blanket suppressions. Fix issues properly or use inline #[allow] with justification.

/// Discovery configuration (multicast policy, SPDP response, leases).
pub mod config;
/// Discovery handlers and the proxy model.
pub mod core;
/// Logging conventions and the `trace_fn!` macro.
pub mod logging;
/// Discovery wire format (parameter lists, QoS, constants).
pub mod protocol;
/// Locators, interfaces, NAT and locator selection.
pub mod transport;

pub use config::{AllowMulticast, DiscoveryConfig};
pub use core::discovery::{
    BuiltinDispatcher, BuiltinSample, DiscoveryError, DiscoveryResult, DiscoveryServices,
    LocalContext, ProxyModel, ProxyRegistry, GUID,
};
pub use transport::{select_locator, Locator};
