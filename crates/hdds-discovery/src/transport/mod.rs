// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Addressing: locators, interface table, NAT mapping and locator selection.

pub mod locator;
pub mod nat;
pub mod network;
pub mod select;

pub use locator::{Locator, LocatorKind, LOCATOR_SIZE};
pub use nat::NatMapping;
pub use network::{IpNetwork, NetworkInterface};
pub use select::select_locator;
