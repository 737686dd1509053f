// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Logging conventions.
//!
//! Everything goes through the `log` facade; the embedding application
//! picks the backend. Messages carry a component tag (`[SPDP]`, `[SEDP]`,
//! `[SEDP-TOPIC]`, `[SEDP-GROUP]`, `[CM]`, `[BUILTIN]`, `[LOCATOR]`,
//! `[REGISTRY]`, `[LEASE]`, `[CONFIG]`). Malformed peer data is logged at
//! `warn`, dropped samples at `debug`, benign duplicates at `trace`.

/// Handler entry trace.
///
/// Compiled in only with the `trace` feature.
///
/// # Example
/// ```ignore
/// fn handle_spdp(...) {
///     trace_fn!("handle_spdp");
///     // ...
/// }
/// ```
#[macro_export]
#[cfg(feature = "trace")]
macro_rules! trace_fn {
    ($fn_name:expr) => {
        log::trace!("-> {}", $fn_name);
    };
}

/// No-op trace macro (when trace feature disabled).
#[macro_export]
#[cfg(not(feature = "trace"))]
macro_rules! trace_fn {
    ($fn_name:expr) => {};
}
