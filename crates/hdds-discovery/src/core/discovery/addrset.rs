// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared, mergeable set of unicast and multicast locators.
//!
//! Cloning an `AddressSet` shares the underlying set (reference counted);
//! use [`AddressSet::deep_copy`] for an independent copy.

use crate::config::AllowMulticast;
use crate::transport::Locator;
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

#[derive(Default)]
struct Inner {
    unicast: BTreeSet<LocatorKey>,
    multicast: BTreeSet<LocatorKey>,
}

/// Ordering wrapper so sets iterate deterministically.
#[derive(Clone, Copy, PartialEq, Eq)]
struct LocatorKey(Locator);

impl Ord for LocatorKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        let a = &self.0;
        let b = &other.0;
        (a.kind.to_wire(), a.address, a.port).cmp(&(b.kind.to_wire(), b.address, b.port))
    }
}

impl PartialOrd for LocatorKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Reference-counted locator set split into unicast and multicast parts.
#[derive(Clone, Default)]
pub struct AddressSet {
    inner: Arc<RwLock<Inner>>,
}

impl AddressSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a locator to the unicast or multicast part by its address.
    pub fn add(&self, loc: Locator) {
        let mut inner = self.inner.write();
        if loc.is_multicast() {
            inner.multicast.insert(LocatorKey(loc));
        } else {
            inner.unicast.insert(LocatorKey(loc));
        }
    }

    /// Add unless it is a multicast address the policy rejects.
    pub fn add_if_allowed(&self, loc: Locator, policy: AllowMulticast) -> bool {
        if loc.is_multicast() && !policy.allows(&loc) {
            log::trace!("[SPDP] {} rejected by multicast policy", loc);
            return false;
        }
        self.add(loc);
        true
    }

    pub fn is_empty(&self) -> bool {
        let inner = self.inner.read();
        inner.unicast.is_empty() && inner.multicast.is_empty()
    }

    pub fn is_empty_uc(&self) -> bool {
        self.inner.read().unicast.is_empty()
    }

    pub fn is_empty_mc(&self) -> bool {
        self.inner.read().multicast.is_empty()
    }

    pub fn unicast(&self) -> Vec<Locator> {
        self.inner.read().unicast.iter().map(|k| k.0).collect()
    }

    pub fn multicast(&self) -> Vec<Locator> {
        self.inner.read().multicast.iter().map(|k| k.0).collect()
    }

    /// All locators, unicast first.
    pub fn locators(&self) -> Vec<Locator> {
        let inner = self.inner.read();
        inner
            .unicast
            .iter()
            .chain(inner.multicast.iter())
            .map(|k| k.0)
            .collect()
    }

    pub fn contains(&self, loc: &Locator) -> bool {
        let inner = self.inner.read();
        let key = LocatorKey(*loc);
        inner.unicast.contains(&key) || inner.multicast.contains(&key)
    }

    /// Remove `loc` from whichever part holds it.
    pub fn remove(&self, loc: &Locator) -> bool {
        let key = LocatorKey(*loc);
        let mut inner = self.inner.write();
        let uc = inner.unicast.remove(&key);
        let mc = inner.multicast.remove(&key);
        uc || mc
    }

    /// Merge the unicast part of `other` into `self`.
    pub fn merge_uc_from(&self, other: &AddressSet) {
        if self.ptr_eq(other) {
            return;
        }
        let src = other.unicast();
        self.inner
            .write()
            .unicast
            .extend(src.into_iter().map(LocatorKey));
    }

    /// Merge the multicast part of `other` into `self`.
    pub fn merge_mc_from(&self, other: &AddressSet) {
        if self.ptr_eq(other) {
            return;
        }
        let src = other.multicast();
        self.inner
            .write()
            .multicast
            .extend(src.into_iter().map(LocatorKey));
    }

    pub fn merge_from(&self, other: &AddressSet) {
        self.merge_uc_from(other);
        self.merge_mc_from(other);
    }

    /// Replace contents with those of `other`.
    pub fn replace_with(&self, other: &AddressSet) {
        if self.ptr_eq(other) {
            return;
        }
        let (uc, mc) = {
            let src = other.inner.read();
            (src.unicast.clone(), src.multicast.clone())
        };
        let mut inner = self.inner.write();
        inner.unicast = uc;
        inner.multicast = mc;
    }

    /// Independent copy that does not share storage with `self`.
    pub fn deep_copy(&self) -> AddressSet {
        let copy = AddressSet::new();
        copy.merge_from(self);
        copy
    }

    pub fn ptr_eq(&self, other: &AddressSet) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of live handles to this set.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl fmt::Debug for AddressSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.locators()).finish()
    }
}

impl PartialEq for AddressSet {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.locators() == other.locators()
    }
}

impl FromIterator<Locator> for AddressSet {
    fn from_iter<I: IntoIterator<Item = Locator>>(iter: I) -> Self {
        let set = AddressSet::new();
        for loc in iter {
            set.add(loc);
        }
        set
    }
}
