// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reassembly of fragmented built-in samples.

use crate::core::discovery::{DiscoveryError, DiscoveryResult};

/// Contiguous chunk of a serialized sample starting at byte `min`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub min: u32,
    pub bytes: Vec<u8>,
}

impl Fragment {
    pub fn new(min: u32, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            min,
            bytes: bytes.into(),
        }
    }

    /// Whole, unfragmented payload.
    pub fn whole(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(0, bytes)
    }

    fn end(&self) -> u64 {
        u64::from(self.min) + self.bytes.len() as u64
    }
}

/// Reassemble `size` bytes out of possibly overlapping, unordered fragments.
///
/// Only the bytes past the current fill offset are copied from each
/// fragment, so overlaps resolve to the earliest-starting fragment.
///
/// # Errors
/// `InvalidData` on a gap, on a fragment extending past `size`, or when the
/// fragments do not cover `size` bytes.
pub fn defragment(size: u32, fragments: &[Fragment]) -> DiscoveryResult<Vec<u8>> {
    let mut ordered: Vec<&Fragment> = fragments.iter().collect();
    ordered.sort_by_key(|f| f.min);

    let size = u64::from(size);
    let mut out = Vec::with_capacity(size as usize);
    let mut off = 0u64;

    for frag in ordered {
        let min = u64::from(frag.min);
        if min > off {
            return Err(DiscoveryError::InvalidData {
                reason: format!("fragment gap at {} (filled up to {})", min, off),
            });
        }
        if frag.end() > size {
            return Err(DiscoveryError::InvalidData {
                reason: format!("fragment [{}, {}) past sample size {}", min, frag.end(), size),
            });
        }
        if frag.end() > off {
            let skip = (off - min) as usize;
            out.extend_from_slice(&frag.bytes[skip..]);
            off = frag.end();
        }
    }

    if off != size {
        return Err(DiscoveryError::InvalidData {
            reason: format!("sample incomplete: {} of {} bytes", off, size),
        });
    }
    Ok(out)
}
