// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! SPDP timing: periodic announcements and jittered replies.

use crate::core::discovery::{GuidPrefix, GUID};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Timed-event sink used by the SPDP handler.
pub trait EventScheduler: Send + Sync {
    /// Move the periodic SPDP event of `pp` to `at` if that is earlier.
    ///
    /// Returns `false` when `pp` has no periodic event or the current one
    /// is already due sooner.
    fn reschedule_spdp_if_earlier(&self, pp: GUID, at: u64) -> bool;

    /// One-shot SPDP of `pp` addressed to participant `dest`.
    fn schedule_spdp_reply(&self, at: u64, pp: GUID, dest: GuidPrefix);
}

/// Event handed back by [`EventQueue::pop_due`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledEvent {
    /// Periodic announcement; the runtime re-arms it after sending.
    Spdp { at: u64, pp: GUID },
    /// Directed reply to a newly discovered participant.
    SpdpReply { at: u64, pp: GUID, dest: GuidPrefix },
}

impl ScheduledEvent {
    pub fn at(&self) -> u64 {
        match *self {
            ScheduledEvent::Spdp { at, .. } | ScheduledEvent::SpdpReply { at, .. } => at,
        }
    }
}

#[derive(Default)]
struct QueueState {
    periodic: HashMap<GUID, u64>,
    replies: Vec<(u64, GUID, GuidPrefix)>,
}

/// In-memory [`EventScheduler`] drained by the runtime loop.
#[derive(Default)]
pub struct EventQueue {
    state: Mutex<QueueState>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) the periodic SPDP event of `pp`.
    pub fn set_periodic_spdp(&self, pp: GUID, at: u64) {
        self.state.lock().periodic.insert(pp, at);
    }

    pub fn next_spdp_time(&self, pp: &GUID) -> Option<u64> {
        self.state.lock().periodic.get(pp).copied()
    }

    pub fn pending_replies(&self) -> usize {
        self.state.lock().replies.len()
    }

    /// Remove and return every event due at or before `now`, earliest first.
    pub fn pop_due(&self, now: u64) -> Vec<ScheduledEvent> {
        let mut state = self.state.lock();
        let mut due = Vec::new();

        state.periodic.retain(|pp, at| {
            if *at <= now {
                due.push(ScheduledEvent::Spdp { at: *at, pp: *pp });
                false
            } else {
                true
            }
        });
        state.replies.retain(|&(at, pp, dest)| {
            if at <= now {
                due.push(ScheduledEvent::SpdpReply { at, pp, dest });
                false
            } else {
                true
            }
        });

        due.sort_by_key(ScheduledEvent::at);
        due
    }
}

impl EventScheduler for EventQueue {
    fn reschedule_spdp_if_earlier(&self, pp: GUID, at: u64) -> bool {
        let mut state = self.state.lock();
        match state.periodic.get_mut(&pp) {
            Some(current) if at < *current => {
                *current = at;
                true
            }
            _ => false,
        }
    }

    fn schedule_spdp_reply(&self, at: u64, pp: GUID, dest: GuidPrefix) {
        log::trace!("[SPDP] reply from {} to {:?} at {}", pp, dest, at);
        self.state.lock().replies.push((at, pp, dest));
    }
}
