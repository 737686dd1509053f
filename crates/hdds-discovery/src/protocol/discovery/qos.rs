// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! QoS bundle carried in discovery data.
//!
//! Every policy is optional: an absent policy means "not announced" and is
//! filled from the built-in default for the entity kind with
//! [`Qos::merge_missing`]. Outbound announcements carry only the policies
//! that differ from that default ([`Qos::delta`]).

use std::fmt;
use std::time::Duration;

/// Infinite duration (RTPS Duration_t {0x7fffffff, 0xffffffff}).
pub const DURATION_INFINITE: Duration = Duration::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReliabilityKind {
    BestEffort,
    Reliable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reliability {
    pub kind: ReliabilityKind,
    pub max_blocking_time: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurabilityKind {
    Volatile,
    TransientLocal,
    Transient,
    Persistent,
}

impl DurabilityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Volatile => "volatile",
            Self::TransientLocal => "transient-local",
            Self::Transient => "transient",
            Self::Persistent => "persistent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryKind {
    KeepLast,
    KeepAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct History {
    pub kind: HistoryKind,
    pub depth: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivelinessKind {
    Automatic,
    ManualByParticipant,
    ManualByTopic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Liveliness {
    pub kind: LivelinessKind,
    pub lease_duration: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipKind {
    Shared,
    Exclusive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationOrderKind {
    ByReceptionTimestamp,
    BySourceTimestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationAccessScope {
    Instance,
    Topic,
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presentation {
    pub access_scope: PresentationAccessScope,
    pub coherent_access: bool,
    pub ordered_access: bool,
}

/// Announced QoS; `None` means the policy was not present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Qos {
    pub topic_name: Option<String>,
    pub type_name: Option<String>,
    pub reliability: Option<Reliability>,
    pub durability: Option<DurabilityKind>,
    pub deadline: Option<Duration>,
    pub latency_budget: Option<Duration>,
    pub liveliness: Option<Liveliness>,
    pub ownership: Option<OwnershipKind>,
    pub ownership_strength: Option<i32>,
    pub destination_order: Option<DestinationOrderKind>,
    pub history: Option<History>,
    pub presentation: Option<Presentation>,
    pub partition: Option<Vec<String>>,
    pub user_data: Option<Vec<u8>>,
    pub topic_data: Option<Vec<u8>>,
    pub group_data: Option<Vec<u8>>,
    /// Writer data lifecycle: auto-dispose unregistered instances.
    pub autodispose_unregistered: Option<bool>,
}

const DEFAULT_MAX_BLOCKING_TIME: Duration = Duration::from_millis(100);

impl Qos {
    fn endpoint_common() -> Self {
        Self {
            durability: Some(DurabilityKind::Volatile),
            deadline: Some(DURATION_INFINITE),
            latency_budget: Some(Duration::ZERO),
            liveliness: Some(Liveliness {
                kind: LivelinessKind::Automatic,
                lease_duration: DURATION_INFINITE,
            }),
            ownership: Some(OwnershipKind::Shared),
            destination_order: Some(DestinationOrderKind::ByReceptionTimestamp),
            history: Some(History {
                kind: HistoryKind::KeepLast,
                depth: 1,
            }),
            presentation: Some(Presentation {
                access_scope: PresentationAccessScope::Instance,
                coherent_access: false,
                ordered_access: false,
            }),
            partition: Some(Vec::new()),
            user_data: Some(Vec::new()),
            topic_data: Some(Vec::new()),
            group_data: Some(Vec::new()),
            ..Self::default()
        }
    }

    /// Built-in reader default.
    pub fn reader_default() -> Self {
        Self {
            reliability: Some(Reliability {
                kind: ReliabilityKind::BestEffort,
                max_blocking_time: DEFAULT_MAX_BLOCKING_TIME,
            }),
            ..Self::endpoint_common()
        }
    }

    /// Built-in writer default.
    pub fn writer_default() -> Self {
        Self {
            reliability: Some(Reliability {
                kind: ReliabilityKind::Reliable,
                max_blocking_time: DEFAULT_MAX_BLOCKING_TIME,
            }),
            ownership_strength: Some(0),
            autodispose_unregistered: Some(true),
            ..Self::endpoint_common()
        }
    }

    /// Writer default for peers that don't auto-dispose unregistered
    /// instances (non-PrismTech writers).
    pub fn writer_default_nad() -> Self {
        Self {
            autodispose_unregistered: Some(false),
            ..Self::writer_default()
        }
    }

    pub fn topic_default() -> Self {
        Self {
            reliability: Some(Reliability {
                kind: ReliabilityKind::BestEffort,
                max_blocking_time: DEFAULT_MAX_BLOCKING_TIME,
            }),
            ..Self::endpoint_common()
        }
    }

    /// Publisher/subscriber (group) default.
    pub fn group_default() -> Self {
        Self {
            presentation: Some(Presentation {
                access_scope: PresentationAccessScope::Instance,
                coherent_access: false,
                ordered_access: false,
            }),
            partition: Some(Vec::new()),
            group_data: Some(Vec::new()),
            ..Self::default()
        }
    }

    pub fn participant_default() -> Self {
        Self {
            user_data: Some(Vec::new()),
            ..Self::default()
        }
    }

    /// Fill every absent policy from `defaults`.
    pub fn merge_missing(&mut self, defaults: &Qos) {
        macro_rules! fill {
            ($($field:ident),*) => {
                $(
                    if self.$field.is_none() {
                        self.$field = defaults.$field.clone();
                    }
                )*
            };
        }
        fill!(
            topic_name,
            type_name,
            reliability,
            durability,
            deadline,
            latency_budget,
            liveliness,
            ownership,
            ownership_strength,
            destination_order,
            history,
            presentation,
            partition,
            user_data,
            topic_data,
            group_data,
            autodispose_unregistered
        );
    }

    /// Policies of `self` that are absent from or differ from `base`.
    pub fn delta(&self, base: &Qos) -> Qos {
        let mut out = Qos::default();
        macro_rules! diff {
            ($($field:ident),*) => {
                $(
                    if self.$field.is_some() && self.$field != base.$field {
                        out.$field = self.$field.clone();
                    }
                )*
            };
        }
        diff!(
            topic_name,
            type_name,
            reliability,
            durability,
            deadline,
            latency_budget,
            liveliness,
            ownership,
            ownership_strength,
            destination_order,
            history,
            presentation,
            partition,
            user_data,
            topic_data,
            group_data,
            autodispose_unregistered
        );
        out
    }

    pub fn is_empty(&self) -> bool {
        *self == Qos::default()
    }

    pub fn is_reliable(&self) -> bool {
        matches!(
            self.reliability,
            Some(Reliability {
                kind: ReliabilityKind::Reliable,
                ..
            })
        )
    }

    /// One-line summary for discovery traces.
    pub fn describe(&self) -> QosSummary<'_> {
        QosSummary(self)
    }
}

/// Display adapter: `reliable transient-local "p1,p2".topic/type`.
pub struct QosSummary<'a>(&'a Qos);

impl fmt::Display for QosSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let qos = self.0;
        let reliability = if qos.is_reliable() {
            "reliable"
        } else {
            "best-effort"
        };
        let durability = qos.durability.map_or("?", DurabilityKind::as_str);
        let partitions = qos
            .partition
            .as_deref()
            .map(|p| p.join(","))
            .unwrap_or_default();
        write!(
            f,
            "{} {} \"{}\".{}/{}",
            reliability,
            durability,
            partitions,
            qos.topic_name.as_deref().unwrap_or("?"),
            qos.type_name.as_deref().unwrap_or("?")
        )
    }
}
