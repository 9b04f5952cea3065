use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{ChannelRef, MemberRef};

/// Sessions shorter than this are flagged as short stays.
pub const SHORT_STAY_SECS: u64 = 120;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEventKind {
    Join,
    Leave,
    Switch,
}

impl SessionEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionEventKind::Join => "join",
            SessionEventKind::Leave => "leave",
            SessionEventKind::Switch => "switch",
        }
    }
}

/// Severity bucket for a completed session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stay {
    Short,
    Normal,
}

impl Stay {
    pub fn classify(duration_secs: u64) -> Self {
        if duration_secs < SHORT_STAY_SECS {
            Stay::Short
        } else {
            Stay::Normal
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stay::Short => "short",
            Stay::Normal => "normal",
        }
    }
}

/// A classified transition. Produced once by the tracker, consumed once by the reporter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEvent {
    pub kind: SessionEventKind,
    pub member: MemberRef,
    pub from: Option<ChannelRef>,
    pub to: Option<ChannelRef>,
    pub joined_at: Option<DateTime<Utc>>,
    pub left_at: Option<DateTime<Utc>>,
    /// Whole seconds; present for Leave and for Switch when the prior session was known.
    pub duration_secs: Option<u64>,
    /// Instant the triggering notification was classified.
    pub at: DateTime<Utc>,
}

impl SessionEvent {
    pub fn stay(&self) -> Option<Stay> {
        self.duration_secs.map(Stay::classify)
    }

    pub fn is_short_stay(&self) -> bool {
        self.stay() == Some(Stay::Short)
    }
}
