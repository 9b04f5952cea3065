use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ChannelId, MemberId};

/// Member identity plus the name shown in rendered lines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRef {
    pub id: MemberId,
    pub display_name: String,
}

/// Voice channel identity plus its name at the time of observation.
/// Classification compares `id` only; a renamed channel is still the same channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRef {
    pub id: ChannelId,
    pub name: String,
}

/// Inbound presence-change notification: a member's channel before and after a change.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PresenceUpdate {
    pub member: MemberRef,
    pub before: Option<ChannelRef>,
    pub after: Option<ChannelRef>,
}

/// One open occupancy of a voice channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub member: MemberId,
    pub channel: ChannelRef,
    pub joined_at: DateTime<Utc>,
}

impl MemberRef {
    pub fn new(id: u64, display_name: impl Into<String>) -> Self {
        Self { id: MemberId(id), display_name: display_name.into() }
    }
}

impl ChannelRef {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self { id: ChannelId(id), name: name.into() }
    }
}

impl PresenceUpdate {
    pub fn new(member: MemberRef, before: Option<ChannelRef>, after: Option<ChannelRef>) -> Self {
        Self { member, before, after }
    }

    /// True when the notification carries no occupancy change (stale resume pairs, mute toggles).
    pub fn is_noop(&self) -> bool {
        self.before.as_ref().map(|c| c.id) == self.after.as_ref().map(|c| c.id)
    }
}
