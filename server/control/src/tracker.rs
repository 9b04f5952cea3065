//! Voice session state machine.
//!
//! Every presence notification is classified, in order, as one of:
//! - join:   no channel before, some channel after
//! - leave:  some channel before, none after
//! - switch: channels on both sides that differ
//! - no-op:  same channel on both sides (or none on both)
//!
//! The tracker owns its [`SessionStore`] and performs no I/O besides diagnostics.
//! Callers must serialize `observe` calls; the gateway does this with a single task.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::{
    events::{SessionEvent, SessionEventKind},
    model::{ChannelRef, MemberRef, PresenceUpdate, Session},
    sessions::SessionStore,
};

#[derive(Default, Debug)]
pub struct SessionTracker {
    store: SessionStore,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: SessionStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Classify one notification observed at `now` and update the open sessions.
    pub fn observe(&mut self, update: &PresenceUpdate, now: DateTime<Utc>) -> Option<SessionEvent> {
        let member = &update.member;
        match (&update.before, &update.after) {
            (None, Some(to)) => Some(self.join(member, to, now)),
            (Some(from), None) => self.leave(member, from, now),
            (Some(from), Some(to)) if from.id != to.id => Some(self.switch(member, from, to, now)),
            _ => {
                debug!(member_id = %member.id, "presence update without channel change");
                None
            }
        }
    }

    fn join(&mut self, member: &MemberRef, to: &ChannelRef, now: DateTime<Utc>) -> SessionEvent {
        if let Some(stale) = self.open(member, to, now) {
            warn!(
                member_id = %member.id,
                member = %member.display_name,
                stale_channel = %stale.channel.name,
                "join replaced an open session whose leave was never observed"
            );
        }

        SessionEvent {
            kind: SessionEventKind::Join,
            member: member.clone(),
            from: None,
            to: Some(to.clone()),
            joined_at: Some(now),
            left_at: None,
            duration_secs: None,
            at: now,
        }
    }

    fn leave(&mut self, member: &MemberRef, from: &ChannelRef, now: DateTime<Utc>) -> Option<SessionEvent> {
        let Some(session) = self.store.close(member.id) else {
            warn!(
                member_id = %member.id,
                member = %member.display_name,
                channel = %from.name,
                "leave without a tracked session; no duration reported"
            );
            return None;
        };

        Some(SessionEvent {
            kind: SessionEventKind::Leave,
            member: member.clone(),
            from: Some(from.clone()),
            to: None,
            joined_at: Some(session.joined_at),
            left_at: Some(now),
            duration_secs: Some(elapsed_secs(session.joined_at, now)),
            at: now,
        })
    }

    fn switch(
        &mut self,
        member: &MemberRef,
        from: &ChannelRef,
        to: &ChannelRef,
        now: DateTime<Utc>,
    ) -> SessionEvent {
        let previous = self.store.close(member.id);
        if previous.is_none() {
            debug!(
                member_id = %member.id,
                from = %from.name,
                to = %to.name,
                "switch without a tracked session; duration unknown"
            );
        }

        // A switch always opens a fresh session in the destination channel.
        self.open(member, to, now);

        SessionEvent {
            kind: SessionEventKind::Switch,
            member: member.clone(),
            from: Some(from.clone()),
            to: Some(to.clone()),
            joined_at: previous.as_ref().map(|s| s.joined_at),
            left_at: Some(now),
            duration_secs: previous.map(|s| elapsed_secs(s.joined_at, now)),
            at: now,
        }
    }

    fn open(&mut self, member: &MemberRef, channel: &ChannelRef, now: DateTime<Utc>) -> Option<Session> {
        self.store.open(Session {
            member: member.id,
            channel: channel.clone(),
            joined_at: now,
        })
    }
}

fn elapsed_secs(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    (to - from).num_seconds().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::MemberId;
    use chrono::{Duration, TimeZone};

    fn t(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, h, m, s).unwrap()
    }

    fn u1() -> MemberRef {
        MemberRef::new(1, "U1")
    }

    fn general() -> ChannelRef {
        ChannelRef::new(100, "General")
    }

    fn lounge() -> ChannelRef {
        ChannelRef::new(200, "Lounge")
    }

    fn update(before: Option<ChannelRef>, after: Option<ChannelRef>) -> PresenceUpdate {
        PresenceUpdate::new(u1(), before, after)
    }

    #[test]
    fn join_opens_session_without_duration() {
        let mut tracker = SessionTracker::new();
        let ev = tracker.observe(&update(None, Some(general())), t(10, 0, 0)).unwrap();

        assert_eq!(ev.kind, SessionEventKind::Join);
        assert_eq!(ev.to, Some(general()));
        assert_eq!(ev.duration_secs, None);
        let open = tracker.store().get(MemberId(1)).unwrap();
        assert_eq!(open.channel, general());
        assert_eq!(open.joined_at, t(10, 0, 0));
    }

    #[test]
    fn leave_reports_exact_duration_and_closes_session() {
        let mut tracker = SessionTracker::new();
        tracker.observe(&update(None, Some(general())), t(10, 0, 0));
        let ev = tracker.observe(&update(Some(general()), None), t(10, 1, 30)).unwrap();

        assert_eq!(ev.kind, SessionEventKind::Leave);
        assert_eq!(ev.from, Some(general()));
        assert_eq!(ev.duration_secs, Some(90));
        assert_eq!(ev.joined_at, Some(t(10, 0, 0)));
        assert_eq!(ev.left_at, Some(t(10, 1, 30)));
        assert!(ev.is_short_stay());
        assert!(tracker.store().is_empty());
    }

    #[test]
    fn leave_without_session_emits_nothing() {
        let mut tracker = SessionTracker::new();
        assert!(tracker.observe(&update(Some(general()), None), t(10, 0, 0)).is_none());
        assert!(tracker.store().is_empty());
    }

    #[test]
    fn switch_then_leave_measures_from_switch() {
        let mut tracker = SessionTracker::new();
        tracker.observe(&update(None, Some(general())), t(10, 0, 0));

        let sw = tracker
            .observe(&update(Some(general()), Some(lounge())), t(10, 5, 0))
            .unwrap();
        assert_eq!(sw.kind, SessionEventKind::Switch);
        assert_eq!(sw.duration_secs, Some(300));
        assert_eq!(sw.to, Some(lounge()));

        let leave = tracker.observe(&update(Some(lounge()), None), t(10, 6, 0)).unwrap();
        assert_eq!(leave.kind, SessionEventKind::Leave);
        assert_eq!(leave.from, Some(lounge()));
        assert_eq!(leave.duration_secs, Some(60));
        assert_eq!(leave.joined_at, Some(t(10, 5, 0)));
    }

    #[test]
    fn switch_without_session_still_reopens() {
        let mut tracker = SessionTracker::new();
        let sw = tracker
            .observe(&update(Some(general()), Some(lounge())), t(10, 0, 0))
            .unwrap();

        assert_eq!(sw.kind, SessionEventKind::Switch);
        assert_eq!(sw.duration_secs, None);
        assert_eq!(sw.joined_at, None);
        assert_eq!(tracker.store().get(MemberId(1)).unwrap().channel, lounge());
    }

    #[test]
    fn injected_store_sessions_are_closed_with_their_join_time() {
        let mut store = SessionStore::new();
        store.open(Session { member: MemberId(1), channel: general(), joined_at: t(9, 0, 0) });
        let mut tracker = SessionTracker::with_store(store);

        let ev = tracker.observe(&update(Some(general()), None), t(9, 30, 0)).unwrap();
        assert_eq!(ev.kind, SessionEventKind::Leave);
        assert_eq!(ev.duration_secs, Some(1_800));
        assert!(tracker.store().is_empty());
    }

    #[test]
    fn same_channel_is_noop() {
        let mut tracker = SessionTracker::new();
        tracker.observe(&update(None, Some(general())), t(10, 0, 0));

        assert!(tracker.observe(&update(Some(general()), Some(general())), t(10, 1, 0)).is_none());
        assert!(tracker.observe(&update(None, None), t(10, 2, 0)).is_none());

        let open = tracker.store().get(MemberId(1)).unwrap();
        assert_eq!(open.joined_at, t(10, 0, 0));
        assert_eq!(tracker.store().len(), 1);
    }

    #[test]
    fn noop_on_untracked_member_does_not_create_session() {
        let mut tracker = SessionTracker::new();
        assert!(tracker.observe(&update(Some(general()), Some(general())), t(10, 0, 0)).is_none());
        assert!(tracker.store().is_empty());
    }

    #[test]
    fn renamed_channel_is_not_a_switch() {
        let mut tracker = SessionTracker::new();
        tracker.observe(&update(None, Some(general())), t(10, 0, 0));
        let renamed = ChannelRef::new(100, "General (renamed)");
        assert!(tracker.observe(&update(Some(general()), Some(renamed)), t(10, 1, 0)).is_none());
    }

    #[test]
    fn repeated_join_replaces_stale_session() {
        let mut tracker = SessionTracker::new();
        tracker.observe(&update(None, Some(general())), t(10, 0, 0));
        tracker.observe(&update(None, Some(lounge())), t(11, 0, 0));

        assert_eq!(tracker.store().len(), 1);
        let open = tracker.store().get(MemberId(1)).unwrap();
        assert_eq!(open.channel, lounge());
        assert_eq!(open.joined_at, t(11, 0, 0));
    }

    #[test]
    fn clock_going_backwards_clamps_to_zero() {
        let mut tracker = SessionTracker::new();
        tracker.observe(&update(None, Some(general())), t(10, 0, 10));
        let ev = tracker.observe(&update(Some(general()), None), t(10, 0, 0)).unwrap();
        assert_eq!(ev.duration_secs, Some(0));
    }

    #[test]
    fn members_are_tracked_independently() {
        let mut tracker = SessionTracker::new();
        let u2 = MemberRef::new(2, "U2");
        tracker.observe(&update(None, Some(general())), t(10, 0, 0));
        tracker.observe(&PresenceUpdate::new(u2.clone(), None, Some(lounge())), t(10, 0, 30));

        let ev = tracker
            .observe(&PresenceUpdate::new(u2, Some(lounge()), None), t(10, 10, 30))
            .unwrap();
        assert_eq!(ev.duration_secs, Some(600));
        assert_eq!(tracker.store().len(), 1);
        assert!(tracker.store().get(MemberId(1)).is_some());
    }

    #[test]
    fn store_matches_latest_after_channel_over_random_sequence() {
        let channels = [None, Some(general()), Some(lounge()), Some(ChannelRef::new(300, "Stage"))];
        let mut tracker = SessionTracker::new();
        let mut now = t(9, 0, 0);
        let mut expected: [Option<u64>; 3] = [None; 3];
        let mut seed = 0x2545_f491_u64;

        for _ in 0..500 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            let member = (seed % 3) as usize;
            let before = channels[((seed >> 8) % 4) as usize].clone();
            let after = channels[((seed >> 16) % 4) as usize].clone();
            now += Duration::seconds(((seed >> 24) % 200) as i64);

            let up = PresenceUpdate::new(MemberRef::new(member as u64, "m"), before.clone(), after.clone());
            let changed = !up.is_noop();
            let ev = tracker.observe(&up, now);

            if !changed {
                assert!(ev.is_none());
            } else if let Some(after) = &after {
                expected[member] = Some(after.id.0);
            } else {
                expected[member] = None;
            }

            for (m, want) in expected.iter().enumerate() {
                let got = tracker.store().get(MemberId(m as u64)).map(|s| s.channel.id.0);
                assert_eq!(got, *want);
            }
        }
    }
}
