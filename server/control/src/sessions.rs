use std::collections::HashMap;

use crate::{ids::MemberId, model::Session};

/// Open sessions keyed by member. At most one entry per member.
#[derive(Default, Debug)]
pub struct SessionStore {
    open: HashMap<MemberId, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an open session, returning the one it displaced, if any.
    pub fn open(&mut self, session: Session) -> Option<Session> {
        self.open.insert(session.member, session)
    }

    pub fn close(&mut self, member: MemberId) -> Option<Session> {
        self.open.remove(&member)
    }

    pub fn get(&self, member: MemberId) -> Option<&Session> {
        self.open.get(&member)
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }
}
