//! Owner of every live session, keyed by session id

use crate::session::{Participant, Session};
use log::debug;
use rand::distributions::Alphanumeric;
use rand::Rng;
use shared::{ConnectionId, SessionId};
use std::collections::HashMap;
use std::time::{Duration, Instant};

const ID_SUFFIX_LEN: usize = 5;

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<SessionId, Session>,
    next_serial: u64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a `Playing` session for the pair and returns its id.
    ///
    /// Ids are `room-<serial>-<suffix>`. The serial only grows, so an id is
    /// never reused while the process lives.
    pub fn create(&mut self, word: &str, first: Participant, second: Participant) -> SessionId {
        let id = self.next_id();
        debug!(
            "Creating session {} for {} and {}",
            id, first.connection, second.connection
        );
        self.sessions
            .insert(id.clone(), Session::new(id.clone(), word, first, second));
        id
    }

    pub fn get(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: &SessionId) -> Option<&mut Session> {
        self.sessions.get_mut(id)
    }

    pub fn remove(&mut self, id: &SessionId) -> Option<Session> {
        self.sessions.remove(id)
    }

    /// The `Playing` session this connection takes part in, if any.
    pub fn active_session_of(&self, connection: ConnectionId) -> Option<&Session> {
        self.sessions
            .values()
            .find(|session| session.is_playing() && session.has_participant(connection))
    }

    /// Removes sessions nobody can observe any more: both participants have
    /// departed, or the session has been finished for at least `finished_ttl`.
    pub fn reap(&mut self, now: Instant, finished_ttl: Duration) -> Vec<Session> {
        let expired: Vec<SessionId> = self
            .sessions
            .iter()
            .filter(|(_, session)| session.is_abandoned() || session.is_expired(now, finished_ttl))
            .map(|(id, _)| id.clone())
            .collect();

        expired
            .iter()
            .filter_map(|id| self.sessions.remove(id))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn next_id(&mut self) -> SessionId {
        self.next_serial += 1;
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(ID_SUFFIX_LEN)
            .map(char::from)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        SessionId::new(format!("room-{}-{}", self.next_serial, suffix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(registry: &mut SessionRegistry, a: ConnectionId, b: ConnectionId) -> SessionId {
        registry.create(
            "crate",
            Participant::new(a, format!("P{}", a)),
            Participant::new(b, format!("P{}", b)),
        )
    }

    #[test]
    fn test_ids_are_unique() {
        let mut registry = SessionRegistry::new();
        let ids: Vec<SessionId> = (0..100).map(|i| pair(&mut registry, i * 2, i * 2 + 1)).collect();

        let mut unique = ids.clone();
        unique.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        unique.dedup();
        assert_eq!(unique.len(), ids.len());
        assert_eq!(registry.len(), 100);
        assert!(ids[0].as_str().starts_with("room-1-"));
    }

    #[test]
    fn test_active_session_lookup() {
        let mut registry = SessionRegistry::new();
        let id = pair(&mut registry, 1, 2);

        assert_eq!(registry.active_session_of(2).map(|s| s.id()), Some(&id));
        assert!(registry.active_session_of(3).is_none());

        registry
            .get_mut(&id)
            .unwrap()
            .record_win(1, 2, |_| true)
            .unwrap();
        assert!(registry.active_session_of(1).is_none());
    }

    #[test]
    fn test_reap_abandoned_sessions() {
        let mut registry = SessionRegistry::new();
        let abandoned = pair(&mut registry, 1, 2);
        let half = pair(&mut registry, 3, 4);

        {
            let session = registry.get_mut(&abandoned).unwrap();
            session.record_disconnect(1, |_| true).unwrap();
            session.record_disconnect(2, |_| true).unwrap();
        }
        registry
            .get_mut(&half)
            .unwrap()
            .record_disconnect(3, |_| true)
            .unwrap();

        let reaped = registry.reap(Instant::now(), Duration::from_secs(3600));
        assert_eq!(reaped.len(), 1);
        assert_eq!(reaped[0].id(), &abandoned);
        assert!(registry.get(&half).is_some());
    }

    #[test]
    fn test_reap_expired_finished_sessions() {
        let mut registry = SessionRegistry::new();
        let finished = pair(&mut registry, 1, 2);
        let playing = pair(&mut registry, 3, 4);
        registry
            .get_mut(&finished)
            .unwrap()
            .record_win(1, 3, |_| true)
            .unwrap();

        let ttl = Duration::from_secs(60);
        assert!(registry.reap(Instant::now(), ttl).is_empty());

        let reaped = registry.reap(Instant::now() + ttl, ttl);
        assert_eq!(reaped.len(), 1);
        assert!(registry.get(&finished).is_none());
        assert!(registry.get(&playing).is_some());
    }
}
