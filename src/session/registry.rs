//! Per-tenant session registry
//!
//! A single lock guards the session map together with every session's
//! spatial fields. The lock is only ever held to mutate the map or to take
//! a snapshot; frames are queued after it is released so a slow peer can
//! never stall registration or the synchronizer.

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::Mutex;

use super::state::{Outbound, Session, SpatialState};
use crate::codec::encode_header;
use crate::error::SessionError;

/// Concurrent map of session id to session state
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session.
    ///
    /// Fails without touching the existing entry if `id` is already taken.
    pub fn register(&self, id: &str, outbound: Outbound) -> Result<Session, SessionError> {
        let header = encode_header(id).map_err(|_| SessionError::InvalidId(id.to_string()))?;

        let mut sessions = self.sessions.lock();
        if sessions.contains_key(id) {
            return Err(SessionError::Duplicate(id.to_string()));
        }

        let session = Session::new(id, header, outbound);
        sessions.insert(id.to_string(), session.clone());

        tracing::debug!(session = %id, total = sessions.len(), "Session registered");
        Ok(session)
    }

    /// Remove a session, returning it for notification purposes
    pub fn unregister(&self, id: &str) -> Option<Session> {
        let mut sessions = self.sessions.lock();
        let removed = sessions.remove(id);
        if removed.is_some() {
            tracing::debug!(session = %id, total = sessions.len(), "Session unregistered");
        }
        removed
    }

    /// Remove every session
    pub fn clear(&self) -> Vec<Session> {
        self.sessions.lock().drain().map(|(_, s)| s).collect()
    }

    pub fn get(&self, id: &str) -> Option<Session> {
        self.sessions.lock().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.lock().contains_key(id)
    }

    /// Current spatial fields of a session
    pub fn spatial(&self, id: &str) -> Option<SpatialState> {
        self.sessions.lock().get(id).map(|s| s.spatial.clone())
    }

    /// Overwrite a session's spatial fields in one step.
    ///
    /// Returns false if the session is gone.
    pub fn update_spatial(&self, id: &str, spatial: SpatialState) -> bool {
        match self.sessions.lock().get_mut(id) {
            Some(session) => {
                session.spatial = spatial;
                true
            }
            None => false,
        }
    }

    /// Ids of all registered sessions
    pub fn ids(&self) -> Vec<String> {
        self.sessions.lock().keys().cloned().collect()
    }

    /// Consistent copy of every session
    pub fn snapshot(&self) -> Vec<Session> {
        self.sessions.lock().values().cloned().collect()
    }

    /// Visit every session outside the lock
    pub fn for_each(&self, mut f: impl FnMut(&Session)) {
        for session in self.snapshot() {
            f(&session);
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    /// Queue `frame` on every session except `except_id`.
    ///
    /// Returns the number of peers the frame was queued for.
    pub fn broadcast(&self, except_id: &str, frame: &Bytes) -> usize {
        self.broadcast_filtered(except_id, frame, |_| true)
    }

    /// Like [`broadcast`](Self::broadcast), restricted to peers accepted by `filter`.
    ///
    /// A failed send to one peer is logged and skipped; the remaining
    /// peers still receive the frame.
    pub fn broadcast_filtered(
        &self,
        except_id: &str,
        frame: &Bytes,
        filter: impl Fn(&Session) -> bool,
    ) -> usize {
        let peers: Vec<Session> = {
            let sessions = self.sessions.lock();
            sessions
                .values()
                .filter(|s| s.id != except_id && filter(s))
                .cloned()
                .collect()
        };

        peers
            .iter()
            .filter(|peer| match peer.send(frame.clone()) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(from = %except_id, to = %peer.id, error = %e, "Failed to relay frame");
                    false
                }
            })
            .count()
    }
}
