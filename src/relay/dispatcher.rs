//! Gain broadcast, audio multicast and session teardown

use std::sync::Arc;

use axum::extract::ws::Message;
use futures_util::{Stream, StreamExt};
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tokio::time::MissedTickBehavior;

use super::RelaySettings;
use crate::audio::gain;
use crate::codec::{encode, encode_gain, validate_pcm, OpCode};
use crate::session::Session;
use crate::tenant::Tenant;

/// Send `id`'s gain, as heard by each peer, to every eligible peer.
///
/// Outside debug mode a session whose entity does not exist neither sends
/// nor receives gain updates. Returns the number of frames queued.
pub fn broadcast_gains(tenant: &Tenant, id: &str, debug: bool) -> usize {
    let snapshot = tenant.sessions().snapshot();
    let Some(me) = snapshot.iter().find(|s| s.id == id) else {
        return 0;
    };
    if !debug && !me.spatial.exists {
        return 0;
    }

    let falloff = tenant.falloff();
    let mut sent = 0;

    for peer in snapshot.iter().filter(|s| s.id != id) {
        if !debug && !peer.spatial.exists {
            continue;
        }

        let value = gain(
            &me.spatial.position,
            &me.spatial.dimension,
            &peer.spatial.position,
            &peer.spatial.dimension,
            &falloff,
        );

        match peer.send(encode_gain(&me.header, value as f32)) {
            Ok(()) => sent += 1,
            Err(e) => {
                tracing::warn!(tenant = %tenant.name(), session = %id, peer = %peer.id, error = %e, "Failed to send gain");
            }
        }
    }

    sent
}

/// Multicast one inbound audio payload from `me` to its peers.
///
/// Malformed payloads are dropped silently. Returns the number of peers
/// the frame was queued for.
pub fn relay_pcm(tenant: &Tenant, me: &Session, payload: &[u8], debug: bool) -> usize {
    if let Err(e) = validate_pcm(payload) {
        tracing::trace!(session = %me.id, "Dropping audio frame: {}", e);
        return 0;
    }

    if !debug {
        let exists = tenant
            .sessions()
            .spatial(&me.id)
            .is_some_and(|spatial| spatial.exists);
        if !exists {
            return 0;
        }
    }

    let frame = encode(OpCode::Pcm, &me.header, payload);
    tenant
        .sessions()
        .broadcast_filtered(&me.id, &frame, |peer| debug || peer.spatial.exists)
}

/// Remove `id` from its tenant and tell every remaining peer.
///
/// Returns false if the session was already gone, in which case nothing
/// is sent.
pub fn teardown(tenant: &Tenant, id: &str) -> bool {
    let Some(session) = tenant.sessions().unregister(id) else {
        return false;
    };

    let frame = encode(OpCode::Delete, &session.header, &[]);
    let notified = tenant.sessions().broadcast(id, &frame);

    tracing::info!(tenant = %tenant.name(), session = %id, notified, "Session disconnected");
    true
}

/// Tears a session down when dropped, whichever way its loops ended
pub struct SessionGuard {
    tenant: Arc<Tenant>,
    id: String,
    tasks: Vec<AbortHandle>,
}

impl SessionGuard {
    pub fn new(tenant: Arc<Tenant>, id: impl Into<String>) -> Self {
        Self {
            tenant,
            id: id.into(),
            tasks: Vec::new(),
        }
    }

    /// Abort `task` on teardown
    pub fn attach(&mut self, task: AbortHandle) {
        self.tasks.push(task);
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
        teardown(&self.tenant, &self.id);
    }
}

/// Broadcast gains on every tick until the session is gone
pub async fn gain_loop(tenant: Arc<Tenant>, id: String, settings: RelaySettings) {
    let mut ticker = tokio::time::interval(settings.update_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        if !tenant.sessions().contains(&id) {
            break;
        }
        broadcast_gains(&tenant, &id, settings.debug);
    }
}

/// Relay inbound audio until the connection ends or the tenant shuts down
pub async fn receive_loop<S, E>(
    mut stream: S,
    tenant: &Tenant,
    me: &Session,
    debug: bool,
    mut shutdown: watch::Receiver<bool>,
) where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: std::fmt::Display,
{
    if *shutdown.borrow() {
        return;
    }

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                tracing::debug!(tenant = %tenant.name(), session = %me.id, "Tenant shutting down");
                break;
            }
            message = stream.next() => match message {
                Some(Ok(Message::Binary(payload))) => {
                    relay_pcm(tenant, me, &payload, debug);
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(tenant = %tenant.name(), session = %me.id, "Receive failed: {}", e);
                    break;
                }
            }
        }
    }
}

/// Run both duties of an admitted session and tear it down afterwards
pub async fn run_session<S, E>(tenant: Arc<Tenant>, session: Session, stream: S, settings: RelaySettings)
where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: std::fmt::Display,
{
    let mut guard = SessionGuard::new(tenant.clone(), session.id.clone());

    let gains = tokio::spawn(gain_loop(tenant.clone(), session.id.clone(), settings));
    guard.attach(gains.abort_handle());

    receive_loop(stream, &tenant, &session, settings.debug, tenant.shutdown_signal()).await;

    drop(guard);
}
