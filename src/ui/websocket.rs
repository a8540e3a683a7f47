//! Connection endpoint
//!
//! `GET /websocket?server=<tenant>&id=<session>` upgrades to a WebSocket
//! whose binary messages carry relay frames in both directions.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
};
use bytes::Bytes;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::relay::{admit, rejection_frame, run_session, Rejection};
use crate::ui::server::AppState;

/// Query parameters of the connection endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectParams {
    /// Tenant name
    #[serde(default)]
    pub server: String,
    /// Client-chosen session id
    #[serde(default)]
    pub id: String,
}

pub async fn upgrade(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, params))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, params: ConnectParams) {
    let (sink, stream) = socket.split();
    serve_connection(sink, stream, &state, &params).await;
}

/// Admit or reject one connection, then relay until it ends.
///
/// A rejected client gets a MESSAGE frame followed by a close. An admitted
/// client's socket is closed once its session has been torn down and the
/// outbound queue is drained.
pub async fn serve_connection<Si, St, E>(mut sink: Si, stream: St, state: &AppState, params: &ConnectParams)
where
    Si: Sink<Message> + Unpin,
    Si::Error: std::fmt::Display,
    St: Stream<Item = Result<Message, E>> + Unpin,
    E: std::fmt::Display,
{
    let (outbound, queue) = mpsc::channel(state.relay.outbound_queue);

    let (tenant, session) = match admit(&state.tenants, &params.server, &params.id, outbound) {
        Ok(admitted) => admitted,
        Err(rejection) => {
            tracing::info!(tenant = %params.server, session = %params.id, "Connection rejected: {}", rejection);
            reject(&mut sink, &params.id, &rejection).await;
            return;
        }
    };

    tracing::info!(tenant = %tenant.name(), session = %session.id, "Session connected");

    // The registry holds the last sender; teardown lets the writer finish
    tokio::join!(
        run_session(tenant, session, stream, state.relay),
        write_loop(sink, queue),
    );
}

async fn reject<S>(sink: &mut S, id: &str, rejection: &Rejection)
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let notice = rejection_frame(id, rejection);
    if let Err(e) = sink.send(Message::Binary(notice.to_vec())).await {
        tracing::debug!(session = %id, "Failed to send rejection notice: {}", e);
    }
    if let Err(e) = sink.close().await {
        tracing::debug!(session = %id, "Failed to close rejected socket: {}", e);
    }
}

/// Drain a session's outbound queue into its socket
pub async fn write_loop<S>(mut sink: S, mut queue: mpsc::Receiver<Bytes>)
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    while let Some(frame) = queue.recv().await {
        if let Err(e) = sink.send(Message::Binary(frame.to_vec())).await {
            tracing::debug!("Socket write failed: {}", e);
            return;
        }
    }
    let _ = sink.close().await;
}
