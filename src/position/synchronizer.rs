//! Position synchronizer
//!
//! One pass per tenant per tick:
//!
//! ```text
//!            login ok                       query failed
//! ┌──────────────┐ ───────────▶ ┌───────────┐ ───────────▶ (close, Disconnected)
//! │ Disconnected │              │ Connected │
//! └──────────────┘ ◀─────────── └───────────┘
//!   ▲    │ login failed:               │ every tick: poll every session
//!   └────┘ failures += 1               ▼
//!          wait backoff(failures)   existence, Pos[0..3], Dimension
//! ```
//!
//! Failures never leave the tenant; sessions keep their last-known values
//! until the console comes back.

use std::sync::Arc;

use crate::audio::Axis;
use crate::error::ConsoleError;
use crate::network::{Console, ConsoleConnector};
use crate::position::backoff::{Backoff, FailureCounter};
use crate::position::query;
use crate::session::SessionRegistry;
use crate::tenant::Tenant;

/// Console connection state of one tenant
#[derive(Default)]
pub struct SyncState {
    /// Live console connection, `None` while disconnected
    pub console: Option<Box<dyn Console>>,
    /// Consecutive failed logins
    pub failures: FailureCounter,
}

impl SyncState {
    pub fn is_connected(&self) -> bool {
        self.console.is_some()
    }

    /// Drop the console connection, closing it first
    pub async fn disconnect(&mut self) {
        if let Some(mut console) = self.console.take() {
            console.close().await;
        }
    }
}

/// Drives console logins and position polling
pub struct Synchronizer {
    connector: Arc<dyn ConsoleConnector>,
    backoff: Backoff,
}

impl Synchronizer {
    pub fn new(connector: Arc<dyn ConsoleConnector>, backoff: Backoff) -> Self {
        Self { connector, backoff }
    }

    pub fn backoff(&self) -> Backoff {
        self.backoff
    }

    /// Run one synchronization pass for `tenant`
    pub async fn run_once(&self, tenant: &Tenant) {
        let mut state = tenant.sync_state().lock().await;

        if !state.is_connected() && !self.connect(tenant, &mut state).await {
            return;
        }

        let Some(console) = state.console.as_mut() else {
            return;
        };

        match poll_sessions(console.as_mut(), tenant.sessions()).await {
            Ok(polled) => {
                tracing::trace!(tenant = %tenant.name(), sessions = polled, "Positions updated");
            }
            Err(e) => {
                tracing::warn!(tenant = %tenant.name(), error = %e, "Console query failed, disconnecting");
                state.disconnect().await;
            }
        }
    }

    /// Wait out the backoff and try to log in. Returns true once connected.
    async fn connect(&self, tenant: &Tenant, state: &mut SyncState) -> bool {
        let retry = state.failures.get();
        let delay = self.backoff.delay(retry);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        tracing::info!(tenant = %tenant.name(), retry, "Connecting to console");

        let config = tenant.config();
        match self.connector.login(&config.address, &config.password).await {
            Ok(console) => {
                tracing::info!(tenant = %tenant.name(), "Console connected");
                state.console = Some(console);
                state.failures.reset();
                true
            }
            Err(e) => {
                state.failures.record_failure();
                tracing::warn!(
                    tenant = %tenant.name(),
                    retry = state.failures.get(),
                    error = %e,
                    "Console login failed"
                );
                false
            }
        }
    }
}

/// Refresh existence, position and dimension of every registered session.
///
/// Returns the number of sessions updated. The first failed query aborts
/// the pass.
pub async fn poll_sessions(
    console: &mut dyn Console,
    sessions: &SessionRegistry,
) -> Result<usize, ConsoleError> {
    let mut updated = 0;

    for id in sessions.ids() {
        let exists = query::parse_exists(&console.command(&query::exists_command(&id)).await?);

        // Start from the last-known values so a parse miss keeps them
        let Some(mut spatial) = sessions.spatial(&id) else {
            continue;
        };

        for axis in Axis::ALL {
            let response = console.command(&query::position_command(&id, axis)).await?;
            match query::parse_coordinate(&response) {
                Some(value) => spatial.position.set_axis(axis, value),
                None => tracing::trace!(session = %id, axis = ?axis, "Coordinate not found in response"),
            }
        }

        let response = console.command(&query::dimension_command(&id)).await?;
        if let Some(dimension) = query::parse_dimension(&response) {
            spatial.dimension = dimension;
        }

        spatial.exists = exists;

        if sessions.update_spatial(&id, spatial) {
            updated += 1;
        }
    }

    Ok(updated)
}
