//! Tenant state

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::audio::Falloff;
use crate::constants::{DEFAULT_FADEOUT, DEFAULT_MUTE};
use crate::error::TenantError;
use crate::position::{SyncState, Synchronizer};
use crate::session::SessionRegistry;

/// Configuration of one game server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantConfig {
    /// Console (RCON) address, `host:port`
    #[serde(default)]
    pub address: String,

    /// Console password, also the shared secret for management calls
    #[serde(default, rename = "pass", alias = "password")]
    pub password: String,

    /// Distance within which gain is 1
    #[serde(default = "default_fadeout")]
    pub fadeout: f64,

    /// Distance at or beyond which gain is 0
    #[serde(default = "default_mute")]
    pub mute: f64,
}

fn default_fadeout() -> f64 {
    DEFAULT_FADEOUT
}

fn default_mute() -> f64 {
    DEFAULT_MUTE
}

impl TenantConfig {
    pub fn new(address: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            password: password.into(),
            fadeout: DEFAULT_FADEOUT,
            mute: DEFAULT_MUTE,
        }
    }

    pub fn with_thresholds(mut self, fadeout: f64, mute: f64) -> Self {
        self.fadeout = fadeout;
        self.mute = mute;
        self
    }

    pub fn falloff(&self) -> Falloff {
        Falloff::new(self.fadeout, self.mute)
    }

    /// Copy with address and password masked, lengths preserved
    pub fn redacted(&self) -> Self {
        Self {
            address: "*".repeat(self.address.chars().count()),
            password: "*".repeat(self.password.chars().count()),
            fadeout: self.fadeout,
            mute: self.mute,
        }
    }

    /// Thresholds must be finite and non-negative
    pub fn validate(&self) -> Result<(), TenantError> {
        for (name, value) in [("fadeout", self.fadeout), ("mute", self.mute)] {
            if !value.is_finite() || value < 0.0 {
                return Err(TenantError::InvalidConfig(format!(
                    "{} must be a finite non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// One game server and everything attached to it
pub struct Tenant {
    name: String,
    config: TenantConfig,
    sessions: SessionRegistry,
    sync: tokio::sync::Mutex<SyncState>,
    sync_task: Mutex<Option<JoinHandle<()>>>,
    shutdown: watch::Sender<bool>,
}

impl std::fmt::Debug for Tenant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tenant")
            .field("name", &self.name)
            .field("config", &self.config.redacted())
            .field("sessions", &self.sessions.len())
            .finish()
    }
}

impl Tenant {
    pub fn new(name: impl Into<String>, config: TenantConfig) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            name: name.into(),
            config,
            sessions: SessionRegistry::new(),
            sync: tokio::sync::Mutex::new(SyncState::default()),
            sync_task: Mutex::new(None),
            shutdown,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &TenantConfig {
        &self.config
    }

    pub fn falloff(&self) -> Falloff {
        self.config.falloff()
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Console connection state, locked for the duration of a sync pass
    pub fn sync_state(&self) -> &tokio::sync::Mutex<SyncState> {
        &self.sync
    }

    pub async fn console_failures(&self) -> u32 {
        self.sync.lock().await.failures.get()
    }

    pub async fn is_connected(&self) -> bool {
        self.sync.lock().await.is_connected()
    }

    /// Receiver that flips to `true` when the tenant is deleted
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    pub fn is_shut_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Start a synchronizer pass unless one is already in flight.
    ///
    /// Returns true if a new pass was spawned.
    pub fn ensure_sync(self: &Arc<Self>, sync: &Arc<Synchronizer>) -> bool {
        let mut task = self.sync_task.lock();

        if self.is_shut_down() {
            return false;
        }
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return false;
        }

        let tenant = Arc::clone(self);
        let sync = Arc::clone(sync);
        *task = Some(tokio::spawn(async move {
            sync.run_once(&tenant).await;
        }));
        true
    }

    /// Cancel the synchronizer, release the console and close every session
    pub async fn shutdown(&self) {
        self.shutdown.send_replace(true);

        let task = self.sync_task.lock().take();
        if let Some(task) = task {
            task.abort();
        }

        self.sync.lock().await.disconnect().await;

        let closed = self.sessions.clear();
        tracing::info!(tenant = %self.name, sessions = closed.len(), "Tenant shut down");
    }
}
