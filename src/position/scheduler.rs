//! Global synchronization tick
//!
//! On every tick each tenant gets a synchronizer pass unless its previous
//! pass (possibly still waiting out a reconnect backoff) is in flight.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::synchronizer::Synchronizer;
use crate::tenant::TenantRegistry;

pub struct Scheduler {
    tenants: Arc<TenantRegistry>,
    sync: Arc<Synchronizer>,
    interval: Duration,
}

impl Scheduler {
    pub fn new(tenants: Arc<TenantRegistry>, sync: Arc<Synchronizer>, interval: Duration) -> Self {
        Self {
            tenants,
            sync,
            interval,
        }
    }

    /// Start passes for every tenant that has none in flight
    pub fn tick(&self) -> usize {
        self.tenants
            .all()
            .iter()
            .filter(|tenant| tenant.ensure_sync(&self.sync))
            .count()
    }

    /// Tick forever
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let started = self.tick();
            tracing::trace!(started, "Synchronizer tick");
        }
    }

    pub fn start_background(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
