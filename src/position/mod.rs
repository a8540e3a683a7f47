//! Position synchronization against the game-server console

pub mod backoff;
pub mod query;
pub mod scheduler;
pub mod synchronizer;

pub use backoff::{Backoff, FailureCounter};
pub use scheduler::Scheduler;
pub use synchronizer::{poll_sessions, SyncState, Synchronizer};
