//! Session management module

pub mod registry;
pub mod state;

pub use registry::SessionRegistry;
pub use state::{Outbound, Session, SpatialState};
