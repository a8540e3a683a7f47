//! Tenant management module
//!
//! A tenant is one configured game server together with its connected
//! sessions and its console connection.

pub mod registry;
pub mod state;

pub use registry::TenantRegistry;
pub use state::{Tenant, TenantConfig};
