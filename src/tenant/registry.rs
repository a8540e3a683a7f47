//! Tenant registry
//!
//! Guarded by its own lock, separate from every tenant's session lock.
//! Tenant creation and deletion are rare next to session churn.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;

use super::state::{Tenant, TenantConfig};
use crate::error::TenantError;

/// Named tenants of this process
#[derive(Default)]
pub struct TenantRegistry {
    tenants: RwLock<HashMap<String, Arc<Tenant>>>,
}

impl TenantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tenant unless one with the same name exists
    pub fn create(&self, name: &str, config: TenantConfig) -> Result<Arc<Tenant>, TenantError> {
        if name.is_empty() {
            return Err(TenantError::MissingName);
        }
        config.validate()?;

        let mut tenants = self.tenants.write();
        if tenants.contains_key(name) {
            return Err(TenantError::AlreadyExists(name.to_string()));
        }

        let tenant = Arc::new(Tenant::new(name, config));
        tenants.insert(name.to_string(), tenant.clone());

        tracing::info!(tenant = %name, "Tenant created");
        Ok(tenant)
    }

    /// Delete a tenant if `password` matches, then shut it down
    pub async fn delete(&self, name: &str, password: &str) -> Result<(), TenantError> {
        let tenant = {
            let mut tenants = self.tenants.write();
            let tenant = tenants
                .get(name)
                .ok_or_else(|| TenantError::NotFound(name.to_string()))?;
            if tenant.config().password != password {
                return Err(TenantError::Unauthorized);
            }
            tenants.remove(name)
        };

        if let Some(tenant) = tenant {
            tenant.shutdown().await;
            tracing::info!(tenant = %name, "Tenant deleted");
        }
        Ok(())
    }

    /// Full configuration of a tenant if `password` matches
    pub fn get(&self, name: &str, password: &str) -> Result<TenantConfig, TenantError> {
        let tenants = self.tenants.read();
        let tenant = tenants
            .get(name)
            .ok_or_else(|| TenantError::NotFound(name.to_string()))?;
        if tenant.config().password != password {
            return Err(TenantError::Unauthorized);
        }
        Ok(tenant.config().clone())
    }

    /// Every tenant with secrets masked
    pub fn list(&self) -> BTreeMap<String, TenantConfig> {
        self.tenants
            .read()
            .iter()
            .map(|(name, tenant)| (name.clone(), tenant.config().redacted()))
            .collect()
    }

    /// Look up a tenant for a new connection
    pub fn resolve(&self, name: &str) -> Option<Arc<Tenant>> {
        self.tenants.read().get(name).cloned()
    }

    pub fn all(&self) -> Vec<Arc<Tenant>> {
        self.tenants.read().values().cloned().collect()
    }

    /// Tenant names in sorted order
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tenants.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.tenants.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tenants.read().is_empty()
    }

    /// Remove and shut down every tenant
    pub async fn shutdown_all(&self) {
        let tenants: Vec<Arc<Tenant>> = self.tenants.write().drain().map(|(_, t)| t).collect();
        for tenant in tenants {
            tenant.shutdown().await;
        }
    }
}
