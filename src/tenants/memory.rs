//! In-memory tenant store.
//!
//! Suitable for development, testing, and single-instance deployments.
//! All state lives behind one `RwLock`, which makes `try_reserve` naturally
//! atomic: the cap check and the increment happen under the same write
//! guard.

use super::storage::{ReserveOutcome, TenantStore};
use super::types::{Tenant, TenantStatus};
use crate::error::{MoorageError, Result};
use crate::plans::{ResourceKind, UNLIMITED};
use crate::util::current_timestamp;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory [`TenantStore`] implementation.
///
/// Cloning shares the same underlying data.
#[derive(Clone, Default)]
pub struct InMemoryTenantStore {
    inner: Arc<RwLock<HashMap<Uuid, Tenant>>>,
}

impl InMemoryTenantStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tenant directly (for test setup).
    pub async fn insert(&self, tenant: Tenant) {
        self.inner.write().await.insert(tenant.id, tenant);
    }
}

#[async_trait]
impl TenantStore for InMemoryTenantStore {
    async fn create(&self, tenant: &Tenant) -> Result<()> {
        self.inner.write().await.insert(tenant.id, tenant.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tenant>> {
        Ok(self.inner.read().await.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tenant>> {
        Ok(self
            .inner
            .read()
            .await
            .values()
            .find(|t| t.slug == slug)
            .cloned())
    }

    async fn find_all_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Tenant>> {
        let tenants = self.inner.read().await;
        Ok(ids.iter().filter_map(|id| tenants.get(id).cloned()).collect())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Tenant>> {
        Ok(self
            .inner
            .read()
            .await
            .values()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn count_owned_by(&self, owner_id: Uuid) -> Result<u32> {
        Ok(self
            .inner
            .read()
            .await
            .values()
            .filter(|t| t.owner_id == owner_id && t.status != TenantStatus::Deleted)
            .count() as u32)
    }

    async fn update(&self, tenant: &Tenant) -> Result<()> {
        let mut tenants = self.inner.write().await;
        match tenants.get_mut(&tenant.id) {
            Some(existing) => {
                *existing = tenant.clone();
                Ok(())
            }
            None => Err(MoorageError::not_found(format!(
                "Tenant {} does not exist",
                tenant.id
            ))),
        }
    }

    async fn exists_by_nit(&self, nit: &str) -> Result<bool> {
        Ok(self
            .inner
            .read()
            .await
            .values()
            .any(|t| t.nit.as_deref() == Some(nit)))
    }

    async fn exists_by_slug(&self, slug: &str) -> Result<bool> {
        Ok(self.inner.read().await.values().any(|t| t.slug == slug))
    }

    async fn try_reserve(&self, tenant_id: Uuid, kind: ResourceKind) -> Result<ReserveOutcome> {
        let mut tenants = self.inner.write().await;
        let tenant = tenants.get_mut(&tenant_id).ok_or_else(|| {
            MoorageError::not_found(format!("Tenant {} does not exist", tenant_id))
        })?;

        let cap = tenant.caps.cap(kind);
        let current = tenant.usage.get(kind);
        if cap != UNLIMITED && i64::from(current) + 1 > i64::from(cap) {
            return Ok(ReserveOutcome::Denied { cap, current });
        }

        let current = tenant.usage.increment(kind);
        tenant.updated_at = current_timestamp();
        Ok(ReserveOutcome::Reserved { cap, current })
    }

    async fn release(&self, tenant_id: Uuid, kind: ResourceKind) -> Result<u32> {
        let mut tenants = self.inner.write().await;
        let tenant = tenants.get_mut(&tenant_id).ok_or_else(|| {
            MoorageError::not_found(format!("Tenant {} does not exist", tenant_id))
        })?;

        let current = tenant.usage.decrement(kind);
        tenant.updated_at = current_timestamp();
        Ok(current)
    }
}
