//! Tenant storage trait.

use super::types::Tenant;
use crate::error::Result;
use crate::plans::ResourceKind;
use async_trait::async_trait;
use uuid::Uuid;

/// Outcome of an atomic counter reservation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReserveOutcome {
    /// The counter was incremented; `current` is the new count.
    Reserved { cap: i32, current: u32 },
    /// The cap would have been exceeded; the counter is unchanged.
    Denied { cap: i32, current: u32 },
}

impl ReserveOutcome {
    /// Check whether the reservation succeeded.
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        matches!(self, Self::Reserved { .. })
    }
}

/// Trait for tenant storage operations.
///
/// `try_reserve` and `release` are the only paths that mutate usage
/// counters. `try_reserve` must be atomic: check-against-cap and increment
/// in one conditional write, never two separate calls. Implementations over
/// SQL should express it as a single conditional `UPDATE`; the in-memory
/// store holds one write lock across both steps.
#[async_trait]
pub trait TenantStore: Send + Sync {
    /// Persist a new tenant.
    async fn create(&self, tenant: &Tenant) -> Result<()>;

    /// Find a tenant by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tenant>>;

    /// Find a tenant by slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tenant>>;

    /// Find all tenants matching the given ids.
    async fn find_all_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Tenant>>;

    /// List tenants owned by a user.
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Tenant>>;

    /// Count non-deleted tenants owned by a user.
    async fn count_owned_by(&self, owner_id: Uuid) -> Result<u32>;

    /// Persist changes to an existing tenant.
    async fn update(&self, tenant: &Tenant) -> Result<()>;

    /// Check whether a NIT is already registered.
    async fn exists_by_nit(&self, nit: &str) -> Result<bool>;

    /// Check whether a slug is already taken.
    async fn exists_by_slug(&self, slug: &str) -> Result<bool>;

    /// Atomically increment a usage counter iff the result would not exceed
    /// the tenant's cap. Unlimited caps always reserve.
    async fn try_reserve(&self, tenant_id: Uuid, kind: ResourceKind) -> Result<ReserveOutcome>;

    /// Decrement a usage counter with a floor of zero, returning the new
    /// count.
    async fn release(&self, tenant_id: Uuid, kind: ResourceKind) -> Result<u32>;
}
