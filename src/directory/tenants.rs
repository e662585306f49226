//! Tenant-facing seams consumed by sibling modules and services.

use crate::error::Result;
use crate::plans::ResourceKind;
use crate::tenants::{LimitDecision, ReserveOutcome};
use async_trait::async_trait;
use uuid::Uuid;

/// A tenant as seen by collaborators: identity plus the one usage figure the
/// invitation workflow needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TenantSummary {
    pub id: Uuid,
    pub name: String,
    pub current_users: u32,
}

/// The quota operations a tenant service exposes to its siblings:
/// existence/usage lookup, advisory limit validation, and the two counter
/// mutations. Implemented by `TenantManager`; sibling services call these
/// before and after creating dependent resources.
#[async_trait]
pub trait TenantGateway: Send + Sync {
    /// Find a tenant by id.
    async fn find_tenant(&self, tenant_id: Uuid) -> Result<Option<TenantSummary>>;

    /// Advisory limit check: would `proposed` of `kind` fit under the cap?
    ///
    /// Callers must not treat an allow here as a reservation; the mutation
    /// path re-checks atomically.
    async fn validate_limit(
        &self,
        tenant_id: Uuid,
        kind: ResourceKind,
        proposed: u32,
    ) -> Result<LimitDecision>;

    /// Atomically increment a usage counter iff it stays within the cap.
    async fn reserve(&self, tenant_id: Uuid, kind: ResourceKind) -> Result<ReserveOutcome>;

    /// Decrement a usage counter with a floor of zero.
    async fn release(&self, tenant_id: Uuid, kind: ResourceKind) -> Result<()>;
}

/// Membership lookups the tenant service needs from user management.
#[async_trait]
pub trait MembershipDirectory: Send + Sync {
    /// Ids of the tenants a user is a member of.
    async fn member_tenant_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>>;
}

/// Plan application driven by billing: called when a payment succeeds.
#[async_trait]
pub trait TenantProvisioner: Send + Sync {
    /// Apply a purchased plan to a tenant and activate its subscription.
    async fn upgrade_plan(
        &self,
        tenant_id: Uuid,
        plan_id: &str,
        subscription_id: Uuid,
    ) -> Result<()>;
}
