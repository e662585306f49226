//! Membership manager.
//!
//! Handles member operations with permission checks. Membership creation
//! happens as a side effect of invitation acceptance (or tenant creation,
//! where the owner is implicitly a member), so `add_member` is a
//! system-level operation; removal is admin-gated.

use super::error::{MemberError, Result};
use super::storage::MembershipStore;
use super::types::{TenantMembership, TenantRole};
use crate::util::current_timestamp;
use tracing::{info, instrument};
use uuid::Uuid;

/// Membership manager.
#[derive(Clone)]
pub struct MembershipManager<M>
where
    M: MembershipStore,
{
    store: M,
}

impl<M> MembershipManager<M>
where
    M: MembershipStore,
{
    /// Create a new membership manager.
    pub fn new(store: M) -> Self {
        Self { store }
    }

    /// Get a reference to the membership store.
    pub fn store(&self) -> &M {
        &self.store
    }

    /// Add a member to a tenant.
    ///
    /// Called by workflows that have already made their own access
    /// decision (invitation acceptance, tenant provisioning).
    #[instrument(skip(self, member_email))]
    pub async fn add_member(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        role: TenantRole,
        invited_by: Option<Uuid>,
        member_email: &str,
    ) -> Result<TenantMembership> {
        if self.store.is_member(tenant_id, user_id).await? {
            return Err(MemberError::AlreadyMember);
        }

        let membership = TenantMembership {
            tenant_id,
            user_id,
            role,
            invited_by,
            member_email: member_email.to_string(),
            joined_at: current_timestamp(),
        };
        self.store.add_member(&membership).await?;

        info!(%tenant_id, %user_id, role = %role, "Member added");
        Ok(membership)
    }

    /// Remove a member from a tenant. The actor must be an admin.
    #[instrument(skip(self))]
    pub async fn remove_member(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        actor_id: Uuid,
    ) -> Result<()> {
        let actor_role = self
            .store
            .member_role(tenant_id, actor_id)
            .await?
            .ok_or(MemberError::NotMember)?;
        if !actor_role.can_manage_members() {
            return Err(MemberError::insufficient_permission("can_manage_members"));
        }

        if !self.store.is_member(tenant_id, user_id).await? {
            return Err(MemberError::NotMember);
        }

        self.store.remove_member(tenant_id, user_id).await?;
        info!(%tenant_id, %user_id, %actor_id, "Member removed");
        Ok(())
    }

    /// Get a user's role in a tenant, if they are a member.
    pub async fn member_role(&self, tenant_id: Uuid, user_id: Uuid) -> Result<Option<TenantRole>> {
        self.store
            .member_role(tenant_id, user_id)
            .await
            .map_err(Into::into)
    }

    /// List all members of a tenant.
    pub async fn list_members(&self, tenant_id: Uuid) -> Result<Vec<TenantMembership>> {
        self.store.list_members(tenant_id).await.map_err(Into::into)
    }

    /// Ids of the tenants a user is a member of.
    pub async fn user_tenants(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        self.store
            .tenant_ids_for_user(user_id)
            .await
            .map_err(Into::into)
    }

    /// Check if a user is a member of a tenant.
    pub async fn is_member(&self, tenant_id: Uuid, user_id: Uuid) -> Result<bool> {
        self.store.is_member(tenant_id, user_id).await.map_err(Into::into)
    }

    /// Count members of a tenant.
    pub async fn count_members(&self, tenant_id: Uuid) -> Result<u32> {
        self.store.count_members(tenant_id).await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::members::memory::InMemoryMemberStore;

    fn manager() -> MembershipManager<InMemoryMemberStore> {
        MembershipManager::new(InMemoryMemberStore::new())
    }

    #[tokio::test]
    async fn test_add_member_once() {
        let manager = manager();
        let tenant_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        let membership = manager
            .add_member(tenant_id, user_id, TenantRole::Member, None, "m@example.com")
            .await
            .unwrap();
        assert_eq!(membership.role, TenantRole::Member);

        let err = manager
            .add_member(tenant_id, user_id, TenantRole::Admin, None, "m@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, MemberError::AlreadyMember));
    }

    #[tokio::test]
    async fn test_remove_member_requires_admin() {
        let manager = manager();
        let tenant_id = Uuid::new_v4();
        let admin = Uuid::new_v4();
        let member = Uuid::new_v4();

        manager
            .add_member(tenant_id, admin, TenantRole::Admin, None, "a@example.com")
            .await
            .unwrap();
        manager
            .add_member(tenant_id, member, TenantRole::Member, None, "m@example.com")
            .await
            .unwrap();

        // A plain member cannot remove anyone
        let err = manager
            .remove_member(tenant_id, admin, member)
            .await
            .unwrap_err();
        assert!(matches!(err, MemberError::InsufficientPermission { .. }));

        // An admin can
        manager.remove_member(tenant_id, member, admin).await.unwrap();
        assert!(!manager.is_member(tenant_id, member).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_member_unknown_actor() {
        let manager = manager();
        let err = manager
            .remove_member(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, MemberError::NotMember));
    }

    #[tokio::test]
    async fn test_member_role_lookup() {
        let manager = manager();
        let tenant_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        assert_eq!(manager.member_role(tenant_id, user_id).await.unwrap(), None);

        manager
            .add_member(tenant_id, user_id, TenantRole::Admin, None, "a@example.com")
            .await
            .unwrap();
        assert_eq!(
            manager.member_role(tenant_id, user_id).await.unwrap(),
            Some(TenantRole::Admin)
        );
    }
}
