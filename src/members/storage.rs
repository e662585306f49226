//! Storage traits for memberships and invitations.

use super::types::{
    Invitation, ProjectMembership, TargetKind, TenantMembership, TenantRole,
};
use crate::error::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Trait for tenant membership storage.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Persist a new membership.
    async fn add_member(&self, membership: &TenantMembership) -> Result<()>;

    /// Remove a membership.
    async fn remove_member(&self, tenant_id: Uuid, user_id: Uuid) -> Result<()>;

    /// Get a user's membership in a tenant.
    async fn get_membership(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<TenantMembership>>;

    /// List all members of a tenant.
    async fn list_members(&self, tenant_id: Uuid) -> Result<Vec<TenantMembership>>;

    /// Ids of the tenants a user is a member of.
    async fn tenant_ids_for_user(&self, user_id: Uuid) -> Result<Vec<Uuid>>;

    /// Check if a user is a member of a tenant.
    async fn is_member(&self, tenant_id: Uuid, user_id: Uuid) -> Result<bool> {
        Ok(self.get_membership(tenant_id, user_id).await?.is_some())
    }

    /// Count members of a tenant.
    async fn count_members(&self, tenant_id: Uuid) -> Result<u32> {
        Ok(self.list_members(tenant_id).await?.len() as u32)
    }

    /// Get a user's role in a tenant, if any.
    async fn member_role(&self, tenant_id: Uuid, user_id: Uuid) -> Result<Option<TenantRole>> {
        Ok(self
            .get_membership(tenant_id, user_id)
            .await?
            .map(|m| m.role))
    }
}

/// Trait for project membership storage.
#[async_trait]
pub trait ProjectMemberStore: Send + Sync {
    /// Persist a new project membership.
    async fn add_project_member(&self, membership: &ProjectMembership) -> Result<()>;

    /// Check if a user is a member of a project.
    async fn is_project_member(&self, project_id: Uuid, user_id: Uuid) -> Result<bool>;

    /// List all members of a project.
    async fn list_project_members(&self, project_id: Uuid) -> Result<Vec<ProjectMembership>>;
}

/// Trait for invitation storage.
#[async_trait]
pub trait InvitationStore: Send + Sync {
    /// Persist a new invitation.
    async fn create(&self, invitation: &Invitation) -> Result<()>;

    /// Find an invitation by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Invitation>>;

    /// Find an invitation by its token.
    async fn find_by_token(&self, token: &str) -> Result<Option<Invitation>>;

    /// Find a pending invitation for an email and resource, if one exists.
    async fn find_pending(
        &self,
        email: &str,
        kind: TargetKind,
        resource_id: Uuid,
    ) -> Result<Option<Invitation>>;

    /// List pending invitations for a resource.
    async fn list_pending_for_target(
        &self,
        kind: TargetKind,
        resource_id: Uuid,
    ) -> Result<Vec<Invitation>>;

    /// List pending invitations addressed to an email.
    async fn list_pending_for_email(&self, email: &str) -> Result<Vec<Invitation>>;

    /// Persist changes to an existing invitation.
    async fn update(&self, invitation: &Invitation) -> Result<()>;

    /// Transition every pending invitation past its expiry to `Expired`,
    /// returning how many were swept.
    async fn sweep_expired(&self, now: u64) -> Result<u32>;

    /// Count pending invitations for a resource.
    async fn count_pending(&self, kind: TargetKind, resource_id: Uuid) -> Result<u32> {
        Ok(self.list_pending_for_target(kind, resource_id).await?.len() as u32)
    }
}
