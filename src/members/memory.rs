//! In-memory membership and invitation store.
//!
//! One store implements all three storage traits plus the membership
//! directory seam, mirroring how a single database schema would back them.

use super::storage::{InvitationStore, MembershipStore, ProjectMemberStore};
use super::types::{
    Invitation, InvitationStatus, ProjectMembership, TargetKind, TenantMembership,
};
use crate::directory::MembershipDirectory;
use crate::error::{MoorageError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct State {
    tenant_members: HashMap<(Uuid, Uuid), TenantMembership>,
    project_members: HashMap<(Uuid, Uuid), ProjectMembership>,
    invitations: HashMap<Uuid, Invitation>,
    invitations_by_token: HashMap<String, Uuid>,
}

/// In-memory store implementing [`MembershipStore`], [`ProjectMemberStore`],
/// [`InvitationStore`], and [`MembershipDirectory`].
///
/// Cloning shares the same underlying data.
#[derive(Clone, Default)]
pub struct InMemoryMemberStore {
    inner: Arc<RwLock<State>>,
}

impl InMemoryMemberStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a membership directly (for test setup).
    pub async fn insert_membership(&self, membership: TenantMembership) {
        let key = (membership.tenant_id, membership.user_id);
        self.inner.write().await.tenant_members.insert(key, membership);
    }

    /// Insert an invitation directly (for test setup).
    pub async fn insert_invitation(&self, invitation: Invitation) {
        let mut state = self.inner.write().await;
        state
            .invitations_by_token
            .insert(invitation.token.clone(), invitation.id);
        state.invitations.insert(invitation.id, invitation);
    }
}

#[async_trait]
impl MembershipStore for InMemoryMemberStore {
    async fn add_member(&self, membership: &TenantMembership) -> Result<()> {
        let key = (membership.tenant_id, membership.user_id);
        self.inner
            .write()
            .await
            .tenant_members
            .insert(key, membership.clone());
        Ok(())
    }

    async fn remove_member(&self, tenant_id: Uuid, user_id: Uuid) -> Result<()> {
        self.inner
            .write()
            .await
            .tenant_members
            .remove(&(tenant_id, user_id));
        Ok(())
    }

    async fn get_membership(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<TenantMembership>> {
        Ok(self
            .inner
            .read()
            .await
            .tenant_members
            .get(&(tenant_id, user_id))
            .cloned())
    }

    async fn list_members(&self, tenant_id: Uuid) -> Result<Vec<TenantMembership>> {
        Ok(self
            .inner
            .read()
            .await
            .tenant_members
            .values()
            .filter(|m| m.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn tenant_ids_for_user(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        Ok(self
            .inner
            .read()
            .await
            .tenant_members
            .values()
            .filter(|m| m.user_id == user_id)
            .map(|m| m.tenant_id)
            .collect())
    }
}

#[async_trait]
impl ProjectMemberStore for InMemoryMemberStore {
    async fn add_project_member(&self, membership: &ProjectMembership) -> Result<()> {
        let key = (membership.project_id, membership.user_id);
        self.inner
            .write()
            .await
            .project_members
            .insert(key, membership.clone());
        Ok(())
    }

    async fn is_project_member(&self, project_id: Uuid, user_id: Uuid) -> Result<bool> {
        Ok(self
            .inner
            .read()
            .await
            .project_members
            .contains_key(&(project_id, user_id)))
    }

    async fn list_project_members(&self, project_id: Uuid) -> Result<Vec<ProjectMembership>> {
        Ok(self
            .inner
            .read()
            .await
            .project_members
            .values()
            .filter(|m| m.project_id == project_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl InvitationStore for InMemoryMemberStore {
    async fn create(&self, invitation: &Invitation) -> Result<()> {
        let mut state = self.inner.write().await;
        state
            .invitations_by_token
            .insert(invitation.token.clone(), invitation.id);
        state.invitations.insert(invitation.id, invitation.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Invitation>> {
        Ok(self.inner.read().await.invitations.get(&id).cloned())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Invitation>> {
        let state = self.inner.read().await;
        let id = state.invitations_by_token.get(token);
        Ok(id.and_then(|id| state.invitations.get(id)).cloned())
    }

    async fn find_pending(
        &self,
        email: &str,
        kind: TargetKind,
        resource_id: Uuid,
    ) -> Result<Option<Invitation>> {
        Ok(self
            .inner
            .read()
            .await
            .invitations
            .values()
            .find(|inv| {
                inv.status == InvitationStatus::Pending
                    && inv.email.eq_ignore_ascii_case(email)
                    && inv.target.kind() == kind
                    && inv.target.resource_id() == resource_id
            })
            .cloned())
    }

    async fn list_pending_for_target(
        &self,
        kind: TargetKind,
        resource_id: Uuid,
    ) -> Result<Vec<Invitation>> {
        Ok(self
            .inner
            .read()
            .await
            .invitations
            .values()
            .filter(|inv| {
                inv.status == InvitationStatus::Pending
                    && inv.target.kind() == kind
                    && inv.target.resource_id() == resource_id
            })
            .cloned()
            .collect())
    }

    async fn list_pending_for_email(&self, email: &str) -> Result<Vec<Invitation>> {
        Ok(self
            .inner
            .read()
            .await
            .invitations
            .values()
            .filter(|inv| {
                inv.status == InvitationStatus::Pending && inv.email.eq_ignore_ascii_case(email)
            })
            .cloned()
            .collect())
    }

    async fn update(&self, invitation: &Invitation) -> Result<()> {
        let mut state = self.inner.write().await;
        match state.invitations.get_mut(&invitation.id) {
            Some(existing) => {
                *existing = invitation.clone();
                Ok(())
            }
            None => Err(MoorageError::not_found(format!(
                "Invitation {} does not exist",
                invitation.id
            ))),
        }
    }

    async fn sweep_expired(&self, now: u64) -> Result<u32> {
        let mut state = self.inner.write().await;
        let mut swept = 0;
        for invitation in state.invitations.values_mut() {
            if invitation.status == InvitationStatus::Pending && now > invitation.expires_at {
                invitation.status = InvitationStatus::Expired;
                swept += 1;
            }
        }
        Ok(swept)
    }
}

#[async_trait]
impl MembershipDirectory for InMemoryMemberStore {
    async fn member_tenant_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        self.tenant_ids_for_user(user_id).await
    }
}
