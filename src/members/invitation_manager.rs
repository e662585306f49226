//! Invitation manager.
//!
//! Orchestrates the invitation lifecycle: creation with its precondition
//! chain, acceptance with membership creation and best-effort side effects,
//! rejection, revocation, and the expiry sweep.

use super::config::InvitationConfig;
use super::error::{MemberError, Result};
use super::storage::{InvitationStore, MembershipStore, ProjectMemberStore};
use super::types::{
    Invitation, InvitationStatus, InvitationTarget, ProjectMembership, ProjectRole, TargetKind,
    TenantMembership,
};
use crate::directory::{ProjectDirectory, TenantGateway};
use crate::events::{publish_best_effort, EventPublisher, Event, InvitationAccepted, UserInvited};
use crate::tenants::ReserveOutcome;
use crate::plans::ResourceKind;
use crate::util::{current_timestamp, is_valid_email};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Parameters for creating an invitation.
#[derive(Clone, Debug)]
pub struct InviteRequest {
    /// Invitee email address.
    pub email: String,
    /// The resource being offered, with the proposed role.
    pub target: InvitationTarget,
    /// Display name override for notifications; defaults to the resource's
    /// own name.
    pub resource_name: Option<String>,
    /// Projects a tenant-level invite additionally grants access to.
    pub project_ids: Vec<Uuid>,
}

impl InviteRequest {
    /// An invitation to join a tenant.
    #[must_use]
    pub fn to_tenant(
        email: impl Into<String>,
        tenant_id: Uuid,
        role: super::types::TenantRole,
    ) -> Self {
        Self {
            email: email.into(),
            target: InvitationTarget::Tenant { tenant_id, role },
            resource_name: None,
            project_ids: Vec::new(),
        }
    }

    /// An invitation to join a project.
    #[must_use]
    pub fn to_project(email: impl Into<String>, project_id: Uuid, role: ProjectRole) -> Self {
        Self {
            email: email.into(),
            target: InvitationTarget::Project { project_id, role },
            resource_name: None,
            project_ids: Vec::new(),
        }
    }

    /// Attach projects a tenant-level invite also grants access to.
    #[must_use]
    pub fn with_projects(mut self, project_ids: Vec<Uuid>) -> Self {
        self.project_ids = project_ids;
        self
    }
}

/// Invitation manager - handles the invitation lifecycle.
///
/// # Example
///
/// ```rust,ignore
/// use moorage::members::{InvitationManager, InvitationConfig, InviteRequest, TenantRole};
///
/// let manager = InvitationManager::new(
///     member_store.clone(),   // invitations
///     member_store,           // memberships + project memberships
///     tenant_manager,         // tenant gateway
///     project_directory,
///     event_publisher,
///     InvitationConfig::default(),
/// );
///
/// let invitation = manager
///     .invite(
///         InviteRequest::to_tenant("new@example.com", tenant_id, TenantRole::Member),
///         admin_id,
///         "admin@example.com",
///     )
///     .await?;
///
/// manager.accept(&invitation.token, new_user_id).await?;
/// ```
#[derive(Clone)]
pub struct InvitationManager<I, M, T, P, E>
where
    I: InvitationStore,
    M: MembershipStore + ProjectMemberStore,
    T: TenantGateway,
    P: ProjectDirectory,
    E: EventPublisher,
{
    invitations: I,
    members: M,
    tenants: T,
    projects: P,
    events: E,
    config: InvitationConfig,
}

impl<I, M, T, P, E> InvitationManager<I, M, T, P, E>
where
    I: InvitationStore,
    M: MembershipStore + ProjectMemberStore,
    T: TenantGateway,
    P: ProjectDirectory,
    E: EventPublisher,
{
    /// Create a new invitation manager.
    pub fn new(
        invitations: I,
        members: M,
        tenants: T,
        projects: P,
        events: E,
        config: InvitationConfig,
    ) -> Self {
        Self {
            invitations,
            members,
            tenants,
            projects,
            events,
            config,
        }
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &InvitationConfig {
        &self.config
    }

    /// Create an invitation.
    ///
    /// Preconditions, checked in order: well-formed email, no self-invite,
    /// no duplicate pending invitation, target resource exists, user cap has
    /// room (tenant targets), every attached project resolves, and the
    /// pending-invitation limit is not exhausted. Nothing is persisted on
    /// any failure.
    #[instrument(skip(self, req, inviter_email), fields(target = %req.target.kind()))]
    pub async fn invite(
        &self,
        req: InviteRequest,
        inviter_id: Uuid,
        inviter_email: &str,
    ) -> Result<Invitation> {
        let email = req.email.trim().to_string();
        if !is_valid_email(&email) {
            return Err(MemberError::invalid_email(email));
        }
        if email.eq_ignore_ascii_case(inviter_email.trim()) {
            return Err(MemberError::SelfInvite);
        }

        let kind = req.target.kind();
        let resource_id = req.target.resource_id();

        if self
            .invitations
            .find_pending(&email, kind, resource_id)
            .await?
            .is_some()
        {
            return Err(MemberError::AlreadyInvited);
        }

        // The target must exist; tenant targets must also have a free seat
        // for the would-be member.
        let resource_name = match req.target {
            InvitationTarget::Tenant { tenant_id, .. } => {
                let tenant = self
                    .tenants
                    .find_tenant(tenant_id)
                    .await
                    .map_err(|err| MemberError::Unavailable(err.to_string()))?
                    .ok_or_else(|| MemberError::target_not_found("TENANT", tenant_id))?;

                let decision = self
                    .tenants
                    .validate_limit(tenant_id, ResourceKind::User, tenant.current_users + 1)
                    .await
                    .map_err(|err| MemberError::Unavailable(err.to_string()))?;
                if !decision.allowed {
                    warn!(%tenant_id, "User limit denied invitation");
                    return Err(MemberError::LimitExceeded {
                        cap: decision.cap,
                        current: decision.current,
                        message: decision
                            .message
                            .unwrap_or_else(|| "User limit reached".to_string()),
                        upgrade_hint: decision
                            .upgrade_hint
                            .unwrap_or_else(|| "Upgrade your plan".to_string()),
                    });
                }

                req.resource_name.unwrap_or(tenant.name)
            }
            InvitationTarget::Project { project_id, .. } => {
                if !req.project_ids.is_empty() {
                    return Err(MemberError::InvalidProjectList);
                }
                let project = self
                    .projects
                    .find_project(project_id)
                    .await
                    .map_err(|err| MemberError::Unavailable(err.to_string()))?
                    .ok_or_else(|| MemberError::target_not_found("PROJECT", project_id))?;
                req.resource_name.unwrap_or(project.name)
            }
        };

        for project_id in &req.project_ids {
            self.projects
                .find_project(*project_id)
                .await
                .map_err(|err| MemberError::Unavailable(err.to_string()))?
                .ok_or(MemberError::ProjectNotFound {
                    project_id: *project_id,
                })?;
        }

        let pending = self.invitations.count_pending(kind, resource_id).await?;
        if pending >= self.config.max_pending_per_target {
            return Err(MemberError::MaxPendingReached {
                limit: self.config.max_pending_per_target,
            });
        }

        let now = current_timestamp();
        let invitation = Invitation {
            id: Uuid::new_v4(),
            email: email.clone(),
            token: generate_secure_token(),
            target: req.target,
            resource_name: resource_name.clone(),
            project_ids: req.project_ids,
            status: InvitationStatus::Pending,
            invited_by: inviter_id,
            inviter_email: inviter_email.to_string(),
            expires_at: now + self.config.expiry_seconds(),
            accepted_at: None,
            created_at: now,
        };

        self.invitations.create(&invitation).await?;
        info!(
            invitation_id = %invitation.id,
            email = %invitation.email,
            projects = invitation.project_ids.len(),
            "Invitation created"
        );

        publish_best_effort(
            &self.events,
            Event::UserInvited(UserInvited {
                event_id: Uuid::new_v4(),
                occurred_at: now,
                invitation_id: invitation.id,
                email: invitation.email.clone(),
                resource_id,
                resource_name,
                resource_type: kind.as_str().to_string(),
                inviter_email: invitation.inviter_email.clone(),
                token: invitation.token.clone(),
                expires_at: invitation.expires_at,
            }),
        )
        .await;

        Ok(invitation)
    }

    /// Accept an invitation by token.
    ///
    /// Creates the membership, then runs the best-effort side effects: the
    /// user-counter reservation and the project fan-out are logged on
    /// failure, never propagated, and the membership is not rolled back.
    /// The `Accepted` transition is final regardless of their outcome.
    #[instrument(skip(self, token))]
    pub async fn accept(&self, token: &str, user_id: Uuid) -> Result<Invitation> {
        let now = current_timestamp();
        let mut invitation = self
            .invitations
            .find_by_token(token)
            .await?
            .ok_or(MemberError::InvalidToken)?;

        if !invitation.is_pending() {
            return Err(MemberError::InvalidState {
                status: invitation.status,
            });
        }
        if invitation.is_expired(now) {
            return Err(MemberError::Expired);
        }

        match invitation.target {
            InvitationTarget::Tenant { tenant_id, role } => {
                if !self.members.is_member(tenant_id, user_id).await? {
                    let membership = TenantMembership {
                        tenant_id,
                        user_id,
                        role,
                        invited_by: Some(invitation.invited_by),
                        member_email: invitation.email.clone(),
                        joined_at: now,
                    };
                    self.members.add_member(&membership).await?;
                    info!(%tenant_id, %user_id, role = %role, "User added to tenant");

                    // Best effort: membership stands even if the counter
                    // cannot be bumped.
                    match self.tenants.reserve(tenant_id, ResourceKind::User).await {
                        Ok(ReserveOutcome::Reserved { .. }) => {}
                        Ok(ReserveOutcome::Denied { cap, current }) => {
                            warn!(
                                %tenant_id, cap, current,
                                "User counter at cap while accepting invitation"
                            );
                        }
                        Err(err) => {
                            warn!(
                                %tenant_id, error = %err,
                                "Failed to increment user counter"
                            );
                        }
                    }
                }

                for project_id in &invitation.project_ids {
                    self.fan_out_project_membership(*project_id, tenant_id, user_id, &invitation)
                        .await;
                }
            }
            InvitationTarget::Project { project_id, role } => {
                if !self.members.is_project_member(project_id, user_id).await? {
                    let project = self
                        .projects
                        .find_project(project_id)
                        .await
                        .map_err(|err| MemberError::Unavailable(err.to_string()))?
                        .ok_or(MemberError::ProjectNotFound { project_id })?;

                    self.members
                        .add_project_member(&ProjectMembership {
                            project_id,
                            tenant_id: project.tenant_id,
                            user_id,
                            role,
                            added_by: Some(invitation.invited_by),
                            added_at: now,
                        })
                        .await?;
                    info!(%project_id, %user_id, role = %role, "User added to project");
                }
            }
        }

        invitation.status = InvitationStatus::Accepted;
        invitation.accepted_at = Some(now);
        self.invitations.update(&invitation).await?;
        info!(invitation_id = %invitation.id, %user_id, "Invitation accepted");

        publish_best_effort(
            &self.events,
            Event::InvitationAccepted(InvitationAccepted {
                event_id: Uuid::new_v4(),
                occurred_at: now,
                invitation_id: invitation.id,
                user_id,
                email: invitation.email.clone(),
                resource_id: invitation.target.resource_id(),
                resource_type: invitation.target.kind().as_str().to_string(),
            }),
        )
        .await;

        Ok(invitation)
    }

    /// Decline an invitation by token.
    #[instrument(skip(self, token))]
    pub async fn reject(&self, token: &str, user_id: Uuid) -> Result<Invitation> {
        let mut invitation = self
            .invitations
            .find_by_token(token)
            .await?
            .ok_or(MemberError::InvalidToken)?;

        if !invitation.is_pending() {
            return Err(MemberError::InvalidState {
                status: invitation.status,
            });
        }

        invitation.status = InvitationStatus::Rejected;
        self.invitations.update(&invitation).await?;
        info!(invitation_id = %invitation.id, %user_id, "Invitation rejected");
        Ok(invitation)
    }

    /// Revoke a pending invitation. Only the original inviter may revoke.
    #[instrument(skip(self))]
    pub async fn revoke(&self, invitation_id: Uuid, actor_id: Uuid) -> Result<()> {
        let mut invitation = self
            .invitations
            .find_by_id(invitation_id)
            .await?
            .ok_or_else(|| MemberError::invitation_not_found(invitation_id))?;

        if invitation.invited_by != actor_id {
            return Err(MemberError::NotInviter);
        }
        if !invitation.is_pending() {
            return Err(MemberError::InvalidState {
                status: invitation.status,
            });
        }

        invitation.status = InvitationStatus::Revoked;
        self.invitations.update(&invitation).await?;
        info!(%invitation_id, %actor_id, "Invitation revoked");
        Ok(())
    }

    /// Pending invitations for a resource, with a lazy expiry check: rows
    /// past their expiry are filtered out even before the sweep marks them.
    pub async fn pending_for_target(
        &self,
        kind: TargetKind,
        resource_id: Uuid,
    ) -> Result<Vec<Invitation>> {
        let now = current_timestamp();
        let pending = self
            .invitations
            .list_pending_for_target(kind, resource_id)
            .await?;
        Ok(pending.into_iter().filter(|i| !i.is_expired(now)).collect())
    }

    /// Pending invitations addressed to an email, lazily expiry-filtered.
    pub async fn pending_for_email(&self, email: &str) -> Result<Vec<Invitation>> {
        let now = current_timestamp();
        let pending = self.invitations.list_pending_for_email(email).await?;
        Ok(pending.into_iter().filter(|i| !i.is_expired(now)).collect())
    }

    /// Get an invitation by id.
    pub async fn get(&self, invitation_id: Uuid) -> Result<Option<Invitation>> {
        self.invitations
            .find_by_id(invitation_id)
            .await
            .map_err(Into::into)
    }

    /// Get an invitation by token.
    pub async fn get_by_token(&self, token: &str) -> Result<Option<Invitation>> {
        self.invitations
            .find_by_token(token)
            .await
            .map_err(Into::into)
    }

    /// Transition every pending invitation past its expiry to `Expired`.
    pub async fn sweep_expired(&self) -> Result<u32> {
        let count = self.invitations.sweep_expired(current_timestamp()).await?;
        if count > 0 {
            debug!(count, "Expired invitations swept");
        }
        Ok(count)
    }

    /// Best-effort project membership fan-out: each failure is logged
    /// independently and does not abort the remaining projects.
    async fn fan_out_project_membership(
        &self,
        project_id: Uuid,
        tenant_id: Uuid,
        user_id: Uuid,
        invitation: &Invitation,
    ) {
        match self.members.is_project_member(project_id, user_id).await {
            Ok(true) => return,
            Ok(false) => {}
            Err(err) => {
                warn!(%project_id, %user_id, error = %err, "Could not check project membership");
                return;
            }
        }

        let membership = ProjectMembership {
            project_id,
            tenant_id,
            user_id,
            role: ProjectRole::Member,
            added_by: Some(invitation.invited_by),
            added_at: current_timestamp(),
        };
        match self.members.add_project_member(&membership).await {
            Ok(()) => info!(%project_id, %user_id, "User added to project"),
            Err(err) => {
                warn!(%project_id, %user_id, error = %err, "Could not add user to project");
            }
        }
    }
}

/// Generate a secure random token for invitations.
fn generate_secure_token() -> String {
    use base64::Engine;
    use rand::Rng;

    let mut bytes = [0u8; 32];
    rand::thread_rng().fill(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
