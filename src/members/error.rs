//! Membership and invitation error types.

use super::types::InvitationStatus;
use crate::error::MoorageError;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during membership and invitation operations.
#[derive(Debug, Error)]
pub enum MemberError {
    /// Invitation not found.
    #[error("Invitation not found: {invitation_id}")]
    InvitationNotFound {
        /// The invitation ID.
        invitation_id: Uuid,
    },

    /// No invitation matches the presented token.
    #[error("Invalid invitation token")]
    InvalidToken,

    /// The invitation is past its expiry.
    #[error("Invitation has expired")]
    Expired,

    /// The invitation is not pending.
    #[error("Invitation is not pending (status: {status})")]
    InvalidState {
        /// The status it was found in.
        status: InvitationStatus,
    },

    /// Users cannot invite themselves.
    #[error("Cannot invite yourself")]
    SelfInvite,

    /// A pending invitation already exists for this email and resource.
    #[error("User already has a pending invitation to this resource")]
    AlreadyInvited,

    /// The user is already a member.
    #[error("User is already a member")]
    AlreadyMember,

    /// The user is not a member of the tenant.
    #[error("User is not a member of this tenant")]
    NotMember,

    /// The actor lacks the required permission.
    #[error("Insufficient permissions: requires {required} permission")]
    InsufficientPermission {
        /// The required permission.
        required: String,
    },

    /// Only the original inviter may revoke an invitation.
    #[error("Only the inviter can revoke this invitation")]
    NotInviter,

    /// The invited resource does not exist.
    #[error("{kind} not found: {resource_id}")]
    TargetNotFound {
        /// TENANT or PROJECT.
        kind: &'static str,
        /// The resource ID.
        resource_id: Uuid,
    },

    /// A project attached to the invitation does not exist.
    #[error("Project not found: {project_id}")]
    ProjectNotFound {
        /// The missing project.
        project_id: Uuid,
    },

    /// Project attachments are only valid on tenant-level invitations.
    #[error("Project attachments are only allowed on tenant invitations")]
    InvalidProjectList,

    /// The tenant's user cap is full.
    #[error("{message}. {upgrade_hint}")]
    LimitExceeded {
        /// The applicable cap.
        cap: i32,
        /// Usage at the time of the decision.
        current: u32,
        /// Human-readable denial reason.
        message: String,
        /// How to lift the limit.
        upgrade_hint: String,
    },

    /// Too many pending invitations for this resource.
    #[error("Maximum pending invitations reached for this resource ({limit})")]
    MaxPendingReached {
        /// The configured limit.
        limit: u32,
    },

    /// Invalid email format.
    #[error("Invalid email format: {email}")]
    InvalidEmail {
        /// The invalid address.
        email: String,
    },

    /// A required collaborating service could not answer.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(#[from] MoorageError),
}

impl MemberError {
    /// Create an invitation not found error.
    #[must_use]
    pub fn invitation_not_found(invitation_id: Uuid) -> Self {
        Self::InvitationNotFound { invitation_id }
    }

    /// Create an insufficient permission error.
    pub fn insufficient_permission(required: impl Into<String>) -> Self {
        Self::InsufficientPermission {
            required: required.into(),
        }
    }

    /// Create an invalid email error.
    pub fn invalid_email(email: impl Into<String>) -> Self {
        Self::InvalidEmail {
            email: email.into(),
        }
    }

    /// Create a target not found error.
    #[must_use]
    pub fn target_not_found(kind: &'static str, resource_id: Uuid) -> Self {
        Self::TargetNotFound { kind, resource_id }
    }
}

/// Result type for membership and invitation operations.
pub type Result<T> = std::result::Result<T, MemberError>;
