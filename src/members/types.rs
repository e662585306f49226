//! Membership and invitation types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Role of a user within a tenant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantRole {
    /// Can manage members and settings.
    Admin,
    /// Regular member.
    #[default]
    Member,
}

impl TenantRole {
    /// Get the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }

    /// Check if this role can manage tenant members.
    ///
    /// This includes inviting, removing, and changing roles of members.
    #[must_use]
    pub fn can_manage_members(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for TenantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing a role string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError {
    invalid_value: String,
}

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid role: '{}' (expected: admin or member)",
            self.invalid_value
        )
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for TenantRole {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            _ => Err(ParseRoleError {
                invalid_value: s.to_string(),
            }),
        }
    }
}

/// Role of a user within a project.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectRole {
    Admin,
    #[default]
    Member,
}

impl ProjectRole {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }
}

impl fmt::Display for ProjectRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProjectRole {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            _ => Err(ParseRoleError {
                invalid_value: s.to_string(),
            }),
        }
    }
}

/// The persisted fact that a user belongs to a tenant with a role.
///
/// Composite-unique on (tenant, user).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TenantMembership {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub role: TenantRole,
    /// Who invited this member, when membership came from an invitation.
    pub invited_by: Option<Uuid>,
    pub member_email: String,
    pub joined_at: u64,
}

/// The persisted fact that a user belongs to a project with a role.
///
/// Composite-unique on (project, user).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectMembership {
    pub project_id: Uuid,
    /// The tenant the project belongs to.
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub role: ProjectRole,
    pub added_by: Option<Uuid>,
    pub added_at: u64,
}

/// Which resource an invitation grants access to, and with what role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum InvitationTarget {
    Tenant { tenant_id: Uuid, role: TenantRole },
    Project { project_id: Uuid, role: ProjectRole },
}

impl InvitationTarget {
    /// The kind of resource this invitation targets.
    #[must_use]
    pub fn kind(&self) -> TargetKind {
        match self {
            Self::Tenant { .. } => TargetKind::Tenant,
            Self::Project { .. } => TargetKind::Project,
        }
    }

    /// The id of the targeted resource.
    #[must_use]
    pub fn resource_id(&self) -> Uuid {
        match self {
            Self::Tenant { tenant_id, .. } => *tenant_id,
            Self::Project { project_id, .. } => *project_id,
        }
    }
}

/// Resource kind an invitation can target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TargetKind {
    Tenant,
    Project,
}

impl TargetKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tenant => "TENANT",
            Self::Project => "PROJECT",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of an invitation.
///
/// `Pending` transitions to exactly one terminal state; there are no
/// further transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Rejected,
    Revoked,
    Expired,
}

impl InvitationStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
            Self::Revoked => "REVOKED",
            Self::Expired => "EXPIRED",
        }
    }
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single-use, time-limited offer for a user to join a tenant or project.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Invitation {
    pub id: Uuid,
    /// Invitee email address.
    pub email: String,
    /// Secret token for accepting the invitation.
    pub token: String,
    pub target: InvitationTarget,
    /// Display name of the targeted resource, for notifications.
    pub resource_name: String,
    /// Projects a tenant-level invite additionally grants access to.
    pub project_ids: Vec<Uuid>,
    pub status: InvitationStatus,
    pub invited_by: Uuid,
    pub inviter_email: String,
    pub expires_at: u64,
    pub accepted_at: Option<u64>,
    pub created_at: u64,
}

impl Invitation {
    /// Check whether the invitation is still pending.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == InvitationStatus::Pending
    }

    /// Check whether the invitation is past its expiry.
    ///
    /// Independent of the stored status: a `Pending` row past its expiry is
    /// already unusable even before the sweep marks it `Expired`.
    #[must_use]
    pub fn is_expired(&self, now: u64) -> bool {
        now > self.expires_at
    }
}
