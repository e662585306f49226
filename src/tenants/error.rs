//! Tenant error types.

use crate::error::MoorageError;
use crate::plans::ResourceKind;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during tenant operations.
#[derive(Debug, Error)]
pub enum TenantError {
    /// Tenant not found.
    #[error("Tenant not found: {tenant_id}")]
    NotFound {
        /// The ID that was not found.
        tenant_id: Uuid,
    },

    /// Tenant name missing or empty.
    #[error("Tenant name must not be empty")]
    EmptyName,

    /// Business tenants require a business name and NIT.
    #[error("Business name and NIT are required for business tenants")]
    MissingBusinessFields,

    /// NIT failed format or check-digit validation.
    #[error("Invalid NIT: {reason}")]
    InvalidNit {
        /// What was wrong with it.
        reason: String,
    },

    /// NIT is already registered to another tenant.
    #[error("NIT already registered: {nit}")]
    NitTaken {
        /// The duplicate NIT.
        nit: String,
    },

    /// Free-plan users cannot create workspaces.
    #[error("Free plan users cannot create workspaces. Upgrade to a paid plan to create your own workspace")]
    PlanUpgradeRequired,

    /// The user has reached their plan's workspace allowance.
    #[error("Workspace limit reached ({current}/{cap}). Upgrade your plan to create more workspaces")]
    TenantLimitReached {
        /// Maximum workspaces the plan allows.
        cap: i32,
        /// Workspaces currently owned.
        current: u32,
    },

    /// A resource cap was hit.
    #[error("{kind} limit reached ({current}/{cap}). {upgrade_hint}")]
    LimitExceeded {
        /// The constrained resource.
        kind: ResourceKind,
        /// The applicable cap.
        cap: i32,
        /// Usage at the time of the decision.
        current: u32,
        /// How to lift the limit.
        upgrade_hint: String,
    },

    /// Only the tenant owner may perform this action.
    #[error("Only the tenant owner can perform this action")]
    NotOwner,

    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(#[from] MoorageError),
}

impl TenantError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(tenant_id: Uuid) -> Self {
        Self::NotFound { tenant_id }
    }

    /// Create an invalid NIT error.
    pub fn invalid_nit(reason: impl Into<String>) -> Self {
        Self::InvalidNit {
            reason: reason.into(),
        }
    }

    /// Create a NIT taken error.
    pub fn nit_taken(nit: impl Into<String>) -> Self {
        Self::NitTaken { nit: nit.into() }
    }
}

impl From<TenantError> for MoorageError {
    fn from(err: TenantError) -> Self {
        match err {
            TenantError::NotFound { .. } => MoorageError::NotFound(err.to_string()),
            TenantError::NitTaken { .. }
            | TenantError::LimitExceeded { .. }
            | TenantError::TenantLimitReached { .. } => MoorageError::Conflict(err.to_string()),
            TenantError::NotOwner | TenantError::PlanUpgradeRequired => {
                MoorageError::Forbidden(err.to_string())
            }
            TenantError::Storage(inner) => inner,
            _ => MoorageError::Internal(err.to_string()),
        }
    }
}

/// Result type for tenant operations.
pub type Result<T> = std::result::Result<T, TenantError>;
