//! Tenant types.

use crate::plans::{PlanCaps, ResourceKind, UNLIMITED};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lifecycle status of a tenant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TenantStatus {
    #[default]
    Active,
    Suspended,
    Deleted,
}

impl TenantStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Suspended => "SUSPENDED",
            Self::Deleted => "DELETED",
        }
    }
}

impl fmt::Display for TenantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Subscription state mirrored onto the tenant from billing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubscriptionState {
    /// No subscription purchased yet.
    #[default]
    Pending,
    Active,
    Suspended,
    Cancelled,
}

impl SubscriptionState {
    /// Check if the subscription is currently active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Whether a tenant is a personal workspace or a registered business.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TenantKind {
    #[default]
    Personal,
    /// Requires a business name and a valid NIT.
    Business,
}

/// Current resource usage counters, denormalized onto the tenant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceUsage {
    pub users: u32,
    pub projects: u32,
    pub domains: u32,
    pub repos: u32,
}

impl ResourceUsage {
    /// Get the current count for a resource kind.
    #[must_use]
    pub fn get(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::User => self.users,
            ResourceKind::Project => self.projects,
            ResourceKind::Domain => self.domains,
            ResourceKind::Repo => self.repos,
        }
    }

    /// Increment the counter for a resource kind, returning the new count.
    pub fn increment(&mut self, kind: ResourceKind) -> u32 {
        let slot = self.slot_mut(kind);
        *slot = slot.saturating_add(1);
        *slot
    }

    /// Decrement the counter for a resource kind with a floor of zero,
    /// returning the new count.
    pub fn decrement(&mut self, kind: ResourceKind) -> u32 {
        let slot = self.slot_mut(kind);
        *slot = slot.saturating_sub(1);
        *slot
    }

    fn slot_mut(&mut self, kind: ResourceKind) -> &mut u32 {
        match kind {
            ResourceKind::User => &mut self.users,
            ResourceKind::Project => &mut self.projects,
            ResourceKind::Domain => &mut self.domains,
            ResourceKind::Repo => &mut self.repos,
        }
    }
}

/// A tenant: a billing/workspace boundary owning projects, domains, repos,
/// and members.
///
/// Caps are mirrored from the assigned plan when a subscription activates;
/// until then a new tenant carries the minimal defaults from
/// [`Tenant::new_tenant_caps`]. Usage counters are mutated only through the
/// store's atomic reserve/release operations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    /// URL-safe unique identifier.
    pub slug: String,
    pub kind: TenantKind,
    pub owner_id: Uuid,
    pub owner_email: String,
    /// Registered business name (business tenants only).
    pub business_name: Option<String>,
    /// Tax identification number (business tenants only).
    pub nit: Option<String>,
    /// Plan id from billing; `None` until a subscription is purchased.
    pub plan_id: Option<String>,
    pub subscription_state: SubscriptionState,
    pub status: TenantStatus,
    pub caps: PlanCaps,
    pub blockchain_enabled: bool,
    pub usage: ResourceUsage,
    pub subscription_id: Option<Uuid>,
    pub created_at: u64,
    pub updated_at: u64,
}

impl Tenant {
    /// Default caps for a tenant without a subscription: a single seat and a
    /// handful of projects to get started, nothing else.
    #[must_use]
    pub const fn new_tenant_caps() -> PlanCaps {
        PlanCaps::new(1, 5, 0, 0)
    }
}

/// Outcome of a limit validation.
///
/// Pure data; the caller owns any subsequent mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitDecision {
    pub allowed: bool,
    /// The applicable cap ([`UNLIMITED`] = no limit).
    pub cap: i32,
    /// The current usage count the decision was made against.
    pub current: u32,
    /// Human-readable denial reason.
    pub message: Option<String>,
    /// Suggestion for how to lift the limit.
    pub upgrade_hint: Option<String>,
}

impl LimitDecision {
    /// Build an allow decision.
    #[must_use]
    pub fn allowed(cap: i32, current: u32) -> Self {
        Self {
            allowed: true,
            cap,
            current,
            message: None,
            upgrade_hint: None,
        }
    }

    /// Build a deny decision with a reason and upgrade hint.
    #[must_use]
    pub fn denied(
        cap: i32,
        current: u32,
        message: impl Into<String>,
        upgrade_hint: impl Into<String>,
    ) -> Self {
        Self {
            allowed: false,
            cap,
            current,
            message: Some(message.into()),
            upgrade_hint: Some(upgrade_hint.into()),
        }
    }

    /// Check whether the decision applies to an unlimited cap.
    #[must_use]
    pub fn is_unlimited(&self) -> bool {
        self.cap == UNLIMITED
    }
}
