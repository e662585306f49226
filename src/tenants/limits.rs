//! Pure limit validation.
//!
//! No side effects: the caller is responsible for any subsequent counter
//! mutation, and the mutation path must use the store's atomic reserve
//! rather than trusting a prior check.

use super::types::LimitDecision;
use crate::plans::{PlanCaps, ResourceKind, UNLIMITED};

/// Validate a proposed resource count against a cap set.
///
/// An unlimited cap always allows. Otherwise the proposal is allowed iff
/// `proposed <= cap` (equivalently, `current < cap` before an increment).
/// Denials carry a resource-specific message and upgrade hint.
#[must_use]
pub fn check_limit(
    caps: &PlanCaps,
    kind: ResourceKind,
    current: u32,
    proposed: u32,
) -> LimitDecision {
    let cap = caps.cap(kind);
    if cap == UNLIMITED {
        return LimitDecision::allowed(cap, current);
    }

    if i64::from(proposed) <= i64::from(cap) {
        return LimitDecision::allowed(cap, current);
    }

    let (message, hint) = denial_text(kind);
    LimitDecision::denied(cap, current, message, hint)
}

/// Denial message and upgrade hint for a resource kind.
pub(crate) fn denial_text(kind: ResourceKind) -> (&'static str, &'static str) {
    match kind {
        ResourceKind::Project => (
            "Project limit reached",
            "Upgrade your plan to create more projects",
        ),
        ResourceKind::Domain => (
            "Domain limit reached",
            "Upgrade to the Professional plan to add more domains",
        ),
        ResourceKind::Repo => (
            "Repository limit reached",
            "Upgrade your plan to add repositories",
        ),
        ResourceKind::User => (
            "User limit reached",
            "Upgrade your plan to invite more users",
        ),
    }
}
