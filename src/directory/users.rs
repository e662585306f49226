//! User plan lookup seam.

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Result of a user plan lookup.
///
/// `Unknown` is distinct from any concrete plan: it means the authoritative
/// service could not answer, and the caller decides what policy to apply.
/// Nothing in this crate silently substitutes a default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlanLookup {
    /// The user's plan id, as reported by the owning service.
    Known(String),
    /// The owning service had no answer (user absent, or service degraded
    /// in a way it chose to report as unknown).
    Unknown,
}

impl PlanLookup {
    /// The plan id, if known.
    #[must_use]
    pub fn plan_id(&self) -> Option<&str> {
        match self {
            Self::Known(id) => Some(id),
            Self::Unknown => None,
        }
    }
}

/// Abstraction over the user-management service's plan records.
///
/// `Err` means the lookup itself failed (network, storage); callers may map
/// that to [`PlanLookup::Unknown`] where a degraded answer is acceptable.
#[async_trait]
pub trait UserPlanSource: Send + Sync {
    /// Look up the plan a user is subscribed to.
    async fn user_plan(&self, user_id: Uuid) -> Result<PlanLookup>;
}

/// Fixed in-memory plan assignments for tests and single-process wiring.
///
/// Users without an entry resolve to [`PlanLookup::Unknown`].
#[derive(Clone, Default)]
pub struct StaticUserPlans {
    inner: Arc<RwLock<HashMap<Uuid, String>>>,
}

impl StaticUserPlans {
    /// Create an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a plan to a user.
    pub async fn assign(&self, user_id: Uuid, plan_id: impl Into<String>) {
        self.inner.write().await.insert(user_id, plan_id.into());
    }
}

#[async_trait]
impl UserPlanSource for StaticUserPlans {
    async fn user_plan(&self, user_id: Uuid) -> Result<PlanLookup> {
        Ok(match self.inner.read().await.get(&user_id) {
            Some(plan) => PlanLookup::Known(plan.clone()),
            None => PlanLookup::Unknown,
        })
    }
}
