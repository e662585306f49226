//! Plan storage trait and startup seeding.

use super::catalog::{Plan, PlanCatalog};
use crate::error::Result;
use async_trait::async_trait;
use tracing::info;

/// Trait for plan reference-data storage.
///
/// Plans are written once at startup and read-only afterwards.
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Insert a plan row.
    async fn insert(&self, plan: &Plan) -> Result<()>;

    /// Find a plan by id.
    async fn get(&self, id: &str) -> Result<Option<Plan>>;

    /// List all plans.
    async fn list(&self) -> Result<Vec<Plan>>;

    /// Count stored plans.
    async fn count(&self) -> Result<u64>;
}

/// Seed the built-in plans if the store is empty.
///
/// Returns `true` if the plans were inserted, `false` if the store already
/// held plan rows and was left untouched.
pub async fn seed_default_plans<S: PlanStore>(store: &S) -> Result<bool> {
    if store.count().await? > 0 {
        info!("Plans already present, skipping seed");
        return Ok(false);
    }

    let catalog = PlanCatalog::builtin();
    for plan in catalog.iter() {
        store.insert(plan).await?;
    }
    info!("Seeded default plans: FREE, PROFESSIONAL, ENTERPRISE");
    Ok(true)
}
