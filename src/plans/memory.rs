//! In-memory plan store.
//!
//! Suitable for development, testing, and single-instance deployments.

use super::catalog::Plan;
use super::storage::PlanStore;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory [`PlanStore`] implementation.
///
/// Cloning shares the same underlying data.
#[derive(Clone, Default)]
pub struct InMemoryPlanStore {
    inner: Arc<RwLock<HashMap<String, Plan>>>,
}

impl InMemoryPlanStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlanStore for InMemoryPlanStore {
    async fn insert(&self, plan: &Plan) -> Result<()> {
        self.inner
            .write()
            .await
            .insert(plan.id.to_uppercase(), plan.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Plan>> {
        Ok(self.inner.read().await.get(&id.to_uppercase()).cloned())
    }

    async fn list(&self) -> Result<Vec<Plan>> {
        Ok(self.inner.read().await.values().cloned().collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.inner.read().await.len() as u64)
    }
}
