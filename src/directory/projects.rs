//! Project lookup seam.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A project as seen by this crate: just enough to validate an invitation
/// attachment and record the owning tenant on a membership.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: Uuid,
    pub name: String,
    pub tenant_id: Uuid,
}

/// Abstraction over the project inventory service.
///
/// `Ok(None)` means the project definitively does not exist; `Err` means the
/// lookup could not be performed. Callers choose fail-open or fail-closed
/// explicitly rather than inheriting a fallback default.
#[async_trait]
pub trait ProjectDirectory: Send + Sync {
    /// Find a project by id.
    async fn find_project(&self, project_id: Uuid) -> Result<Option<ProjectRef>>;
}

/// Fixed in-memory project directory for tests and single-process wiring.
///
/// Cloning shares the same underlying data.
#[derive(Clone, Default)]
pub struct StaticProjects {
    inner: Arc<RwLock<HashMap<Uuid, ProjectRef>>>,
}

impl StaticProjects {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a project.
    pub async fn insert(&self, project: ProjectRef) {
        self.inner.write().await.insert(project.id, project);
    }
}

#[async_trait]
impl ProjectDirectory for StaticProjects {
    async fn find_project(&self, project_id: Uuid) -> Result<Option<ProjectRef>> {
        Ok(self.inner.read().await.get(&project_id).cloned())
    }
}
