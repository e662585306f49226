//! Pricing plans and resource caps.
//!
//! Plans are immutable reference data: a named tier with monthly prices in
//! two currencies, per-tenant resource caps, a per-user workspace allowance,
//! and feature flags. The [`PlanCatalog`] is the single source of truth
//! consumed by both the limit validator and the plan transition path.

mod catalog;
pub mod memory;
mod storage;

pub use catalog::{
    Plan, PlanCaps, PlanCatalog, ParseResourceKindError, ResourceKind, UNLIMITED,
};
pub use memory::InMemoryPlanStore;
pub use storage::{seed_default_plans, PlanStore};
