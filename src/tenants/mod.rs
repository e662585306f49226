//! Tenants: the quota/plan engine.
//!
//! A tenant is a billing/workspace boundary owning projects, domains,
//! repos, and members. Its caps mirror the assigned plan; its usage
//! counters are denormalized for fast validation and mutated only through
//! the store's atomic reserve/release operations, so a limit check and its
//! increment can never race.

mod error;
mod limits;
mod manager;
pub mod memory;
mod storage;
mod types;

pub use error::TenantError;
pub use limits::check_limit;
pub use manager::{NewTenant, TenantManager, TenantUpdate};
pub use memory::InMemoryTenantStore;
pub use storage::{ReserveOutcome, TenantStore};
pub use types::{
    LimitDecision, ResourceUsage, SubscriptionState, Tenant, TenantKind, TenantStatus,
};

// The resource dimensions live with the plan catalog; re-exported here for
// callers working at the tenant level.
pub use crate::plans::ResourceKind;
