//! Moorage - multi-tenant plan, quota, and membership engine
//!
//! Moorage implements the business core of a multi-tenant SaaS backend:
//! a plan catalog, a tenant quota/plan engine with atomic resource
//! counters, tenant and project memberships with a full invitation
//! workflow, billing subscription/payment records, and best-effort domain
//! events.
//!
//! # Features
//!
//! - **Plans**: a single source-of-truth catalog of pricing tiers and caps
//! - **Tenants**: limit validation and plan transitions, with the
//!   check-then-increment race closed by an atomic conditional reserve
//! - **Members**: invitations (invite/accept/reject/revoke/sweep) and
//!   role-based memberships
//! - **Billing**: payment settlement driving the tenant plan transition
//! - **Events**: fire-and-forget notifications to other bounded contexts
//! - **Storage traits**: bring your own persistence; in-memory
//!   implementations are included for development and testing
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use moorage::members::{InMemoryMemberStore, InvitationConfig, InvitationManager};
//! use moorage::tenants::{InMemoryTenantStore, TenantManager};
//! use moorage::plans::PlanCatalog;
//! use moorage::directory::{StaticProjects, StaticUserPlans};
//! use moorage::events::TracingEventPublisher;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     moorage::init_tracing();
//!
//!     let members = InMemoryMemberStore::new();
//!     let tenants = TenantManager::new(
//!         InMemoryTenantStore::new(),
//!         PlanCatalog::builtin(),
//!         StaticUserPlans::new(),
//!         members.clone(),
//!         TracingEventPublisher::new(),
//!     );
//!     let invitations = InvitationManager::new(
//!         members.clone(),
//!         members,
//!         tenants.clone(),
//!         StaticProjects::new(),
//!         TracingEventPublisher::new(),
//!         InvitationConfig::default(),
//!     );
//!
//!     // ...create tenants, invite members, accept invitations
//!     let _ = (tenants, invitations);
//! }
//! ```

pub mod billing;
pub mod directory;
mod error;
pub mod events;
pub mod members;
pub mod plans;
pub mod tenants;
mod util;

// Re-exports for the public API
pub use billing::{BillingError, BillingManager, Currency};
pub use error::{MoorageError, Result};
pub use events::{
    Event, EventPublisher, NullEventPublisher, RecordingEventPublisher, TracingEventPublisher,
};
pub use members::{
    InvitationConfig, InvitationManager, InviteRequest, MemberError, MembershipManager,
};
pub use plans::{Plan, PlanCaps, PlanCatalog, ResourceKind, UNLIMITED};
pub use tenants::{
    LimitDecision, NewTenant, Tenant, TenantError, TenantManager, TenantStatus, TenantUpdate,
};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging with sensible defaults
///
/// This should be called early in your application, typically in main().
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "info", "debug", "moorage=debug")
/// - `MOORAGE_LOG_JSON`: Set to "true" for JSON formatted logs
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = std::env::var("MOORAGE_LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
