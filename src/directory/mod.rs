//! Seams to the collaborating services this core consumes or exposes.
//!
//! Each trait abstracts one collaborator contract: project inventory, user
//! plan records, and the tenant quota operations. Lookup results distinguish
//! "definitively absent" (`Ok(None)`) from "could not answer" (`Err` /
//! [`PlanLookup::Unknown`]) so every caller picks fail-open or fail-closed
//! deliberately.

mod projects;
mod tenants;
mod users;

pub use projects::{ProjectDirectory, ProjectRef, StaticProjects};
pub use tenants::{MembershipDirectory, TenantGateway, TenantProvisioner, TenantSummary};
pub use users::{PlanLookup, StaticUserPlans, UserPlanSource};
