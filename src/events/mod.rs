//! Best-effort domain events.
//!
//! Every state change other bounded contexts care about is announced here:
//! tenant creation, plan upgrades, invitations, payments. Publication is
//! fire-and-forget: the primary operation never fails because an event
//! could not be delivered, and no ordering, idempotency, or exactly-once
//! semantics are provided.

mod publisher;
mod types;

pub use publisher::{
    publish_best_effort, EventPublisher, NullEventPublisher, RecordingEventPublisher,
    TracingEventPublisher,
};
pub use types::{
    Event, InvitationAccepted, PaymentSucceeded, TenantCreated, TenantPlanUpgraded, UserInvited,
};
