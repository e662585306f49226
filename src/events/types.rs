//! Domain event types.
//!
//! Events are best-effort notifications to other bounded contexts. The
//! variant names double as routing keys; payloads are plain JSON with no
//! schema versioning, and no ordering or delivery guarantees are made.

use crate::util::current_timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A domain event, tagged with its routing key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum Event {
    #[serde(rename = "tenant.created")]
    TenantCreated(TenantCreated),
    #[serde(rename = "tenant.plan.upgraded")]
    TenantPlanUpgraded(TenantPlanUpgraded),
    #[serde(rename = "user.invited")]
    UserInvited(UserInvited),
    #[serde(rename = "user.invitation.accepted")]
    InvitationAccepted(InvitationAccepted),
    #[serde(rename = "payment.succeeded")]
    PaymentSucceeded(PaymentSucceeded),
}

impl Event {
    /// The routing key this event is published under.
    #[must_use]
    pub fn routing_key(&self) -> &'static str {
        match self {
            Self::TenantCreated(_) => "tenant.created",
            Self::TenantPlanUpgraded(_) => "tenant.plan.upgraded",
            Self::UserInvited(_) => "user.invited",
            Self::InvitationAccepted(_) => "user.invitation.accepted",
            Self::PaymentSucceeded(_) => "payment.succeeded",
        }
    }

    /// The unique id assigned when the event was built.
    #[must_use]
    pub fn event_id(&self) -> Uuid {
        match self {
            Self::TenantCreated(e) => e.event_id,
            Self::TenantPlanUpgraded(e) => e.event_id,
            Self::UserInvited(e) => e.event_id,
            Self::InvitationAccepted(e) => e.event_id,
            Self::PaymentSucceeded(e) => e.event_id,
        }
    }
}

/// A tenant was created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TenantCreated {
    pub event_id: Uuid,
    pub occurred_at: u64,
    pub tenant_id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub slug: String,
}

impl TenantCreated {
    #[must_use]
    pub fn new(tenant_id: Uuid, owner_id: Uuid, name: String, slug: String) -> Event {
        Event::TenantCreated(Self {
            event_id: Uuid::new_v4(),
            occurred_at: current_timestamp(),
            tenant_id,
            owner_id,
            name,
            slug,
        })
    }
}

/// A tenant's plan changed after a successful purchase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TenantPlanUpgraded {
    pub event_id: Uuid,
    pub occurred_at: u64,
    pub tenant_id: Uuid,
    pub plan_id: String,
    pub subscription_id: Uuid,
}

impl TenantPlanUpgraded {
    #[must_use]
    pub fn new(tenant_id: Uuid, plan_id: String, subscription_id: Uuid) -> Event {
        Event::TenantPlanUpgraded(Self {
            event_id: Uuid::new_v4(),
            occurred_at: current_timestamp(),
            tenant_id,
            plan_id,
            subscription_id,
        })
    }
}

/// An invitation was created; consumed by the notification context.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserInvited {
    pub event_id: Uuid,
    pub occurred_at: u64,
    pub invitation_id: Uuid,
    pub email: String,
    pub resource_id: Uuid,
    pub resource_name: String,
    pub resource_type: String,
    pub inviter_email: String,
    pub token: String,
    pub expires_at: u64,
}

/// An invitation was accepted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InvitationAccepted {
    pub event_id: Uuid,
    pub occurred_at: u64,
    pub invitation_id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub resource_id: Uuid,
    pub resource_type: String,
}

/// A payment settled successfully.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentSucceeded {
    pub event_id: Uuid,
    pub occurred_at: u64,
    pub payment_id: Uuid,
    pub subscription_id: Uuid,
    pub tenant_id: Uuid,
    pub plan_id: String,
    pub amount_cents: u64,
    pub currency: String,
}
