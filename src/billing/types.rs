//! Billing types: subscriptions and payments.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Settlement currency for a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Cop,
}

impl Currency {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Cop => "COP",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a billing subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    /// Created, waiting for the first payment.
    Pending,
    Active,
    /// A payment failed; the subscription is in grace.
    PastDue,
    Cancelled,
}

impl SubscriptionStatus {
    /// Check if the subscription is currently active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// A subscription linking a tenant to a plan.
///
/// Independent of the tenant record; the tenant mirrors the status and plan
/// when a payment succeeds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BillingSubscription {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub plan_id: String,
    pub status: SubscriptionStatus,
    pub currency: Currency,
    /// Monthly price in minor units of `currency`.
    pub monthly_price_cents: u64,
    pub created_at: u64,
    pub updated_at: u64,
    /// When the subscription became active, if it has.
    pub activated_at: Option<u64>,
}

/// Status of a payment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Failed,
    Refunded,
}

/// A single payment against a subscription.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub subscription_id: Uuid,
    pub tenant_id: Uuid,
    pub plan_id: String,
    /// Amount in minor units of `currency`.
    pub amount_cents: u64,
    pub currency: Currency,
    pub status: PaymentStatus,
    pub created_at: u64,
    /// When the payment settled, if it did.
    pub paid_at: Option<u64>,
}
