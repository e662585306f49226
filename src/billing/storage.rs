//! Storage trait for billing data.

use super::types::{BillingSubscription, Payment};
use crate::error::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Trait for storing subscriptions and payments.
#[async_trait]
pub trait BillingStore: Send + Sync {
    /// Persist a new subscription.
    async fn create_subscription(&self, subscription: &BillingSubscription) -> Result<()>;

    /// Find a subscription by id.
    async fn find_subscription(&self, id: Uuid) -> Result<Option<BillingSubscription>>;

    /// Find the most recent subscription for a tenant.
    async fn find_subscription_for_tenant(
        &self,
        tenant_id: Uuid,
    ) -> Result<Option<BillingSubscription>>;

    /// Persist changes to an existing subscription.
    async fn update_subscription(&self, subscription: &BillingSubscription) -> Result<()>;

    /// Persist a new payment.
    async fn create_payment(&self, payment: &Payment) -> Result<()>;

    /// Find a payment by id.
    async fn find_payment(&self, id: Uuid) -> Result<Option<Payment>>;

    /// Persist changes to an existing payment.
    async fn update_payment(&self, payment: &Payment) -> Result<()>;

    /// Payment history for a tenant, most recent first.
    async fn list_payments_for_tenant(&self, tenant_id: Uuid) -> Result<Vec<Payment>>;
}
