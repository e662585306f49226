//! Billing manager.
//!
//! Owns subscription and payment records. A successful payment is the
//! trigger that applies the purchased plan to the tenant.

use super::error::{BillingError, Result};
use super::storage::BillingStore;
use super::types::{
    BillingSubscription, Currency, Payment, PaymentStatus, SubscriptionStatus,
};
use crate::directory::TenantProvisioner;
use crate::events::{publish_best_effort, Event, EventPublisher, PaymentSucceeded};
use crate::plans::PlanCatalog;
use crate::util::current_timestamp;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Billing manager.
///
/// # Example
///
/// ```rust,ignore
/// use moorage::billing::{BillingManager, Currency};
///
/// let billing = BillingManager::new(store, PlanCatalog::builtin(), tenant_manager, events);
///
/// let (subscription, payment) = billing
///     .start_subscription(tenant_id, "PROFESSIONAL", Currency::Usd)
///     .await?;
///
/// // ...the payment provider settles...
/// billing.record_payment_succeeded(payment.id).await?;
/// ```
#[derive(Clone)]
pub struct BillingManager<B, T, E>
where
    B: BillingStore,
    T: TenantProvisioner,
    E: EventPublisher,
{
    store: B,
    plans: PlanCatalog,
    tenants: T,
    events: E,
}

impl<B, T, E> BillingManager<B, T, E>
where
    B: BillingStore,
    T: TenantProvisioner,
    E: EventPublisher,
{
    /// Create a new billing manager.
    pub fn new(store: B, plans: PlanCatalog, tenants: T, events: E) -> Self {
        Self {
            store,
            plans,
            tenants,
            events,
        }
    }

    /// Open a subscription for a tenant on a plan, priced from the catalog,
    /// with its first pending payment.
    #[instrument(skip(self))]
    pub async fn start_subscription(
        &self,
        tenant_id: Uuid,
        plan_id: &str,
        currency: Currency,
    ) -> Result<(BillingSubscription, Payment)> {
        let plan = self
            .plans
            .get(plan_id)
            .ok_or_else(|| BillingError::UnknownPlan {
                plan_id: plan_id.to_string(),
            })?;

        let price = match currency {
            Currency::Usd => plan.monthly_price_usd_cents,
            Currency::Cop => plan.monthly_price_cop_cents,
        };

        let now = current_timestamp();
        let subscription = BillingSubscription {
            id: Uuid::new_v4(),
            tenant_id,
            plan_id: plan.id.clone(),
            status: SubscriptionStatus::Pending,
            currency,
            monthly_price_cents: price,
            created_at: now,
            updated_at: now,
            activated_at: None,
        };
        let payment = Payment {
            id: Uuid::new_v4(),
            subscription_id: subscription.id,
            tenant_id,
            plan_id: plan.id.clone(),
            amount_cents: price,
            currency,
            status: PaymentStatus::Pending,
            created_at: now,
            paid_at: None,
        };

        self.store.create_subscription(&subscription).await?;
        self.store.create_payment(&payment).await?;
        info!(
            subscription_id = %subscription.id,
            payment_id = %payment.id,
            plan_id = %subscription.plan_id,
            "Subscription opened"
        );

        Ok((subscription, payment))
    }

    /// Record a settled payment.
    ///
    /// Marks the payment and its subscription, then applies the plan to the
    /// tenant. The plan application is the point of the whole flow, so its
    /// failure propagates; the settlement event is best-effort.
    #[instrument(skip(self))]
    pub async fn record_payment_succeeded(&self, payment_id: Uuid) -> Result<Payment> {
        let mut payment = self
            .store
            .find_payment(payment_id)
            .await?
            .ok_or(BillingError::PaymentNotFound { payment_id })?;

        if payment.status != PaymentStatus::Pending {
            return Err(BillingError::InvalidPaymentState {
                status: payment.status,
            });
        }

        let now = current_timestamp();
        payment.status = PaymentStatus::Succeeded;
        payment.paid_at = Some(now);
        self.store.update_payment(&payment).await?;

        let mut subscription = self
            .store
            .find_subscription(payment.subscription_id)
            .await?
            .ok_or(BillingError::SubscriptionNotFound {
                subscription_id: payment.subscription_id,
            })?;
        subscription.status = SubscriptionStatus::Active;
        subscription.activated_at = Some(now);
        subscription.updated_at = now;
        self.store.update_subscription(&subscription).await?;

        self.tenants
            .upgrade_plan(payment.tenant_id, &payment.plan_id, subscription.id)
            .await?;

        info!(
            %payment_id,
            tenant_id = %payment.tenant_id,
            plan_id = %payment.plan_id,
            "Payment succeeded, plan applied"
        );

        publish_best_effort(
            &self.events,
            Event::PaymentSucceeded(PaymentSucceeded {
                event_id: Uuid::new_v4(),
                occurred_at: now,
                payment_id,
                subscription_id: subscription.id,
                tenant_id: payment.tenant_id,
                plan_id: payment.plan_id.clone(),
                amount_cents: payment.amount_cents,
                currency: payment.currency.to_string(),
            }),
        )
        .await;

        Ok(payment)
    }

    /// Record a failed payment: the payment fails, the subscription goes
    /// past due. The tenant keeps whatever caps it had.
    #[instrument(skip(self))]
    pub async fn record_payment_failed(&self, payment_id: Uuid) -> Result<Payment> {
        let mut payment = self
            .store
            .find_payment(payment_id)
            .await?
            .ok_or(BillingError::PaymentNotFound { payment_id })?;

        if payment.status != PaymentStatus::Pending {
            return Err(BillingError::InvalidPaymentState {
                status: payment.status,
            });
        }

        payment.status = PaymentStatus::Failed;
        self.store.update_payment(&payment).await?;

        if let Some(mut subscription) = self
            .store
            .find_subscription(payment.subscription_id)
            .await?
        {
            subscription.status = SubscriptionStatus::PastDue;
            subscription.updated_at = current_timestamp();
            self.store.update_subscription(&subscription).await?;
        }

        warn!(%payment_id, tenant_id = %payment.tenant_id, "Payment failed");
        Ok(payment)
    }

    /// The most recent subscription for a tenant.
    pub async fn subscription_for_tenant(
        &self,
        tenant_id: Uuid,
    ) -> Result<Option<BillingSubscription>> {
        self.store
            .find_subscription_for_tenant(tenant_id)
            .await
            .map_err(Into::into)
    }

    /// Payment history for a tenant, most recent first.
    pub async fn payment_history(&self, tenant_id: Uuid) -> Result<Vec<Payment>> {
        self.store
            .list_payments_for_tenant(tenant_id)
            .await
            .map_err(Into::into)
    }
}
