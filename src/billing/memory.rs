//! In-memory billing store.

use super::storage::BillingStore;
use super::types::{BillingSubscription, Payment};
use crate::error::{MoorageError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct State {
    subscriptions: HashMap<Uuid, BillingSubscription>,
    payments: HashMap<Uuid, Payment>,
}

/// In-memory [`BillingStore`] implementation.
///
/// Cloning shares the same underlying data.
#[derive(Clone, Default)]
pub struct InMemoryBillingStore {
    inner: Arc<RwLock<State>>,
}

impl InMemoryBillingStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BillingStore for InMemoryBillingStore {
    async fn create_subscription(&self, subscription: &BillingSubscription) -> Result<()> {
        self.inner
            .write()
            .await
            .subscriptions
            .insert(subscription.id, subscription.clone());
        Ok(())
    }

    async fn find_subscription(&self, id: Uuid) -> Result<Option<BillingSubscription>> {
        Ok(self.inner.read().await.subscriptions.get(&id).cloned())
    }

    async fn find_subscription_for_tenant(
        &self,
        tenant_id: Uuid,
    ) -> Result<Option<BillingSubscription>> {
        Ok(self
            .inner
            .read()
            .await
            .subscriptions
            .values()
            .filter(|s| s.tenant_id == tenant_id)
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn update_subscription(&self, subscription: &BillingSubscription) -> Result<()> {
        let mut state = self.inner.write().await;
        match state.subscriptions.get_mut(&subscription.id) {
            Some(existing) => {
                *existing = subscription.clone();
                Ok(())
            }
            None => Err(MoorageError::not_found(format!(
                "Subscription {} does not exist",
                subscription.id
            ))),
        }
    }

    async fn create_payment(&self, payment: &Payment) -> Result<()> {
        self.inner
            .write()
            .await
            .payments
            .insert(payment.id, payment.clone());
        Ok(())
    }

    async fn find_payment(&self, id: Uuid) -> Result<Option<Payment>> {
        Ok(self.inner.read().await.payments.get(&id).cloned())
    }

    async fn update_payment(&self, payment: &Payment) -> Result<()> {
        let mut state = self.inner.write().await;
        match state.payments.get_mut(&payment.id) {
            Some(existing) => {
                *existing = payment.clone();
                Ok(())
            }
            None => Err(MoorageError::not_found(format!(
                "Payment {} does not exist",
                payment.id
            ))),
        }
    }

    async fn list_payments_for_tenant(&self, tenant_id: Uuid) -> Result<Vec<Payment>> {
        let mut payments: Vec<Payment> = self
            .inner
            .read()
            .await
            .payments
            .values()
            .filter(|p| p.tenant_id == tenant_id)
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(payments)
    }
}
