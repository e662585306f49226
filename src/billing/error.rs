//! Billing error types.

use super::types::PaymentStatus;
use crate::error::MoorageError;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during billing operations.
#[derive(Debug, Error)]
pub enum BillingError {
    /// Subscription not found.
    #[error("Subscription not found: {subscription_id}")]
    SubscriptionNotFound {
        /// The subscription ID.
        subscription_id: Uuid,
    },

    /// Payment not found.
    #[error("Payment not found: {payment_id}")]
    PaymentNotFound {
        /// The payment ID.
        payment_id: Uuid,
    },

    /// The plan id does not resolve to a catalog entry.
    #[error("Unknown plan: {plan_id}")]
    UnknownPlan {
        /// The unresolved plan id.
        plan_id: String,
    },

    /// The payment is not in a state this transition accepts.
    #[error("Payment is not pending (status: {status:?})")]
    InvalidPaymentState {
        /// The status it was found in.
        status: PaymentStatus,
    },

    /// Storage or downstream error.
    #[error("Storage error: {0}")]
    Storage(#[from] MoorageError),
}

/// Result type for billing operations.
pub type Result<T> = std::result::Result<T, BillingError>;
