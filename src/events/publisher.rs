//! Event publisher trait and backends.
//!
//! Publishing is fire-and-forget: callers hand the event off and move on.
//! [`publish_best_effort`] is the canonical call site; a failed publish is
//! logged and swallowed, never propagated into the primary operation.

use super::types::Event;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Abstraction over the message broker client.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Hand an event to the broker.
    ///
    /// Returning `Ok` means the broker client accepted the message, nothing
    /// stronger.
    async fn publish(&self, event: &Event) -> Result<()>;
}

/// Publish an event, logging and swallowing any failure.
pub async fn publish_best_effort<E: EventPublisher + ?Sized>(publisher: &E, event: Event) {
    if let Err(err) = publisher.publish(&event).await {
        warn!(
            routing_key = event.routing_key(),
            error = %err,
            "Failed to publish event"
        );
    }
}

/// Publisher that drops every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullEventPublisher;

impl NullEventPublisher {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventPublisher for NullEventPublisher {
    async fn publish(&self, _event: &Event) -> Result<()> {
        Ok(())
    }
}

/// Publisher that logs each event instead of sending it anywhere.
///
/// Useful in development, the way a console mailer stands in for SMTP.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingEventPublisher;

impl TracingEventPublisher {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventPublisher for TracingEventPublisher {
    async fn publish(&self, event: &Event) -> Result<()> {
        let payload = serde_json::to_string(event)?;
        info!(routing_key = event.routing_key(), %payload, "Event published");
        Ok(())
    }
}

/// Publisher that records events in memory for assertions.
///
/// Cloning shares the same underlying buffer.
#[derive(Clone, Default)]
pub struct RecordingEventPublisher {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingEventPublisher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All events recorded so far.
    #[must_use]
    pub fn recorded(&self) -> Vec<Event> {
        self.events.lock().expect("event buffer poisoned").clone()
    }

    /// Routing keys of all recorded events, in publish order.
    #[must_use]
    pub fn routing_keys(&self) -> Vec<&'static str> {
        self.recorded().iter().map(Event::routing_key).collect()
    }
}

#[async_trait]
impl EventPublisher for RecordingEventPublisher {
    async fn publish(&self, event: &Event) -> Result<()> {
        self.events
            .lock()
            .expect("event buffer poisoned")
            .push(event.clone());
        Ok(())
    }
}
