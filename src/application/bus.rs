// Publish/subscribe bus abstraction
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Callback invoked by the bus for every message on a subscribed topic.
/// Receives the message's named fields.
pub type PacketHandler = Arc<dyn Fn(Value) + Send + Sync>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    #[error("subscription to {topic} rejected: {reason}")]
    Rejected { topic: String, reason: String },
    #[error("subscription to {0} is not active")]
    UnknownSubscription(String),
    #[error("bus transport failure: {0}")]
    Transport(String),
}

#[async_trait]
pub trait PubSubBus: Send + Sync {
    /// Register `handler` for every message published on `topic`
    async fn subscribe(
        &self,
        topic: &str,
        handler: PacketHandler,
    ) -> Result<Box<dyn Subscription>, BusError>;
}

#[async_trait]
pub trait Subscription: Send + Sync {
    fn topic(&self) -> &str;

    /// Stop message delivery for this subscription
    async fn unsubscribe(self: Box<Self>) -> Result<(), BusError>;
}
