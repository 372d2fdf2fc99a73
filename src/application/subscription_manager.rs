// Subscription manager - one bus subscription per active polarimeter channel
use crate::application::bus::{BusError, PacketHandler, PubSubBus, Subscription};
use crate::infrastructure::config::expand_template;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::task::JoinHandle;

type PendingSubscription = JoinHandle<Result<Box<dyn Subscription>, BusError>>;

/// Outcome of releasing one channel's subscription. Cloneable so both the
/// caller and a later re-subscribe can wait on it.
pub type PendingRelease = Shared<BoxFuture<'static, Result<(), BusError>>>;

pub struct SubscriptionManager {
    bus: Arc<dyn PubSubBus>,
    topic_template: String,
    handler: PacketHandler,
    channels: BTreeMap<String, PendingSubscription>,
    /// Releases still in flight, by channel
    releasing: BTreeMap<String, PendingRelease>,
}

impl SubscriptionManager {
    pub fn new(bus: Arc<dyn PubSubBus>, topic_template: String, handler: PacketHandler) -> Self {
        Self {
            bus,
            topic_template,
            handler,
            channels: BTreeMap::new(),
            releasing: BTreeMap::new(),
        }
    }

    pub fn topic_for(&self, channel: &str) -> String {
        let vars = HashMap::from([("pol".to_string(), channel.to_string())]);
        expand_template(&self.topic_template, &vars)
    }

    /// Issue a subscribe for `channel` unless one is already tracked.
    /// The request completes in the background, after any release of the
    /// channel's previous subscription; the channel counts as active from
    /// here on.
    pub fn activate(&mut self, channel: &str) -> bool {
        if self.channels.contains_key(channel) {
            return false;
        }

        let bus = self.bus.clone();
        let handler = self.handler.clone();
        let topic = self.topic_for(channel);
        let previous = self.releasing.remove(channel);
        tracing::info!(
            channel,
            topic = %topic,
            pending_release = previous.is_some(),
            "subscribing"
        );

        let pending = tokio::spawn(async move {
            if let Some(previous) = previous {
                // The old subscription must be gone before the new one exists
                let _ = previous.await;
            }
            let result = bus.subscribe(&topic, handler).await;
            if let Err(e) = &result {
                tracing::error!(topic = %topic, error = %e, "subscribe failed");
            }
            result
        });
        self.channels.insert(channel.to_string(), pending);
        true
    }

    /// Drop the bookkeeping for `channel` and release its subscription.
    /// Returns `None` if the channel was not active. The returned future
    /// resolves once the pending subscribe has settled and been unsubscribed;
    /// the release runs whether or not it is awaited.
    pub fn deactivate(&mut self, channel: &str) -> Option<PendingRelease> {
        let pending = self.channels.remove(channel)?;
        tracing::info!(channel, "unsubscribing");

        self.releasing.retain(|_, earlier| earlier.peek().is_none());
        let task = tokio::spawn(release(channel.to_string(), pending));
        let done = flatten_join(task).boxed().shared();
        self.releasing.insert(channel.to_string(), done.clone());
        Some(done)
    }

    pub fn is_active(&self, channel: &str) -> bool {
        self.channels.contains_key(channel)
    }

    pub fn active_channels(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    /// Release every subscription, waiting for all unsubscribes, including
    /// releases started earlier that are still in flight.
    pub async fn shutdown(&mut self) -> Vec<(String, Result<(), BusError>)> {
        let active: Vec<String> = self.channels.keys().cloned().collect();
        for channel in &active {
            self.deactivate(channel);
        }
        let (channels, releases): (Vec<String>, Vec<PendingRelease>) =
            std::mem::take(&mut self.releasing).into_iter().unzip();
        let results = futures::future::join_all(releases).await;
        channels.into_iter().zip(results).collect()
    }
}

async fn release(channel: String, pending: PendingSubscription) -> Result<(), BusError> {
    let subscription = flatten_join(pending).await?;
    tracing::debug!(channel = %channel, topic = subscription.topic(), "releasing subscription");
    let result = subscription.unsubscribe().await;
    if let Err(e) = &result {
        tracing::warn!(channel = %channel, error = %e, "unsubscribe failed");
    }
    result
}

/// Fold a task panic or cancellation into a transport error.
pub async fn flatten_join<T>(handle: JoinHandle<Result<T, BusError>>) -> Result<T, BusError> {
    match handle.await {
        Ok(result) => result,
        Err(e) => Err(BusError::Transport(e.to_string())),
    }
}
