// In-process publish/subscribe bus
use crate::application::bus::{BusError, PacketHandler, PubSubBus, Subscription};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct Topics {
    handlers: Mutex<HashMap<String, Vec<(u64, PacketHandler)>>>,
    next_id: AtomicU64,
}

impl Topics {
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<(u64, PacketHandler)>>> {
        // A poisoned map is still structurally valid
        self.handlers.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Loopback bus: `publish` invokes every handler subscribed to the topic on
/// the publishing thread.
#[derive(Clone, Default)]
pub struct LocalBus {
    topics: Arc<Topics>,
}

impl LocalBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `fields` to the topic's subscribers. Returns how many received it.
    pub fn publish(&self, topic: &str, fields: Value) -> usize {
        // Snapshot the handlers so a handler may (un)subscribe without deadlock
        let handlers: Vec<PacketHandler> = self
            .topics
            .lock()
            .get(topic)
            .map(|list| list.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default();

        for handler in &handlers {
            handler(fields.clone());
        }
        handlers.len()
    }

    #[cfg(test)]
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics.lock().get(topic).map(Vec::len).unwrap_or(0)
    }
}

#[async_trait]
impl PubSubBus for LocalBus {
    async fn subscribe(
        &self,
        topic: &str,
        handler: PacketHandler,
    ) -> Result<Box<dyn Subscription>, BusError> {
        if topic.trim().is_empty() {
            return Err(BusError::Rejected {
                topic: topic.to_string(),
                reason: "empty topic name".to_string(),
            });
        }
        let id = self.topics.next_id.fetch_add(1, Ordering::Relaxed);
        self.topics
            .lock()
            .entry(topic.to_string())
            .or_default()
            .push((id, handler));
        tracing::debug!(topic, id, "local subscription added");

        Ok(Box::new(LocalSubscription {
            topics: self.topics.clone(),
            topic: topic.to_string(),
            id,
        }))
    }
}

struct LocalSubscription {
    topics: Arc<Topics>,
    topic: String,
    id: u64,
}

#[async_trait]
impl Subscription for LocalSubscription {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn unsubscribe(self: Box<Self>) -> Result<(), BusError> {
        let mut topics = self.topics.lock();
        let list = topics
            .get_mut(&self.topic)
            .ok_or_else(|| BusError::UnknownSubscription(self.topic.clone()))?;
        let before = list.len();
        list.retain(|(id, _)| *id != self.id);
        if list.len() == before {
            return Err(BusError::UnknownSubscription(self.topic.clone()));
        }
        if list.is_empty() {
            topics.remove(&self.topic);
        }
        tracing::debug!(topic = %self.topic, id = self.id, "local subscription removed");
        Ok(())
    }
}
