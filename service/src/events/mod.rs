/// Event Bus Adapter (C2): publishes JSON envelopes onto the four
/// domain topics. `publish` returning `Err` is the sole trigger for a
/// caller's fallback write — there is no separate "degraded mode"
/// signal.
use std::time::Duration;

use event_schema::EventEnvelope;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use serde::Serialize;

#[derive(Clone)]
pub struct EventBus {
    producer: FutureProducer,
}

impl EventBus {
    pub fn new(brokers: &str) -> anyhow::Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .set("acks", "all")
            .set("enable.idempotence", "true")
            .set("retries", "3")
            .set("linger.ms", "5")
            .create()?;
        Ok(Self { producer })
    }

    /// Publishes `payload` wrapped in an envelope to `topic`, partitioned
    /// by `partition_key` so that events for the same entity are
    /// ordered. Persistent delivery is handled by the broker's durability
    /// settings (acks=all, idempotent producer); no transactional outbox
    /// backs this call, so an event can in principle reach a consumer
    /// before the publishing transaction's effects are visible elsewhere.
    pub async fn publish<T: Serialize>(
        &self,
        topic: &str,
        action: &str,
        partition_key: &str,
        payload: T,
    ) -> anyhow::Result<()> {
        let envelope = EventEnvelope::new(action, payload);
        let body = serde_json::to_vec(&envelope)?;

        let record = FutureRecord::to(topic).key(partition_key).payload(&body);

        self.producer
            .send(record, Duration::from_millis(80))
            .await
            .map_err(|(err, _)| anyhow::anyhow!("kafka publish failed: {err}"))?;

        Ok(())
    }
}

pub mod payloads {
    pub use event_schema::{
        actions, topics, CommentDeletePayload, CommentPublishPayload, LikePayload,
        PopularityUpdatePayload, SocialPayload,
    };
}
