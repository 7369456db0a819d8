/// Workers (C6): one long-running consumer per domain topic. Consumers
/// decode the JSON envelope, apply the action idempotently, and commit
/// the offset only when the message is considered done — either
/// genuinely succeeded or a logical non-error (missing referent,
/// duplicate). A transient failure seeks the partition back to the
/// same offset and retries after a short backoff, the nearest analog
/// to nack-with-requeue available on a log-structured bus.
pub mod comment_worker;
pub mod like_worker;
pub mod popularity_worker;
pub mod social_worker;

use std::time::Duration;

use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::Message;
use rdkafka::Offset;
use serde::de::DeserializeOwned;

use event_schema::EventEnvelope;

/// Outcome of applying one decoded event.
pub enum Outcome {
    /// Effects committed; advance past this message.
    Done,
    /// Transport or DB error; retry the same message after backoff.
    Transient,
}

pub fn build_consumer(brokers: &str, group_id: &str, topic: &str) -> anyhow::Result<StreamConsumer> {
    let consumer: StreamConsumer = ClientConfig::new()
        .set("bootstrap.servers", brokers)
        .set("group.id", group_id)
        .set("enable.auto.commit", "false")
        .set("auto.offset.reset", "earliest")
        .set("session.timeout.ms", "45000")
        .set("max.poll.interval.ms", "300000")
        // Nearest Kafka analog to a bounded 50-message prefetch window.
        .set("queued.min.messages", "50")
        .create()?;
    consumer.subscribe(&[topic])?;
    Ok(consumer)
}

/// Drives one consumer's loop until `shutdown` fires. `apply` decodes
/// and applies a single envelope; malformed payloads are acked and
/// dropped rather than retried, matching the "no poison-message
/// requeue loop" rule.
pub async fn run_loop<T, F, Fut>(
    consumer: StreamConsumer,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
    apply: F,
) where
    T: DeserializeOwned,
    F: Fn(EventEnvelope<T>) -> Fut,
    Fut: std::future::Future<Output = Outcome>,
{
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    break;
                }
            }
            msg = consumer.recv() => {
                let msg = match msg {
                    Ok(m) => m,
                    Err(err) => {
                        tracing::warn!("consumer recv error: {err}, backing off");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                        continue;
                    }
                };

                let payload = match msg.payload() {
                    Some(p) => p,
                    None => {
                        let _ = consumer.commit_message(&msg, CommitMode::Async);
                        continue;
                    }
                };

                let envelope: EventEnvelope<T> = match serde_json::from_slice(payload) {
                    Ok(e) => e,
                    Err(err) => {
                        tracing::warn!("malformed event, acking and dropping: {err}");
                        let _ = consumer.commit_message(&msg, CommitMode::Async);
                        continue;
                    }
                };

                match apply(envelope).await {
                    Outcome::Done => {
                        let _ = consumer.commit_message(&msg, CommitMode::Async);
                    }
                    Outcome::Transient => {
                        tracing::warn!("transient failure applying event, retrying after backoff");
                        tokio::time::sleep(Duration::from_millis(500)).await;
                        let _ = consumer.seek(
                            msg.topic(),
                            msg.partition(),
                            Offset::Offset(msg.offset()),
                            Duration::from_secs(1),
                        );
                    }
                }
            }
        }
    }
}
