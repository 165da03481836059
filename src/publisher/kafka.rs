//! Kafka-backed publisher.
//!
//! Events are serialized to JSON and keyed by the conversation root hash,
//! so every node of a single conversation lands on the same partition.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};

use super::{Event, Publisher};
use crate::error::PublisherError;

const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(5);

/// Kafka publisher configuration.
#[derive(Debug, Clone, Default)]
pub struct KafkaConfig {
    /// Bootstrap broker addresses. Required.
    pub brokers: Vec<String>,
    /// Destination topic. Required.
    pub topic: String,
    /// Client identifier reported to the brokers.
    pub client_id: Option<String>,
    /// Upper bound on a single publish. Defaults to 5 seconds.
    pub publish_timeout: Option<Duration>,
}

/// One message handed to the transport.
pub(crate) struct OutboundMessage {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
    pub timestamp_ms: i64,
}

/// Transport seam behind the publisher, so tests can observe writes without
/// a broker.
#[async_trait]
pub(crate) trait MessageWriter: Send + Sync {
    async fn write(&self, message: OutboundMessage) -> Result<(), PublisherError>;
    async fn close(&self) -> Result<(), PublisherError>;
}

struct ProducerWriter {
    producer: FutureProducer,
    topic: String,
    send_timeout: Duration,
}

#[async_trait]
impl MessageWriter for ProducerWriter {
    async fn write(&self, message: OutboundMessage) -> Result<(), PublisherError> {
        let record = FutureRecord::to(&self.topic)
            .key(&message.key)
            .payload(&message.value)
            .timestamp(message.timestamp_ms);

        self.producer
            .send(record, self.send_timeout)
            .await
            .map(|_| ())
            .map_err(|(err, _)| PublisherError::Transport(err.to_string()))
    }

    async fn close(&self) -> Result<(), PublisherError> {
        self.producer
            .flush(self.send_timeout)
            .map_err(|err| PublisherError::Transport(err.to_string()))
    }
}

/// Publishes node events to Kafka.
pub struct KafkaPublisher {
    writer: Box<dyn MessageWriter>,
    publish_timeout: Duration,
    closed: AtomicBool,
}

impl std::fmt::Debug for KafkaPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KafkaPublisher")
            .field("publish_timeout", &self.publish_timeout)
            .field("closed", &self.closed)
            .finish()
    }
}

impl KafkaPublisher {
    /// Build a publisher speaking to real brokers.
    ///
    /// Partitioning uses librdkafka's consistent hash of the message key.
    pub fn new(config: KafkaConfig) -> Result<Self, PublisherError> {
        if config.brokers.is_empty() {
            return Err(PublisherError::MissingBrokers);
        }
        if config.topic.is_empty() {
            return Err(PublisherError::MissingTopic);
        }

        let mut client_config = ClientConfig::new();
        client_config.set("bootstrap.servers", config.brokers.join(","));
        client_config.set("partitioner", "consistent_random");
        if let Some(client_id) = &config.client_id {
            client_config.set("client.id", client_id);
        }

        let producer: FutureProducer = client_config
            .create()
            .map_err(|err| PublisherError::Transport(err.to_string()))?;

        let publish_timeout = config.publish_timeout.unwrap_or(DEFAULT_PUBLISH_TIMEOUT);
        Ok(Self::with_writer(
            Box::new(ProducerWriter {
                producer,
                topic: config.topic,
                send_timeout: publish_timeout,
            }),
            publish_timeout,
        ))
    }

    pub(crate) fn with_writer(writer: Box<dyn MessageWriter>, publish_timeout: Duration) -> Self {
        Self {
            writer,
            publish_timeout,
            closed: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Publisher for KafkaPublisher {
    async fn publish(&self, event: &Event) -> Result<(), PublisherError> {
        if event.root_hash.is_empty() {
            return Err(PublisherError::EmptyRootHash);
        }

        let value = serde_json::to_vec(event)?;
        let message = OutboundMessage {
            key: event.root_hash.clone().into_bytes(),
            value,
            timestamp_ms: event.occurred_at.timestamp_millis(),
        };

        tokio::time::timeout(self.publish_timeout, self.writer.write(message))
            .await
            .map_err(|_| PublisherError::Timeout(self.publish_timeout))?
    }

    async fn close(&self) -> Result<(), PublisherError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.writer.close().await
    }
}
