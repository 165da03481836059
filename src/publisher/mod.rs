//! Publishing newly inserted nodes to external event sinks.

pub mod event;
pub mod kafka;
mod nop;

pub use event::{Event, SCHEMA_NODE_V1};
pub use nop::NopPublisher;

use async_trait::async_trait;

use crate::error::PublisherError;

/// Sink for node events.
///
/// Implementations must be safe under concurrent calls from multiple
/// workers. `publish` may block up to the implementation's internal
/// timeout; failures are reported, never retried here. Retry, if any, is
/// caller policy.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish one event.
    async fn publish(&self, event: &Event) -> Result<(), PublisherError>;

    /// Release resources held by the publisher. Idempotent.
    async fn close(&self) -> Result<(), PublisherError>;
}
