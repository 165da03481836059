//! No-op publisher for disabled publishing and tests.

use async_trait::async_trait;

use super::{Event, Publisher};
use crate::error::PublisherError;

/// Publisher that accepts every event and does nothing.
#[derive(Debug, Default)]
pub struct NopPublisher;

impl NopPublisher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Publisher for NopPublisher {
    async fn publish(&self, _event: &Event) -> Result<(), PublisherError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), PublisherError> {
        Ok(())
    }
}
