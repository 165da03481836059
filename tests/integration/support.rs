//! Shared fixtures for the recording pipeline tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use tapes::error::{PublisherError, StorageError};
use tapes::llm::{ChatRequest, ChatResponse, Message, Role, Usage};
use tapes::merkle::Node;
use tapes::publisher::{Event, Publisher};
use tapes::storage::{Driver, InMemoryDriver};
use tapes::worker::Job;

/// Publisher that records every event it receives and can be told to fail.
#[derive(Default)]
pub struct MockPublisher {
    published: Mutex<Vec<Event>>,
    pub publish_err: Option<String>,
    close_calls: AtomicUsize,
}

impl MockPublisher {
    pub fn failing(message: &str) -> Self {
        Self {
            publish_err: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn published(&self) -> Vec<Event> {
        self.published.lock().clone()
    }

    pub fn publish_calls(&self) -> usize {
        self.published.lock().len()
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn publish(&self, event: &Event) -> Result<(), PublisherError> {
        self.published.lock().push(event.clone());
        match &self.publish_err {
            Some(message) => Err(PublisherError::Transport(message.clone())),
            None => Ok(()),
        }
    }

    async fn close(&self) -> Result<(), PublisherError> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Driver wrapper whose `ancestry` always fails.
pub struct AncestryFailDriver {
    pub inner: Arc<InMemoryDriver>,
}

#[async_trait]
impl Driver for AncestryFailDriver {
    async fn put(&self, node: &Node) -> Result<bool, StorageError> {
        self.inner.put(node).await
    }

    async fn get(&self, hash: &str) -> Result<Node, StorageError> {
        self.inner.get(hash).await
    }

    async fn list(&self) -> Result<Vec<Node>, StorageError> {
        self.inner.list().await
    }

    async fn leaves(&self) -> Result<Vec<Node>, StorageError> {
        self.inner.leaves().await
    }

    async fn ancestry(&self, _hash: &str) -> Result<Vec<Node>, StorageError> {
        Err(StorageError::Io("ancestry failed".to_string()))
    }
}

pub fn turn_one_job() -> Job {
    Job {
        provider: "test-provider".to_string(),
        req: ChatRequest {
            model: "test-model".to_string(),
            messages: vec![
                Message::text(Role::System, "You are a helpful assistant."),
                Message::text(Role::User, "What is 2+2?"),
            ],
            ..ChatRequest::default()
        },
        resp: ChatResponse {
            model: "test-model".to_string(),
            stop_reason: "stop".to_string(),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
                cache_read_input_tokens: 0,
            }),
            message: Message::text(Role::Assistant, "2+2 equals 4."),
        },
    }
}

pub fn turn_two_job() -> Job {
    Job {
        provider: "test-provider".to_string(),
        req: ChatRequest {
            model: "test-model".to_string(),
            messages: vec![
                Message::text(Role::System, "You are a helpful assistant."),
                Message::text(Role::User, "What is 2+2?"),
                // Replayed from turn one.
                Message::text(Role::Assistant, "2+2 equals 4."),
                // New.
                Message::text(Role::User, "And what is 3+3?"),
            ],
            ..ChatRequest::default()
        },
        resp: ChatResponse {
            model: "test-model".to_string(),
            stop_reason: "stop".to_string(),
            usage: Some(Usage {
                prompt_tokens: 20,
                completion_tokens: 5,
                total_tokens: 25,
                cache_read_input_tokens: 0,
            }),
            message: Message::text(Role::Assistant, "3+3 equals 6."),
        },
    }
}
