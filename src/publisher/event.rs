//! Publish envelope for a single node.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PublisherError;
use crate::merkle::Node;

/// Schema identifier for node publish events.
pub const SCHEMA_NODE_V1: &str = "tapes.node.v1";

/// The publish payload for one node: the node itself, the hash of its
/// conversation root at publication time, and when the publish occurred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub schema: String,
    pub root_hash: String,
    pub occurred_at: DateTime<Utc>,
    pub node: Node,
}

impl Event {
    /// Wrap a node for publication.
    ///
    /// The node is taken by value, so later mutation of the source cannot
    /// reach an already-constructed event. Fails when `root_hash` is empty.
    pub fn new(root_hash: impl Into<String>, node: Node) -> Result<Self, PublisherError> {
        let root_hash = root_hash.into();
        if root_hash.is_empty() {
            return Err(PublisherError::EmptyRootHash);
        }

        Ok(Self {
            schema: SCHEMA_NODE_V1.to_string(),
            root_hash,
            occurred_at: Utc::now(),
            node,
        })
    }
}
