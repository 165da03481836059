//! Content-addressed conversation nodes.
//!
//! Every observed message or response becomes an immutable [`Node`] whose
//! hash is derived from its parent hash and its payload, so a conversation
//! forms a parent-pointing Merkle DAG: replayed prefixes re-derive the same
//! hashes and deduplicate, branches share their common history.

pub mod canonical;
pub mod turn;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MerkleError;
use crate::llm::{ContentBlock, Role, Usage};

/// Kind of payload a node carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketType {
    Request,
    Response,
    Message,
    ToolCall,
    ToolResult,
}

/// The payload of a node.
///
/// `role` and `content` constitute the node's identity; the remaining
/// fields are descriptive metadata (see [`canonical`]). All empty fields
/// are omitted from the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    #[serde(rename = "type")]
    pub bucket_type: BucketType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<ContentBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl Bucket {
    /// Payload for a plain conversation message.
    pub fn message(role: Role, content: Vec<ContentBlock>) -> Self {
        Self {
            bucket_type: BucketType::Message,
            role: Some(role),
            model: None,
            provider: None,
            content,
            stop_reason: None,
            usage: None,
        }
    }
}

/// An immutable, content-addressed record of one message or response.
///
/// `hash` and `parent_hash` never change once computed. `created_at` is the
/// wall clock at construction; it does not contribute to the hash and is
/// not rewritten when the same node is observed again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub hash: String,
    #[serde(default)]
    pub parent_hash: String,
    pub bucket: Bucket,
    pub created_at: DateTime<Utc>,
}

impl Node {
    /// Create a node parented on `parent` (or a root when `None`), deriving
    /// its hash from the parent hash and the bucket's identity fields.
    pub fn new(bucket: Bucket, parent: Option<&Node>) -> Result<Self, MerkleError> {
        let parent_hash = parent.map(|p| p.hash.clone()).unwrap_or_default();
        let hash = canonical::node_hash(&parent_hash, &bucket)?;
        Ok(Self {
            hash,
            parent_hash,
            bucket,
            created_at: Utc::now(),
        })
    }

    /// A root starts a conversation: it has no parent.
    pub fn is_root(&self) -> bool {
        self.parent_hash.is_empty()
    }
}
