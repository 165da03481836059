//! Storage drivers for the conversation DAG.

pub mod inmemory;

pub use inmemory::InMemoryDriver;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::merkle::Node;

/// Contract every node store satisfies.
///
/// Implementations must be safe under concurrent invocation from multiple
/// workers. The schema is shared with on-disk drivers that persist the same
/// entities; only the locking strategy may differ.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Store one node. Returns `true` when the node was newly inserted,
    /// `false` when a node with the same hash was already present (the
    /// stored node is left untouched). Fails with
    /// [`StorageError::Conflict`] when the existing node's identity payload
    /// differs from the incoming one.
    async fn put(&self, node: &Node) -> Result<bool, StorageError>;

    /// Fetch a node by hash. Fails with [`StorageError::NotFound`] on a
    /// lookup miss.
    async fn get(&self, hash: &str) -> Result<Node, StorageError>;

    /// All stored nodes in insertion order.
    async fn list(&self) -> Result<Vec<Node>, StorageError>;

    /// Nodes no stored node references as parent, reflecting the stored set
    /// at call time.
    async fn leaves(&self) -> Result<Vec<Node>, StorageError>;

    /// The chain `[node, parent, grandparent, ..., root]` starting at
    /// `hash`, ending at the first node with an empty parent hash. Fails
    /// with [`StorageError::NotFound`] when `hash` is unknown.
    async fn ancestry(&self, hash: &str) -> Result<Vec<Node>, StorageError>;
}
