//! In-memory reference driver.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::Driver;
use crate::error::StorageError;
use crate::merkle::{canonical, Node};

/// Mutex-guarded in-memory node store.
///
/// Backing state is a hash-keyed map, a `parent -> children` index, and an
/// append-only insertion order, all updated together under one lock.
#[derive(Default)]
pub struct InMemoryDriver {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    nodes: HashMap<String, Node>,
    children: HashMap<String, HashSet<String>>,
    order: Vec<String>,
}

impl InMemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Driver for InMemoryDriver {
    async fn put(&self, node: &Node) -> Result<bool, StorageError> {
        let mut state = self.state.lock();

        if let Some(existing) = state.nodes.get(&node.hash) {
            let stored = canonical::identity_json(&existing.parent_hash, &existing.bucket)?;
            let incoming = canonical::identity_json(&node.parent_hash, &node.bucket)?;
            if stored != incoming {
                return Err(StorageError::Conflict {
                    hash: node.hash.clone(),
                });
            }
            return Ok(false);
        }

        state.nodes.insert(node.hash.clone(), node.clone());
        state.order.push(node.hash.clone());
        if !node.parent_hash.is_empty() {
            state
                .children
                .entry(node.parent_hash.clone())
                .or_default()
                .insert(node.hash.clone());
        }

        Ok(true)
    }

    async fn get(&self, hash: &str) -> Result<Node, StorageError> {
        self.state
            .lock()
            .nodes
            .get(hash)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(hash.to_string()))
    }

    async fn list(&self) -> Result<Vec<Node>, StorageError> {
        let state = self.state.lock();
        Ok(state
            .order
            .iter()
            .filter_map(|hash| state.nodes.get(hash).cloned())
            .collect())
    }

    async fn leaves(&self) -> Result<Vec<Node>, StorageError> {
        let state = self.state.lock();
        Ok(state
            .order
            .iter()
            .filter(|hash| !state.children.contains_key(hash.as_str()))
            .filter_map(|hash| state.nodes.get(hash).cloned())
            .collect())
    }

    async fn ancestry(&self, hash: &str) -> Result<Vec<Node>, StorageError> {
        let state = self.state.lock();
        let mut cursor = state
            .nodes
            .get(hash)
            .ok_or_else(|| StorageError::NotFound(hash.to_string()))?;

        let mut chain = vec![cursor.clone()];
        while !cursor.parent_hash.is_empty() {
            cursor = state
                .nodes
                .get(&cursor.parent_hash)
                .ok_or_else(|| StorageError::NotFound(cursor.parent_hash.clone()))?;
            chain.push(cursor.clone());
        }

        Ok(chain)
    }
}
