//! Turn assembly.
//!
//! One observed request/response exchange becomes an ordered, parent-linked
//! chain of nodes: every request message in order, then a single response
//! node. Because each hash covers the parent hash, a turn that replays a
//! prior turn's prefix re-derives the same hashes for that prefix; storage
//! deduplicates and only the new suffix produces new nodes. This is how
//! branching conversations form a DAG.

use super::{Bucket, BucketType, Node};
use crate::error::MerkleError;
use crate::llm::{ChatRequest, ChatResponse, Role};

/// Build the node chain for one chat turn, in `put` order.
///
/// The first node has an empty parent; each subsequent node parents on the
/// previous one. The response node carries the provider, model, stop reason,
/// and usage as descriptive metadata. `tool_use` blocks stay inline in the
/// response content; tool results arrive as message nodes of a later turn.
///
/// Deterministic: identical `(provider, req, resp)` inputs yield the same
/// hash sequence.
pub fn build(
    provider: &str,
    req: &ChatRequest,
    resp: &ChatResponse,
) -> Result<Vec<Node>, MerkleError> {
    let mut nodes: Vec<Node> = Vec::with_capacity(req.messages.len() + 1);

    for message in &req.messages {
        let bucket = Bucket::message(message.role, message.content.clone());
        let node = Node::new(bucket, nodes.last())?;
        nodes.push(node);
    }

    let response_bucket = Bucket {
        bucket_type: BucketType::Response,
        role: Some(Role::Assistant),
        model: non_empty(&resp.model),
        provider: non_empty(provider),
        content: resp.message.content.clone(),
        stop_reason: non_empty(&resp.stop_reason),
        usage: resp.usage,
    };
    let response_node = Node::new(response_bucket, nodes.last())?;
    nodes.push(response_node);

    Ok(nodes)
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
