//! Canonical encoding and hash derivation.
//!
//! A node's hash is `SHA-256(canonical_json({parent, bucket}))` rendered as
//! lowercase hex, where the canonical form sorts object keys
//! lexicographically at every level, carries no insignificant whitespace,
//! renders integers without decimal points, preserves Unicode, and omits
//! empty fields entirely. Absent is canonical; explicit empty never appears.
//!
//! The hashed view of a bucket contains only `role` and `content`. Node
//! kind, model, provider, stop reason, and usage are descriptive metadata:
//! identity must be a pure function of conversational content so that
//! identical prefixes deduplicate across turns and across providers.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::Bucket;
use crate::error::MerkleError;
use crate::llm::{ContentBlock, Role};

#[derive(Serialize)]
struct IdentityView<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<Role>,
    #[serde(skip_serializing_if = "<[ContentBlock]>::is_empty")]
    content: &'a [ContentBlock],
}

#[derive(Serialize)]
struct HashPayload<'a> {
    #[serde(skip_serializing_if = "str::is_empty")]
    parent: &'a str,
    bucket: IdentityView<'a>,
}

/// Derive the content hash for a node with the given parent and bucket.
pub fn node_hash(parent_hash: &str, bucket: &Bucket) -> Result<String, MerkleError> {
    let payload = identity_json(parent_hash, bucket)?;
    Ok(hex::encode(Sha256::digest(payload.as_bytes())))
}

/// Canonical encoding of the identity payload hashed into a node's hash.
///
/// Also used by storage drivers to distinguish deduplication (same hash,
/// same identity) from corruption (same hash, different identity).
pub fn identity_json(parent_hash: &str, bucket: &Bucket) -> Result<String, MerkleError> {
    canonical_json(&HashPayload {
        parent: parent_hash,
        bucket: IdentityView {
            role: bucket.role,
            content: &bucket.content,
        },
    })
}

/// Encode any serializable value as canonical JSON.
///
/// Key order is enforced by an explicit sort during rendering rather than
/// relying on the map ordering of the serializer, so the output is stable
/// no matter which serde_json features end up enabled in the build.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, MerkleError> {
    let value = serde_json::to_value(value)?;
    let mut out = String::new();
    append_canonical(&value, &mut out)?;
    Ok(out)
}

fn append_canonical(value: &Value, out: &mut String) -> Result<(), MerkleError> {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(key)?);
                out.push(':');
                append_canonical(&map[key.as_str()], out)?;
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                append_canonical(item, out)?;
            }
            out.push(']');
        }
        scalar => out.push_str(&serde_json::to_string(scalar)?),
    }
    Ok(())
}
