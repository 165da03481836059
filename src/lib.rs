//! Tapes: conversation recording for LLM chat proxies.
//!
//! Normalized chat turns become a content-addressed Merkle DAG: every
//! message and response is an immutable node hashed with its parent, so
//! replayed prefixes deduplicate and branching conversations share their
//! common history. A worker pool persists nodes through a pluggable storage
//! driver and streams each newly inserted node to an event sink.

pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod merkle;
pub mod publisher;
pub mod storage;
pub mod worker;
