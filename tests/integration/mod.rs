//! Integration tests for the conversation-recording core

mod hash_determinism;
mod support;
