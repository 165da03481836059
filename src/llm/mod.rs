//! Provider-agnostic chat types.
//!
//! Every provider parser (OpenAI Chat Completions, OpenAI Responses,
//! Anthropic Messages, ...) normalizes its wire payloads into these shapes,
//! so conversations recorded through different providers stay comparable.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Chat message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        };
        f.write_str(name)
    }
}

/// One block of message content.
///
/// Serialized as a tagged union discriminated by `type`. Fields that are
/// empty for a given block are omitted entirely so the serialized form
/// matches the canonical encoding rules in [`crate::merkle::canonical`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        #[serde(default, skip_serializing_if = "String::is_empty")]
        text: String,
    },
    Image {
        #[serde(default, skip_serializing_if = "String::is_empty")]
        image_url: String,
    },
    ToolUse {
        #[serde(default, skip_serializing_if = "String::is_empty")]
        tool_use_id: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        tool_name: String,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        tool_input: Map<String, Value>,
    },
    ToolResult {
        #[serde(default, skip_serializing_if = "String::is_empty")]
        tool_result_id: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        tool_output: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
}

impl ContentBlock {
    /// Plain text block.
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }
}

/// One chat message: a role and an ordered sequence of content blocks.
///
/// Content order is semantically meaningful (a `tool_use` block pairs with a
/// `tool_result` in a later message).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// Message holding a single text block.
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: vec![ContentBlock::text(text)],
        }
    }
}

/// Token accounting reported by a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub prompt_tokens: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub completion_tokens: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub total_tokens: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub cache_read_input_tokens: u64,
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

/// A parsed chat request.
///
/// The recording core consumes only `model` and `messages`; the sampling
/// fields are carried for the parser seam and ignored by the turn builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

/// A parsed chat response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stop_reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    pub message: Message,
}
