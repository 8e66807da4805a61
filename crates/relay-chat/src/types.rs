use serde::{Deserialize, Serialize};

use crate::error::ChatError;

/// Role of a message participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instruction
    System,
    /// User message
    User,
    /// Assistant response
    Assistant,
}

/// Message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChatMessage {
    /// Role of the message author
    pub role: Role,
    /// Message content
    pub content: String,
}

/// Validated inbound relay request
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Conversation to forward upstream, in caller order; may be empty
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    /// Parse and validate a raw request body
    ///
    /// An empty body behaves as `{}`. Unparsable JSON and a well-formed body
    /// without a valid `messages` array are distinct failures, both raised
    /// before any upstream call.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::InvalidBody`] for malformed JSON and
    /// [`ChatError::InvalidMessages`] when the `messages` field is missing,
    /// not an array, or its elements do not match the message schema.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, ChatError> {
        let value: serde_json::Value = if bytes.is_empty() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_slice(bytes).map_err(|_| ChatError::InvalidBody)?
        };

        let messages = value.get("messages").ok_or(ChatError::InvalidMessages)?;
        if !messages.is_array() {
            return Err(ChatError::InvalidMessages);
        }

        let messages: Vec<ChatMessage> =
            serde_json::from_value(messages.clone()).map_err(|_| ChatError::InvalidMessages)?;

        Ok(Self { messages })
    }
}
