//! Chat completion abstraction.
//!
//! A small trait over the chat completion API so the session coordinator and
//! chat loops can be exercised in tests without network access.

use crate::error::{Result, TubechatError};
use crate::openai::{build_client, DEFAULT_TIMEOUT};
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Trait for chat completion implementations.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run a completion over the full message history and return the answer text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// OpenAI-backed chat model.
pub struct OpenAIChatModel {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl OpenAIChatModel {
    /// Create a chat model for the given model name.
    pub fn new(model: &str) -> Result<Self> {
        Ok(Self {
            client: build_client(DEFAULT_TIMEOUT)?,
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let mut request_messages: Vec<ChatCompletionRequestMessage> =
            Vec::with_capacity(messages.len());

        for message in messages {
            let built: ChatCompletionRequestMessage = match message.role {
                Role::System => ChatCompletionRequestSystemMessageArgs::default()
                    .content(message.content.clone())
                    .build()
                    .map_err(|e| TubechatError::Query(e.to_string()))?
                    .into(),
                Role::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(message.content.clone())
                    .build()
                    .map_err(|e| TubechatError::Query(e.to_string()))?
                    .into(),
                Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(message.content.clone())
                    .build()
                    .map_err(|e| TubechatError::Query(e.to_string()))?
                    .into(),
            };
            request_messages.push(built);
        }

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(request_messages)
            .build()
            .map_err(|e| TubechatError::Query(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| TubechatError::OpenAI(format!("Chat API error: {}", e)))?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| TubechatError::Query("Empty response from LLM".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization_is_lowercase() {
        let msg = ChatMessage::assistant("hi");
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);

        let back: ChatMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_message_constructors() {
        assert_eq!(ChatMessage::system("a").role, Role::System);
        assert_eq!(ChatMessage::user("b").role, Role::User);
        assert_eq!(ChatMessage::assistant("c").role, Role::Assistant);
    }
}
