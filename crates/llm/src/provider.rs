//! LLM Provider Trait
//!
//! Defines the common interface for all LLM providers. The engine treats
//! providers as a black box: send messages, get text or tool calls back.
//! Concrete HTTP clients live with the embedding application.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::types::{LlmResponse, LlmResult, Message, ProviderConfig, ToolDefinition};

/// Trait that all LLM providers must implement.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Returns the provider name for identification.
    fn name(&self) -> &'static str;

    /// Returns the current model being used.
    fn model(&self) -> &str;

    /// Returns whether this provider supports tool calling.
    fn supports_tools(&self) -> bool;

    /// Send a message and get a complete response.
    ///
    /// # Arguments
    /// * `messages` - Conversation history
    /// * `system` - Optional system prompt
    /// * `tools` - Available tools for the model to use
    async fn send_message(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        tools: Vec<ToolDefinition>,
    ) -> LlmResult<LlmResponse>;

    /// Stream a response, sending text deltas over the channel as they
    /// arrive, and return the final complete response.
    ///
    /// The default implementation falls back to `send_message` and emits
    /// the full text as a single delta, so non-streaming providers work
    /// unchanged.
    async fn stream_message(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        tools: Vec<ToolDefinition>,
        tx: mpsc::Sender<String>,
    ) -> LlmResult<LlmResponse> {
        let response = self.send_message(messages, system, tools).await?;
        if let Some(text) = &response.content {
            let _ = tx.send(text.clone()).await;
        }
        Ok(response)
    }

    /// Check if the provider is healthy and reachable.
    async fn health_check(&self) -> LlmResult<()>;

    /// Get the configuration for this provider.
    fn config(&self) -> &ProviderConfig;

    /// List available models (if supported by provider).
    async fn list_models(&self) -> LlmResult<Option<Vec<String>>> {
        Ok(None)
    }
}
