//! Shared test doubles: a provider that replays a fixed script of
//! responses, and a helper that wires a graph against a temp project.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use codeloom::{
    MemorySink, OrchestrationGraph, OrchestratorConfig, OrchestratorContext, LlmProvider,
    LlmResponse, LlmResult, Message, ProviderConfig, ToolDefinition,
};
use codeloom_llm::{LlmError, StopReason, ToolCall, UsageStats};

/// Replays a fixed sequence of responses; errors once the script runs out.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<LlmResponse>>,
    config: ProviderConfig,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<LlmResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            config: ProviderConfig::default(),
        }
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn supports_tools(&self) -> bool {
        true
    }

    async fn send_message(
        &self,
        _messages: Vec<Message>,
        _system: Option<String>,
        _tools: Vec<ToolDefinition>,
    ) -> LlmResult<LlmResponse> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| LlmError::Other {
                message: "script exhausted".to_string(),
            })
    }

    async fn health_check(&self) -> LlmResult<()> {
        Ok(())
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

/// A plain text response.
pub fn text(content: &str) -> LlmResponse {
    LlmResponse {
        content: Some(content.to_string()),
        tool_calls: vec![],
        stop_reason: Some(StopReason::EndTurn),
        usage: UsageStats::default(),
        model: "scripted".to_string(),
    }
}

/// A response requesting a single tool call.
pub fn tool_call(id: &str, name: &str, arguments: serde_json::Value) -> LlmResponse {
    LlmResponse {
        content: None,
        tool_calls: vec![ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments,
        }],
        stop_reason: Some(StopReason::ToolUse),
        usage: UsageStats::default(),
        model: "scripted".to_string(),
    }
}

/// Graph wired to a scripted provider, a temp project root, and a memory
/// sink for event assertions.
pub fn scripted_graph(
    script: Vec<LlmResponse>,
    project_root: &Path,
    config: OrchestratorConfig,
) -> (OrchestrationGraph, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let ctx = OrchestratorContext::new(Arc::new(ScriptedProvider::new(script)), project_root, config)
        .unwrap()
        .with_sink(sink.clone());
    (OrchestrationGraph::new(ctx), sink)
}
