//! Tool Trait and Registry
//!
//! The uniform invoke contract every tool implements, and the static
//! registry the orchestrator dispatches through. The registry is built
//! once at startup from the full catalog; duplicate names are rejected at
//! registration and unknown names at call time become error results, never
//! panics. Dispatch failures are converted to error strings so the model
//! can react — tools do not throw across the orchestrator boundary.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use codeloom_core::{CoreError, CoreResult};
use codeloom_llm::{ParameterSchema, ToolDefinition};

use crate::context::ToolExecutionContext;
use crate::logging::{truncate_result, ToolCallRecord};

// ============================================================================
// ToolResult
// ============================================================================

/// Result of one tool execution. Either `output` or `error` is set.
#[derive(Debug, Clone, Default)]
pub struct ToolResult {
    pub success: bool,
    pub output: Option<String>,
    pub error: Option<String>,
}

impl ToolResult {
    /// Successful result with output text.
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: Some(output.into()),
            error: None,
        }
    }

    /// Failed result with an error description.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(error.into()),
        }
    }

    /// The text to fold back to the model.
    pub fn to_content(&self) -> String {
        if self.success {
            self.output.clone().unwrap_or_default()
        } else {
            self.error
                .clone()
                .unwrap_or_else(|| "Unknown error".to_string())
        }
    }
}

// ============================================================================
// Tool trait
// ============================================================================

/// A named, schema-described operation the model may invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name, as exposed to the model.
    fn name(&self) -> &str;

    /// Description shown to the model.
    fn description(&self) -> &str;

    /// JSON schema for the argument object.
    fn parameters_schema(&self) -> ParameterSchema;

    /// Execute with the given arguments. Must not panic; failures are
    /// reported through the result.
    async fn execute(&self, ctx: &ToolExecutionContext, args: Value) -> ToolResult;

    /// Definition handed to the provider.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.parameters_schema(),
        }
    }
}

// ============================================================================
// ToolRegistry
// ============================================================================

/// Static name -> handler map with insertion-ordered definitions.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    /// Registration order, so definitions are presented deterministically.
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Duplicate names are a startup configuration error.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> CoreResult<()> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(CoreError::config(format!(
                "Tool '{}' is already registered",
                name
            )));
        }
        self.order.push(name.clone());
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Definitions for the provider, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.definition())
            .collect()
    }

    /// Dispatch one call, wrapping it with timing/success logging.
    ///
    /// Unknown names produce an error result; nothing here panics or
    /// propagates an error type to the caller.
    pub async fn execute(
        &self,
        ctx: &ToolExecutionContext,
        name: &str,
        args: Value,
    ) -> ToolResult {
        let started_at = Utc::now();
        let result = match self.get(name) {
            Some(tool) => tool.execute(ctx, args.clone()).await,
            None => ToolResult::err(format!("Unknown tool: {}", name)),
        };
        let finished_at = Utc::now();
        let duration_ms = (finished_at - started_at).num_milliseconds();

        tracing::debug!(
            session = %ctx.session_id,
            tool = name,
            success = result.success,
            duration_ms,
            "tool dispatch"
        );

        ctx.call_log.record(ToolCallRecord {
            tool: name.to_string(),
            arguments: args,
            started_at,
            finished_at,
            duration_ms,
            success: result.success,
            result: truncate_result(name, &result.to_content()),
        });

        result
    }
}
