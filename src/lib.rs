//! Codeloom
//!
//! An agent orchestration engine: a finite-state workflow that plans a
//! user's coding request, generates and patches files through a tool
//! catalog, validates and reviews the result, and repairs it until a
//! reviewer approves or a ceiling trips.
//!
//! The engine is host-agnostic. Embedders supply an [`LlmProvider`], a
//! project root, and optionally an event sink, then run the graph:
//!
//! ```no_run
//! use std::sync::Arc;
//! use codeloom::{OrchestrationGraph, OrchestratorConfig, OrchestratorContext};
//! # async fn example(provider: Arc<dyn codeloom::LlmProvider>) -> codeloom::CoreResult<()> {
//! let config = OrchestratorConfig::builder().completion_check(true).build()?;
//! let ctx = OrchestratorContext::new(provider, "/path/to/project", config)?;
//! let outcome = OrchestrationGraph::new(ctx).run("build a todo app").await;
//! println!("complete: {}, files: {:?}", outcome.is_complete(), outcome.files());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod graph;
pub mod nodes;
pub mod prompts;
pub mod router;

pub use config::{OrchestratorConfig, OrchestratorConfigBuilder};
pub use graph::{OrchestrationGraph, OrchestrationOutcome};
pub use nodes::{
    CompletionCheckNode, FixerNode, GeneratorNode, Node, OrchestratorContext, PlannerNode,
    ReviewerNode,
};
pub use router::{is_approved, route, route_safe, EndReason, Transition};

pub use codeloom_core::{
    ChannelSink, ChatMessage, ChatRole, CoreError, CoreResult, EventSink, MemorySink, NullSink,
    OrchestratorEvent, PlanStep, SessionContext, SessionState, StateDelta, StepAction,
};
pub use codeloom_llm::{
    CompactionConfig, ContextCompactor, LlmError, LlmProvider, LlmResponse, LlmResult, Message,
    ProviderConfig, SlidingWindowCompactor, ToolDefinition,
};
pub use codeloom_tools::{standard_registry, ToolExecutionContext, ToolRegistry, ToolResult};
pub use codeloom_validate::{check_and_fix, validate, FixOutcome, ValidationReport};
