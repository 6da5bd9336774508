//! Workflow Nodes
//!
//! The five nodes of the orchestration graph, the trait they implement,
//! and the shared context they run against. Nodes never mutate session
//! state; each returns a [`StateDelta`] the graph merges.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use codeloom_core::{CoreResult, EventSink, SessionContext, SessionState, StateDelta};
use codeloom_llm::{ContextCompactor, LlmProvider, SlidingWindowCompactor};
use codeloom_tools::{standard_registry, ToolExecutionContext, ToolRegistry};

use crate::config::OrchestratorConfig;

pub mod completion;
pub mod fixer;
pub mod generator;
pub mod planner;
pub mod reviewer;

mod tool_loop;

pub use completion::CompletionCheckNode;
pub use fixer::FixerNode;
pub use generator::GeneratorNode;
pub use planner::PlannerNode;
pub use reviewer::ReviewerNode;

/// Everything a node needs for one run, bundled per session.
///
/// There is no process-wide session pointer anywhere in the engine; each
/// run owns one of these.
pub struct OrchestratorContext {
    /// Session identity and the event sink.
    pub session: SessionContext,
    /// The language-model capability.
    pub provider: Arc<dyn LlmProvider>,
    /// The tool catalog exposed to the model.
    pub registry: Arc<ToolRegistry>,
    /// Session-scoped tool execution context (working dir, call log).
    pub tools: ToolExecutionContext,
    /// Run-level configuration.
    pub config: OrchestratorConfig,
    /// Conversation compaction strategy for tool loops.
    pub compactor: Arc<dyn ContextCompactor>,
}

impl OrchestratorContext {
    /// Build a context with the standard tool catalog, a fresh session id,
    /// and a sliding-window compactor.
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        project_root: impl AsRef<Path>,
        config: OrchestratorConfig,
    ) -> CoreResult<Self> {
        let session = SessionContext::new(&project_root);
        let tools = ToolExecutionContext::new(session.session_id.clone(), &project_root);
        Ok(Self {
            session,
            provider,
            registry: Arc::new(standard_registry()?),
            tools,
            config,
            compactor: Arc::new(SlidingWindowCompactor::new()),
        })
    }

    /// Attach an event sink for an external listener.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.session = self.session.with_sink(sink);
        self
    }

    /// Replace the tool catalog.
    pub fn with_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the compaction strategy.
    pub fn with_compactor(mut self, compactor: Arc<dyn ContextCompactor>) -> Self {
        self.compactor = compactor;
        self
    }
}

/// One node of the workflow graph.
#[async_trait]
pub trait Node: Send + Sync {
    /// Stable node name, used in logs and status events.
    fn name(&self) -> &'static str;

    /// Execute against a read-only view of the state and return the delta
    /// to merge. Nodes must not panic; failures are folded into the delta
    /// (and surfaced as error events) instead.
    async fn run(&self, ctx: &OrchestratorContext, state: &SessionState) -> StateDelta;
}
