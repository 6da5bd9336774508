//! Tool Execution Context
//!
//! Session-scoped state handed to every tool invocation: where the session
//! is allowed to operate, the shared working directory, cancellation, the
//! call log, and handles to the external collaborators some tools delegate
//! to. One context per session; nothing here is process-global.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use codeloom_core::CoreResult;

use crate::logging::ToolCallLog;

// ============================================================================
// Collaborator traits
// ============================================================================

/// One hit from the similarity-search collaborator.
#[derive(Debug, Clone)]
pub struct SimilarityHit {
    pub path: String,
    pub snippet: String,
    pub score: f32,
}

/// Vector-similarity search over the project's code. External service; the
/// engine only specifies the contract.
#[async_trait]
pub trait SimilaritySearch: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> CoreResult<Vec<SimilarityHit>>;
}

/// Source of the prose project summary `get_project_context` returns.
#[async_trait]
pub trait ProjectContextProvider: Send + Sync {
    async fn project_context(&self) -> CoreResult<String>;
}

// ============================================================================
// ToolExecutionContext
// ============================================================================

/// Per-session context threaded through every tool call.
#[derive(Clone)]
pub struct ToolExecutionContext {
    /// Session this context belongs to.
    pub session_id: String,
    /// Root directory tools are confined to.
    pub project_root: PathBuf,
    /// Current working directory, shared so directory-changing operations
    /// are visible to subsequent calls.
    pub working_directory: Arc<Mutex<PathBuf>>,
    /// Cooperative cancellation for long-running tools.
    pub cancellation_token: CancellationToken,
    /// Similarity-search collaborator, when the host wired one up.
    pub similarity: Option<Arc<dyn SimilaritySearch>>,
    /// Project-context collaborator, when the host wired one up.
    pub project_context: Option<Arc<dyn ProjectContextProvider>>,
    /// Per-session record of every dispatch.
    pub call_log: Arc<ToolCallLog>,
}

impl ToolExecutionContext {
    /// Create a context rooted at the given project directory.
    pub fn new(session_id: impl Into<String>, project_root: impl AsRef<Path>) -> Self {
        let root = project_root.as_ref().to_path_buf();
        Self {
            session_id: session_id.into(),
            project_root: root.clone(),
            working_directory: Arc::new(Mutex::new(root)),
            cancellation_token: CancellationToken::new(),
            similarity: None,
            project_context: None,
            call_log: Arc::new(ToolCallLog::new()),
        }
    }

    /// Attach a similarity-search collaborator.
    pub fn with_similarity(mut self, service: Arc<dyn SimilaritySearch>) -> Self {
        self.similarity = Some(service);
        self
    }

    /// Attach a project-context collaborator.
    pub fn with_project_context(mut self, service: Arc<dyn ProjectContextProvider>) -> Self {
        self.project_context = Some(service);
        self
    }

    /// Snapshot of the current working directory.
    pub fn working_directory_snapshot(&self) -> PathBuf {
        self.working_directory
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|_| self.project_root.clone())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Context rooted at a temp dir, for tool tests.
    pub(crate) fn make_ctx(dir: &Path) -> ToolExecutionContext {
        ToolExecutionContext::new("test", dir)
    }
}
