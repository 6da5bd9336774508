//! Session Context
//!
//! The explicit session-scoped object passed to every component. There is
//! no process-wide "current session" pointer anywhere in the engine; each
//! run owns one of these and everything a node needs flows through it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use uuid::Uuid;

use crate::events::{EventSink, NullSink, OrchestratorEvent};

/// Per-session context: identity, project location, and the event sink.
///
/// Cheap to clone; the sink is shared.
#[derive(Clone)]
pub struct SessionContext {
    /// Unique id for this run.
    pub session_id: String,
    /// Root directory the session is allowed to touch.
    pub project_root: PathBuf,
    /// Fire-and-forget progress sink.
    events: Arc<dyn EventSink>,
}

impl SessionContext {
    /// Create a context with a fresh session id and a no-op sink.
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            project_root: project_root.as_ref().to_path_buf(),
            events: Arc::new(NullSink),
        }
    }

    /// Attach an event sink for an external listener.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = sink;
        self
    }

    /// Emit a progress event. Never blocks.
    pub fn emit(&self, event: OrchestratorEvent) {
        self.events.emit(event);
    }

    /// Convenience for the common status event.
    pub fn emit_status(&self, message: impl Into<String>) {
        self.emit(OrchestratorEvent::Status {
            message: message.into(),
        });
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("session_id", &self.session_id)
            .field("project_root", &self.project_root)
            .finish()
    }
}
