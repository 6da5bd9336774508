//! Codeloom Core
//!
//! Error types, session state and delta merge, the orchestrator event
//! model, and the session-scoped context shared by every other crate.

pub mod context;
pub mod error;
pub mod events;
pub mod session;

pub use context::SessionContext;
pub use error::{CoreError, CoreResult};
pub use events::{ChannelSink, EventSink, MemorySink, NullSink, OrchestratorEvent};
pub use session::{ChatMessage, ChatRole, PlanStep, SessionState, StateDelta, StepAction};
