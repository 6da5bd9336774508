//! Orchestrator Events
//!
//! Structured progress events the orchestrator pushes to an external
//! listener, plus the fire-and-forget sink abstraction. A missing or slow
//! listener must never block node execution, so sinks are synchronous and
//! lossy by contract. Consumers must tolerate unknown event types, and
//! later `chain_of_thought` events for the same section supersede earlier
//! partials.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::session::PlanStep;

// ============================================================================
// Event model
// ============================================================================

/// One progress event for an external real-time listener.
///
/// Serialized with a `type` tag so listeners can switch on the event kind
/// and ignore kinds they do not know.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrchestratorEvent {
    /// Free-form progress note ("planning...", "generating step 2/5").
    Status { message: String },

    /// The plan the planner settled on.
    Plan { steps: Vec<PlanStep> },

    /// Streaming chain-of-thought for one open section. `text` is the
    /// accumulated section text so far; a later event with the same
    /// `section` supersedes this one. `partial` is false on the final
    /// event for the section.
    ChainOfThought {
        section: String,
        text: String,
        partial: bool,
    },

    /// Files written or patched by the generator.
    FilesGenerated { files: Vec<String> },

    /// Files rewritten by the fixer.
    FilesFixed { files: Vec<String> },

    /// Verdict from one review pass.
    Review {
        approved: bool,
        feedback: String,
        iteration: u32,
    },

    /// Outcome of the optional completion-check pass.
    CompletionCheck { complete: bool, detail: String },

    /// Terminal event. Always emitted, even on forced termination.
    Complete {
        is_complete: bool,
        files: Vec<String>,
        forced: bool,
    },

    /// Non-fatal error surfaced to the listener.
    Error {
        message: String,
        code: Option<String>,
    },
}

// ============================================================================
// Sinks
// ============================================================================

/// Session-scoped event sink. `emit` is fire-and-forget: implementations
/// must not block and must swallow delivery failures.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: OrchestratorEvent);
}

/// Default sink that drops every event.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: OrchestratorEvent) {}
}

/// Sink that forwards events over a bounded channel.
///
/// Uses `try_send`, so a full channel (slow listener) drops the event
/// instead of blocking the node.
pub struct ChannelSink {
    tx: mpsc::Sender<OrchestratorEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<OrchestratorEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: OrchestratorEvent) {
        let _ = self.tx.try_send(event);
    }
}

/// Sink that records events in memory. Useful for tests and for embedders
/// that want to inspect a run after the fact.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<OrchestratorEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every event emitted so far.
    pub fn events(&self) -> Vec<OrchestratorEvent> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: OrchestratorEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::StepAction;

    #[test]
    fn test_event_serialization_tag() {
        let event = OrchestratorEvent::Status {
            message: "planning".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "status");
        assert_eq!(json["message"], "planning");
    }

    #[test]
    fn test_plan_event_round_trip() {
        let event = OrchestratorEvent::Plan {
            steps: vec![PlanStep::new(
                "Create index.html",
                Some("index.html".to_string()),
                StepAction::Create,
            )],
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: OrchestratorEvent = serde_json::from_str(&json).unwrap();
        match back {
            OrchestratorEvent::Plan { steps } => assert_eq!(steps.len(), 1),
            _ => panic!("Expected Plan event"),
        }
    }

    #[test]
    fn test_chain_of_thought_tag() {
        let event = OrchestratorEvent::ChainOfThought {
            section: "step-1".to_string(),
            text: "Reading existing files".to_string(),
            partial: true,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "chain_of_thought");
        assert_eq!(json["partial"], true);
    }

    #[test]
    fn test_memory_sink_records_events() {
        let sink = MemorySink::new();
        sink.emit(OrchestratorEvent::Status {
            message: "one".to_string(),
        });
        sink.emit(OrchestratorEvent::Status {
            message: "two".to_string(),
        });
        assert_eq!(sink.events().len(), 2);
    }

    #[test]
    fn test_channel_sink_drops_when_full() {
        let (tx, mut rx) = mpsc::channel(1);
        let sink = ChannelSink::new(tx);
        sink.emit(OrchestratorEvent::Status {
            message: "first".to_string(),
        });
        // Channel is full now; this must not block or panic.
        sink.emit(OrchestratorEvent::Status {
            message: "second".to_string(),
        });

        let first = rx.try_recv().unwrap();
        match first {
            OrchestratorEvent::Status { message } => assert_eq!(message, "first"),
            _ => panic!("Expected Status event"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_null_sink_is_silent() {
        let sink = NullSink;
        sink.emit(OrchestratorEvent::Error {
            message: "ignored".to_string(),
            code: None,
        });
    }
}
