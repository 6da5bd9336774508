//! Codeloom LLM
//!
//! The language-model capability boundary: message and tool-definition
//! types, the provider trait, context compaction, and the incremental
//! chain-of-thought stream parser.

pub mod compaction;
pub mod provider;
pub mod thought_stream;
pub mod types;

pub use compaction::{
    CompactionConfig, CompactionResult, ContextCompactor, SlidingWindowCompactor, SummarizeFn,
    SummaryCompactor, truncate_for_review,
};
pub use provider::LlmProvider;
pub use thought_stream::{ThoughtEvent, ThoughtStreamParser};
pub use types::{
    LlmError, LlmResponse, LlmResult, Message, MessageContent, MessageRole, ParameterSchema,
    ProviderConfig, StopReason, ToolCall, ToolDefinition, UsageStats,
};
