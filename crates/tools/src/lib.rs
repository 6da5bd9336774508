//! Codeloom Tools
//!
//! The tool dispatch layer: the `Tool` trait and static registry, the
//! session-scoped execution context, per-call logging, path resolution,
//! and the canonical 20-tool catalog.

pub mod context;
pub mod impls;
pub mod logging;
pub mod paths;
pub mod trait_def;

pub use context::{
    ProjectContextProvider, SimilarityHit, SimilaritySearch, ToolExecutionContext,
};
pub use impls::{standard_registry, WRITE_CLASS_TOOLS};
pub use logging::{output_cap, truncate_result, ToolCallLog, ToolCallRecord, ToolCallSummary};
pub use paths::{validate_path, PathResolver, Resolution};
pub use trait_def::{Tool, ToolRegistry, ToolResult};
