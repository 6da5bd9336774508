//! Codeloom Validate
//!
//! Pure structural-completeness checks for generated files and the
//! deterministic auto-fix that repairs the covered failure classes.

pub mod autofix;
pub mod models;
pub mod rules;

pub use autofix::{auto_fix, check_and_fix, FixOutcome};
pub use models::{FileKind, ValidationIssue, ValidationReport};
pub use rules::validate;
