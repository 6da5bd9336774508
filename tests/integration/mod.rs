//! Integration tests for the orchestration engine.
//!
//! These run the full graph against a scripted provider and a temporary
//! project directory; only the language model is faked.

mod support;

mod routing;
mod workflow;
