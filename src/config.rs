//! Orchestrator Configuration
//!
//! All the run-level knobs in one place: plan size, review ceilings, tool
//! round limits, the graph cycle ceiling, and the compaction policy. Built
//! through a validating builder so an impossible combination (soft ceiling
//! above the hard one, zero-step plans) is rejected before a run starts.

use serde::{Deserialize, Serialize};

use codeloom_core::{CoreError, CoreResult};
use codeloom_llm::CompactionConfig;

/// Default upper bound on plan length.
const DEFAULT_MAX_PLAN_STEPS: usize = 5;
/// Soft cap on the approve/fix cycle; hitting it forces completion.
const DEFAULT_SOFT_REVIEW_CAP: u32 = 3;
/// Hard loop-breaker of last resort across the whole run.
const DEFAULT_HARD_REVIEW_CAP: u32 = 10;
/// Model/tool round-trips one node may spend per invocation.
const DEFAULT_MAX_TOOL_ROUNDS: usize = 8;
/// Ceiling on router cycles for one run.
const DEFAULT_MAX_CYCLES: usize = 64;
/// Per-file character budget when summarizing for review.
const DEFAULT_REVIEW_FILE_BUDGET: usize = 4_000;

/// Run-level configuration for the orchestration graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Maximum number of steps the planner may emit.
    pub max_plan_steps: usize,
    /// Review count at which an unapproved run is forced to completion.
    pub soft_review_cap: u32,
    /// Review count at which the router ends the run unconditionally.
    pub hard_review_cap: u32,
    /// Whether the completion-check pass runs before the first review.
    pub completion_check: bool,
    /// Model/tool round-trips allowed per node invocation.
    pub max_tool_rounds: usize,
    /// Router cycles allowed per run.
    pub max_cycles: usize,
    /// Character budget per file in review summaries.
    pub review_file_budget: usize,
    /// Conversation compaction policy for tool loops.
    pub compaction: CompactionConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_plan_steps: DEFAULT_MAX_PLAN_STEPS,
            soft_review_cap: DEFAULT_SOFT_REVIEW_CAP,
            hard_review_cap: DEFAULT_HARD_REVIEW_CAP,
            completion_check: false,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            max_cycles: DEFAULT_MAX_CYCLES,
            review_file_budget: DEFAULT_REVIEW_FILE_BUDGET,
            compaction: CompactionConfig::default(),
        }
    }
}

impl OrchestratorConfig {
    pub fn builder() -> OrchestratorConfigBuilder {
        OrchestratorConfigBuilder::default()
    }
}

/// Validating builder for [`OrchestratorConfig`].
#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfigBuilder {
    config: OrchestratorConfig,
}

impl OrchestratorConfigBuilder {
    pub fn max_plan_steps(mut self, steps: usize) -> Self {
        self.config.max_plan_steps = steps;
        self
    }

    pub fn soft_review_cap(mut self, cap: u32) -> Self {
        self.config.soft_review_cap = cap;
        self
    }

    pub fn hard_review_cap(mut self, cap: u32) -> Self {
        self.config.hard_review_cap = cap;
        self
    }

    pub fn completion_check(mut self, enabled: bool) -> Self {
        self.config.completion_check = enabled;
        self
    }

    pub fn max_tool_rounds(mut self, rounds: usize) -> Self {
        self.config.max_tool_rounds = rounds;
        self
    }

    pub fn max_cycles(mut self, cycles: usize) -> Self {
        self.config.max_cycles = cycles;
        self
    }

    pub fn review_file_budget(mut self, chars: usize) -> Self {
        self.config.review_file_budget = chars;
        self
    }

    pub fn compaction(mut self, compaction: CompactionConfig) -> Self {
        self.config.compaction = compaction;
        self
    }

    /// Validate and produce the configuration.
    pub fn build(self) -> CoreResult<OrchestratorConfig> {
        let config = self.config;
        if config.max_plan_steps == 0 {
            return Err(CoreError::config("max_plan_steps must be at least 1"));
        }
        if config.soft_review_cap == 0 {
            return Err(CoreError::config("soft_review_cap must be at least 1"));
        }
        if config.soft_review_cap > config.hard_review_cap {
            return Err(CoreError::config(format!(
                "soft_review_cap ({}) must not exceed hard_review_cap ({})",
                config.soft_review_cap, config.hard_review_cap
            )));
        }
        if config.max_tool_rounds == 0 {
            return Err(CoreError::config("max_tool_rounds must be at least 1"));
        }
        if config.max_cycles == 0 {
            return Err(CoreError::config("max_cycles must be at least 1"));
        }
        if config.review_file_budget == 0 {
            return Err(CoreError::config("review_file_budget must be at least 1"));
        }
        Ok(config)
    }
}
