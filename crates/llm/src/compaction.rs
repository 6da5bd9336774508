//! Pluggable Context Compaction
//!
//! Trait-based abstraction for fitting conversation history into a token
//! budget. Two built-in compactors:
//!
//! - `SlidingWindowCompactor` - fast, deterministic prefix-stable deletion.
//!   Preserves head and tail messages, removes the middle.
//! - `SummaryCompactor` - summarizes the removed middle through an injected
//!   async callback, so the compactor does not depend on a concrete
//!   provider. Falls back to plain deletion when summarization fails.
//!
//! Also provides `truncate_for_review`, the priority-based retention used
//! when file contents are summarized for the reviewer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use codeloom_core::{CoreError, CoreResult};

use crate::types::{Message, MessageRole};

// ============================================================================
// CompactionConfig
// ============================================================================

/// Configuration for context compaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompactionConfig {
    /// Maximum number of messages before triggering compaction.
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,
    /// Number of messages to preserve at the head (system prompt + first user message).
    #[serde(default = "default_preserve_head")]
    pub preserve_head: usize,
    /// Number of messages to preserve at the tail (recent context).
    #[serde(default = "default_preserve_tail")]
    pub preserve_tail: usize,
    /// Whether compaction is enabled at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_max_messages() -> usize {
    50
}

fn default_preserve_head() -> usize {
    2
}

fn default_preserve_tail() -> usize {
    6
}

fn default_enabled() -> bool {
    true
}

impl Default for CompactionConfig {
    fn default() -> Self {
        Self {
            max_messages: default_max_messages(),
            preserve_head: default_preserve_head(),
            preserve_tail: default_preserve_tail(),
            enabled: default_enabled(),
        }
    }
}

impl CompactionConfig {
    /// Create a disabled compaction config.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Check if compaction should be triggered for the given message count.
    pub fn should_compact(&self, message_count: usize) -> bool {
        self.enabled && message_count > self.max_messages
    }

    /// Minimum number of messages needed for compaction to be meaningful.
    /// Need at least preserve_head + preserve_tail + 1 middle message.
    pub fn min_messages(&self) -> usize {
        self.preserve_head + self.preserve_tail + 1
    }
}

// ============================================================================
// CompactionResult
// ============================================================================

/// Result of a compaction operation, including metrics.
#[derive(Debug, Clone)]
pub struct CompactionResult {
    /// The compacted messages.
    pub messages: Vec<Message>,
    /// Number of messages that were removed.
    pub messages_removed: usize,
    /// Number of messages that were preserved.
    pub messages_preserved: usize,
}

impl CompactionResult {
    fn unchanged(messages: &[Message]) -> Self {
        Self {
            messages: messages.to_vec(),
            messages_removed: 0,
            messages_preserved: messages.len(),
        }
    }
}

// ============================================================================
// ContextCompactor Trait
// ============================================================================

/// Trait for pluggable context compaction strategies.
#[async_trait]
pub trait ContextCompactor: Send + Sync {
    /// Compact the given message history according to the configuration.
    ///
    /// Returns the compacted messages. The original slice is not modified.
    async fn compact(
        &self,
        messages: &[Message],
        config: &CompactionConfig,
    ) -> CoreResult<CompactionResult>;

    /// Human-readable name for this compactor.
    fn name(&self) -> &str;
}

// ============================================================================
// SlidingWindowCompactor
// ============================================================================

/// Sliding window compactor that removes middle messages.
///
/// Preserves `preserve_head` messages at the start and `preserve_tail`
/// messages at the end, removing everything in between. Inserts a marker
/// message at the splice point so the model knows history was dropped.
pub struct SlidingWindowCompactor {
    /// Whether to insert a marker message at the splice point.
    insert_marker: bool,
}

impl SlidingWindowCompactor {
    pub fn new() -> Self {
        Self {
            insert_marker: true,
        }
    }

    /// Create without inserting a marker message.
    pub fn without_marker() -> Self {
        Self {
            insert_marker: false,
        }
    }
}

impl Default for SlidingWindowCompactor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContextCompactor for SlidingWindowCompactor {
    async fn compact(
        &self,
        messages: &[Message],
        config: &CompactionConfig,
    ) -> CoreResult<CompactionResult> {
        if !config.enabled || messages.len() < config.min_messages() {
            return Ok(CompactionResult::unchanged(messages));
        }

        let head = &messages[..config.preserve_head];
        let tail_start = messages.len().saturating_sub(config.preserve_tail);
        let tail = &messages[tail_start..];
        let removed_count = messages.len() - config.preserve_head - config.preserve_tail;

        let mut result = Vec::with_capacity(config.preserve_head + config.preserve_tail + 1);
        result.extend_from_slice(head);

        if self.insert_marker && removed_count > 0 {
            result.push(Message::text(
                MessageRole::User,
                format!(
                    "[Context compacted: {} messages removed to stay within context limits. \
                     The conversation continues below with the most recent messages.]",
                    removed_count
                ),
            ));
        }

        result.extend_from_slice(tail);

        Ok(CompactionResult {
            messages: result,
            messages_removed: removed_count,
            messages_preserved: config.preserve_head + config.preserve_tail,
        })
    }

    fn name(&self) -> &str {
        "SlidingWindowCompactor"
    }
}

// ============================================================================
// SummaryCompactor
// ============================================================================

/// Type alias for the async summarization function.
///
/// Receives the messages to summarize and returns a summary string. Keeps
/// the compactor free of provider types; the orchestrator injects a closure
/// over its provider handle.
pub type SummarizeFn = Box<
    dyn Fn(
            Vec<Message>,
        )
            -> std::pin::Pin<Box<dyn std::future::Future<Output = CoreResult<String>> + Send>>
        + Send
        + Sync,
>;

/// Compactor that replaces the removed middle with an LLM-written summary.
pub struct SummaryCompactor {
    summarize: SummarizeFn,
}

impl SummaryCompactor {
    pub fn new<F>(summarize: F) -> Self
    where
        F: Fn(
                Vec<Message>,
            ) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = CoreResult<String>> + Send>,
            > + Send
            + Sync
            + 'static,
    {
        Self {
            summarize: Box::new(summarize),
        }
    }
}

#[async_trait]
impl ContextCompactor for SummaryCompactor {
    async fn compact(
        &self,
        messages: &[Message],
        config: &CompactionConfig,
    ) -> CoreResult<CompactionResult> {
        if !config.enabled || messages.len() < config.min_messages() {
            return Ok(CompactionResult::unchanged(messages));
        }

        let tail_start = messages.len().saturating_sub(config.preserve_tail);
        let head = &messages[..config.preserve_head];
        let middle = &messages[config.preserve_head..tail_start];
        let tail = &messages[tail_start..];
        let removed_count = middle.len();

        let summary = match (self.summarize)(middle.to_vec()).await {
            Ok(s) => s,
            Err(e) => {
                // Summarization is best-effort; fall back to plain deletion.
                tracing::warn!("summary compaction failed, falling back: {}", e);
                return SlidingWindowCompactor::new().compact(messages, config).await;
            }
        };

        let mut result = Vec::with_capacity(config.preserve_head + 1 + config.preserve_tail);
        result.extend_from_slice(head);
        result.push(Message::text(
            MessageRole::User,
            format!(
                "[Summary of {} compacted messages]\n{}",
                removed_count, summary
            ),
        ));
        result.extend_from_slice(tail);

        Ok(CompactionResult {
            messages: result,
            messages_removed: removed_count,
            messages_preserved: config.preserve_head + config.preserve_tail + 1,
        })
    }

    fn name(&self) -> &str {
        "SummaryCompactor"
    }
}

// ============================================================================
// File truncation for review
// ============================================================================

/// Truncate file content to roughly `max_chars`, keeping the head and tail.
///
/// The head carries declarations and imports, the tail carries closing
/// structure; the middle is replaced with an elision marker naming how many
/// lines were dropped. Content under the budget is returned unchanged.
pub fn truncate_for_review(path: &str, content: &str, max_chars: usize) -> String {
    if content.len() <= max_chars {
        return content.to_string();
    }

    let lines: Vec<&str> = content.lines().collect();
    let head_budget = max_chars * 2 / 3;
    let tail_budget = max_chars - head_budget;

    let mut head_lines = Vec::new();
    let mut used = 0;
    for line in &lines {
        if used + line.len() + 1 > head_budget {
            break;
        }
        used += line.len() + 1;
        head_lines.push(*line);
    }

    let mut tail_lines = Vec::new();
    used = 0;
    for line in lines.iter().rev() {
        if used + line.len() + 1 > tail_budget {
            break;
        }
        used += line.len() + 1;
        tail_lines.push(*line);
    }
    tail_lines.reverse();

    let elided = lines.len().saturating_sub(head_lines.len() + tail_lines.len());
    if elided == 0 {
        return content.to_string();
    }

    format!(
        "{}\n[... {} of {} lines elided from {} ...]\n{}",
        head_lines.join("\n"),
        elided,
        lines.len(),
        path,
        tail_lines.join("\n")
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MessageContent;

    /// Extract the first text content from a message (test helper).
    fn extract_text(msg: &Message) -> Option<&str> {
        msg.content.iter().find_map(|c| {
            if let MessageContent::Text { text } = c {
                Some(text.as_str())
            } else {
                None
            }
        })
    }

    fn make_messages(count: usize) -> Vec<Message> {
        (0..count)
            .map(|i| {
                let role = if i % 2 == 0 {
                    MessageRole::User
                } else {
                    MessageRole::Assistant
                };
                Message::text(role, format!("Message {}", i))
            })
            .collect()
    }

    #[tokio::test]
    async fn test_sliding_window_preserves_head_and_tail() {
        let messages = make_messages(20);
        let config = CompactionConfig {
            max_messages: 10,
            preserve_head: 2,
            preserve_tail: 4,
            enabled: true,
        };

        let result = SlidingWindowCompactor::new()
            .compact(&messages, &config)
            .await
            .unwrap();

        assert_eq!(result.messages_removed, 14);
        // head(2) + marker(1) + tail(4)
        assert_eq!(result.messages.len(), 7);
        assert_eq!(extract_text(&result.messages[0]), Some("Message 0"));
        assert_eq!(extract_text(&result.messages[1]), Some("Message 1"));
        assert!(extract_text(&result.messages[2])
            .unwrap()
            .contains("Context compacted: 14 messages removed"));
        assert_eq!(extract_text(&result.messages[6]), Some("Message 19"));
    }

    #[tokio::test]
    async fn test_sliding_window_skips_small_histories() {
        let messages = make_messages(5);
        let config = CompactionConfig::default();

        let result = SlidingWindowCompactor::new()
            .compact(&messages, &config)
            .await
            .unwrap();

        assert_eq!(result.messages_removed, 0);
        assert_eq!(result.messages.len(), 5);
    }

    #[tokio::test]
    async fn test_disabled_config_is_identity() {
        let messages = make_messages(100);
        let config = CompactionConfig::disabled();

        let result = SlidingWindowCompactor::new()
            .compact(&messages, &config)
            .await
            .unwrap();

        assert_eq!(result.messages_removed, 0);
        assert_eq!(result.messages.len(), 100);
    }

    #[tokio::test]
    async fn test_without_marker() {
        let messages = make_messages(20);
        let config = CompactionConfig {
            max_messages: 10,
            preserve_head: 2,
            preserve_tail: 4,
            enabled: true,
        };

        let result = SlidingWindowCompactor::without_marker()
            .compact(&messages, &config)
            .await
            .unwrap();

        assert_eq!(result.messages.len(), 6);
    }

    #[tokio::test]
    async fn test_summary_compactor_inserts_summary() {
        let messages = make_messages(20);
        let config = CompactionConfig {
            max_messages: 10,
            preserve_head: 2,
            preserve_tail: 4,
            enabled: true,
        };

        let compactor = SummaryCompactor::new(|middle| {
            Box::pin(async move { Ok(format!("summary of {} messages", middle.len())) })
        });
        let result = compactor.compact(&messages, &config).await.unwrap();

        assert_eq!(result.messages_removed, 14);
        let marker = extract_text(&result.messages[2]).unwrap();
        assert!(marker.contains("[Summary of 14 compacted messages]"));
        assert!(marker.contains("summary of 14 messages"));
    }

    #[tokio::test]
    async fn test_summary_compactor_falls_back_on_error() {
        let messages = make_messages(20);
        let config = CompactionConfig {
            max_messages: 10,
            preserve_head: 2,
            preserve_tail: 4,
            enabled: true,
        };

        let compactor = SummaryCompactor::new(|_| {
            Box::pin(async move { Err(CoreError::internal("summarizer offline")) })
        });
        let result = compactor.compact(&messages, &config).await.unwrap();

        // Fallback is the plain sliding window with its marker.
        assert_eq!(result.messages_removed, 14);
        assert!(extract_text(&result.messages[2])
            .unwrap()
            .contains("Context compacted"));
    }

    #[test]
    fn test_should_compact_threshold() {
        let config = CompactionConfig::default();
        assert!(!config.should_compact(50));
        assert!(config.should_compact(51));
    }

    #[test]
    fn test_truncate_for_review_under_budget() {
        let content = "short file";
        assert_eq!(truncate_for_review("a.txt", content, 100), content);
    }

    #[test]
    fn test_truncate_for_review_keeps_head_and_tail() {
        let lines: Vec<String> = (0..200).map(|i| format!("line {}", i)).collect();
        let content = lines.join("\n");

        let truncated = truncate_for_review("big.js", &content, 300);

        assert!(truncated.len() < content.len());
        assert!(truncated.starts_with("line 0"));
        assert!(truncated.ends_with("line 199"));
        assert!(truncated.contains("lines elided from big.js"));
    }
}
