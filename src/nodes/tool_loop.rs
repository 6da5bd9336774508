//! Shared Tool-Calling Loop
//!
//! The generator, fixer, and completion-check nodes all drive the model the
//! same way: send the conversation with the tool catalog, execute every
//! requested tool immediately, fold each result back into the conversation,
//! and repeat until the model answers with text or the round budget runs
//! out. Dispatch failures come back as error strings the model can react
//! to; nothing here propagates an error across the loop boundary.

use std::collections::BTreeMap;

use codeloom_core::{ChatMessage, OrchestratorEvent};
use codeloom_llm::{Message, MessageContent, MessageRole, ThoughtEvent, ThoughtStreamParser, UsageStats};
use codeloom_tools::{truncate_result, validate_path, PathResolver, WRITE_CLASS_TOOLS};

use super::OrchestratorContext;

/// What one tool loop produced.
pub(crate) struct ToolLoopOutcome {
    /// The model's final text answer, empty if it never gave one.
    pub final_text: String,
    /// Project-relative paths passed to write-class tools that succeeded.
    pub files_touched: Vec<String>,
    /// One tool-role log entry per dispatched call, in execution order.
    pub audit: Vec<ChatMessage>,
    /// Model round-trips consumed.
    pub rounds: usize,
    /// Accumulated token usage.
    pub usage: UsageStats,
    /// Provider failure or round exhaustion, if the loop did not finish
    /// cleanly.
    pub error: Option<String>,
}

/// Drive the model in tool-calling mode until it answers with text.
pub(crate) async fn run_tool_loop(
    ctx: &OrchestratorContext,
    system: String,
    prompt: String,
    emit_thoughts: bool,
) -> ToolLoopOutcome {
    let tools = ctx.registry.definitions();
    let mut messages = vec![Message::user(prompt)];
    let mut parser = ThoughtStreamParser::new();
    let mut sections: BTreeMap<String, String> = BTreeMap::new();
    let mut files_touched: Vec<String> = Vec::new();
    let mut audit: Vec<ChatMessage> = Vec::new();
    let mut usage = UsageStats::default();
    let mut final_text = String::new();
    let mut error = None;
    let mut rounds = 0;

    while rounds < ctx.config.max_tool_rounds {
        rounds += 1;

        if ctx.config.compaction.should_compact(messages.len()) {
            match ctx.compactor.compact(&messages, &ctx.config.compaction).await {
                Ok(result) => {
                    tracing::debug!(
                        session = %ctx.session.session_id,
                        removed = result.messages_removed,
                        "compacted tool-loop conversation"
                    );
                    messages = result.messages;
                }
                Err(e) => {
                    tracing::warn!(session = %ctx.session.session_id, error = %e, "compaction failed, continuing uncompacted");
                }
            }
        }

        let response = match ctx
            .provider
            .send_message(messages.clone(), Some(system.clone()), tools.clone())
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let message = e.to_string();
                ctx.session.emit(OrchestratorEvent::Error {
                    message: message.clone(),
                    code: Some("llm".to_string()),
                });
                error = Some(message);
                break;
            }
        };
        usage.merge(&response.usage);

        if emit_thoughts && !response.text().is_empty() {
            stream_thoughts(ctx, &mut parser, &mut sections, response.text());
        }

        if !response.has_tool_calls() {
            final_text = response.text().trim().to_string();
            break;
        }

        // The model's turn, text and tool requests together, then one
        // result message per request so it sees every outcome next round.
        let mut content = Vec::new();
        if !response.text().is_empty() {
            content.push(MessageContent::Text {
                text: response.text().to_string(),
            });
        }
        for call in &response.tool_calls {
            content.push(MessageContent::ToolUse {
                id: call.id.clone(),
                name: call.name.clone(),
                input: call.arguments.clone(),
            });
        }
        messages.push(Message {
            role: MessageRole::Assistant,
            content,
        });

        for call in &response.tool_calls {
            let result = ctx
                .registry
                .execute(&ctx.tools, &call.name, call.arguments.clone())
                .await;

            audit.push(ChatMessage::tool(if result.success {
                format!("{}: ok", call.name)
            } else {
                format!(
                    "{}: {}",
                    call.name,
                    result.error.as_deref().unwrap_or("failed")
                )
            }));

            if result.success && WRITE_CLASS_TOOLS.contains(&call.name.as_str()) {
                if let Some(rel) = write_target(ctx, &call.arguments) {
                    if !files_touched.contains(&rel) {
                        files_touched.push(rel);
                    }
                }
            }

            let folded = truncate_result(&call.name, &result.to_content());
            messages.push(Message::tool_result(&call.id, folded, !result.success));
        }
    }

    if emit_thoughts {
        flush_thoughts(ctx, &mut parser, &mut sections);
    }
    if error.is_none() && final_text.is_empty() && rounds >= ctx.config.max_tool_rounds {
        error = Some(format!(
            "Tool round limit ({}) reached before the model finished",
            ctx.config.max_tool_rounds
        ));
    }

    ToolLoopOutcome {
        final_text,
        files_touched,
        audit,
        rounds,
        usage,
        error,
    }
}

/// One file as persisted after the loop: its final content and whether it
/// passed validation.
pub(crate) struct PersistedFile {
    pub path: String,
    pub content: String,
    pub valid: bool,
}

/// Re-read every touched file from disk (the authoritative copy), run the
/// validator with its single auto-fix pass, and write fixed content back.
/// Files are kept regardless of validity; the reviewer catches what the
/// fixer could not.
pub(crate) fn persist_outputs(ctx: &OrchestratorContext, files: &[String]) -> Vec<PersistedFile> {
    let mut persisted = Vec::new();
    for rel in files {
        let abs = ctx.tools.project_root.join(rel);
        let content = match std::fs::read_to_string(&abs) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %rel, error = %e, "touched file unreadable after tool loop");
                continue;
            }
        };
        let outcome = codeloom_validate::check_and_fix(rel, &content);
        if outcome.was_fixed {
            if let Err(e) = std::fs::write(&abs, &outcome.content) {
                tracing::warn!(path = %rel, error = %e, "failed to persist auto-fixed content");
            }
        }
        if !outcome.valid {
            tracing::warn!(
                path = %rel,
                issues = outcome.issues.join("; "),
                "file still invalid after auto-fix"
            );
        }
        persisted.push(PersistedFile {
            path: rel.clone(),
            content: outcome.content,
            valid: outcome.valid,
        });
    }
    persisted
}

/// Current on-disk content of a recorded file.
///
/// The exact location wins; a stale path falls through the resolver's
/// ordered fallbacks (registry basename, bounded scan) before the in-state
/// copy is used as a last resort.
pub(crate) fn current_file_content(
    ctx: &OrchestratorContext,
    known_files: &[String],
    path: &str,
    fallback: &str,
) -> String {
    if let Ok(content) = std::fs::read_to_string(ctx.tools.project_root.join(path)) {
        return content;
    }
    let resolver =
        PathResolver::new(&ctx.tools.project_root).with_registry(known_files.to_vec());
    if let Some(found) = resolver.resolve(path).path() {
        if let Ok(content) = std::fs::read_to_string(found) {
            return content;
        }
    }
    fallback.to_string()
}

/// Project-relative path of a write-class tool call, when it resolves.
fn write_target(ctx: &OrchestratorContext, arguments: &serde_json::Value) -> Option<String> {
    let raw = arguments.get("path").and_then(|v| v.as_str())?;
    let abs = validate_path(
        raw,
        &ctx.tools.working_directory_snapshot(),
        &ctx.tools.project_root,
    )
    .ok()?;
    let rel = abs.strip_prefix(&ctx.tools.project_root).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}

fn stream_thoughts(
    ctx: &OrchestratorContext,
    parser: &mut ThoughtStreamParser,
    sections: &mut BTreeMap<String, String>,
    chunk: &str,
) {
    for event in parser.feed(chunk) {
        emit_thought(ctx, sections, event);
    }
}

fn flush_thoughts(
    ctx: &OrchestratorContext,
    parser: &mut ThoughtStreamParser,
    sections: &mut BTreeMap<String, String>,
) {
    for event in parser.finish() {
        emit_thought(ctx, sections, event);
    }
}

fn emit_thought(
    ctx: &OrchestratorContext,
    sections: &mut BTreeMap<String, String>,
    event: ThoughtEvent,
) {
    match event {
        ThoughtEvent::SectionStart { .. } => {}
        ThoughtEvent::Delta { section, text } => {
            let accumulated = sections.entry(section.clone()).or_default();
            if !accumulated.is_empty() {
                accumulated.push('\n');
            }
            accumulated.push_str(&text);
            ctx.session.emit(OrchestratorEvent::ChainOfThought {
                section,
                text: accumulated.clone(),
                partial: true,
            });
        }
        ThoughtEvent::SectionEnd { section, text } => {
            sections.insert(section.clone(), text.clone());
            ctx.session.emit(OrchestratorEvent::ChainOfThought {
                section,
                text,
                partial: false,
            });
        }
    }
}
