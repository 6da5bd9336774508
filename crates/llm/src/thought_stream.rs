//! Incremental Chain-of-Thought Parser
//!
//! Accumulates streamed text deltas and splits them into sections without
//! re-scanning the whole buffer on every token. Only the current incomplete
//! line is buffered; completed lines are classified once and either open a
//! new section (headers like `## Plan` or `Step 2:`) or extend the current
//! one.
//!
//! Downstream, the orchestrator turns these into `chain_of_thought` events
//! where later partials for the same section supersede earlier ones.

/// Events produced while parsing a thought stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThoughtEvent {
    /// A new section opened.
    SectionStart { section: String },
    /// One more completed line of the current open section.
    Delta { section: String, text: String },
    /// The section closed; `text` is its full accumulated content.
    SectionEnd { section: String, text: String },
}

/// Incremental parser over streamed model output.
///
/// Feed arbitrary-sized chunks with [`feed`](Self::feed); call
/// [`finish`](Self::finish) once the stream ends to flush the trailing
/// line and close the open section.
#[derive(Debug)]
pub struct ThoughtStreamParser {
    /// The current incomplete line (no newline seen yet).
    line_buf: String,
    /// Id of the current open section.
    section: String,
    /// Accumulated text of the current open section.
    section_text: String,
    /// Number of sections opened so far, for stable ids.
    section_count: usize,
    /// Whether SectionStart for the current section was emitted.
    section_started: bool,
}

impl ThoughtStreamParser {
    pub fn new() -> Self {
        Self {
            line_buf: String::new(),
            section: "preamble".to_string(),
            section_text: String::new(),
            section_count: 0,
            section_started: false,
        }
    }

    /// Clear all state so the parser can be reused for a new stream.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// The id of the currently open section.
    pub fn current_section(&self) -> &str {
        &self.section
    }

    /// Accumulated text of the currently open section.
    pub fn current_text(&self) -> &str {
        &self.section_text
    }

    /// Feed one chunk of streamed text; returns the events it produced.
    pub fn feed(&mut self, chunk: &str) -> Vec<ThoughtEvent> {
        let mut events = Vec::new();
        for piece in chunk.split_inclusive('\n') {
            if let Some(stripped) = piece.strip_suffix('\n') {
                self.line_buf.push_str(stripped);
                let line = std::mem::take(&mut self.line_buf);
                self.process_line(&line, &mut events);
            } else {
                // Incomplete line; held back until the newline arrives so a
                // half-received header is never misclassified as body text.
                self.line_buf.push_str(piece);
            }
        }
        events
    }

    /// Flush the trailing line and close the open section.
    pub fn finish(&mut self) -> Vec<ThoughtEvent> {
        let mut events = Vec::new();
        if !self.line_buf.is_empty() {
            let line = std::mem::take(&mut self.line_buf);
            self.process_line(&line, &mut events);
        }
        self.close_section(&mut events);
        events
    }

    fn process_line(&mut self, line: &str, events: &mut Vec<ThoughtEvent>) {
        if let Some(title) = section_header(line) {
            self.close_section(events);
            self.section_count += 1;
            self.section = format!("{}-{}", slugify(&title), self.section_count);
            self.section_started = true;
            events.push(ThoughtEvent::SectionStart {
                section: self.section.clone(),
            });
            return;
        }

        if line.trim().is_empty() && self.section_text.is_empty() {
            // Leading blank lines carry nothing.
            return;
        }

        if !self.section_started {
            self.section_started = true;
            events.push(ThoughtEvent::SectionStart {
                section: self.section.clone(),
            });
        }

        if !self.section_text.is_empty() {
            self.section_text.push('\n');
        }
        self.section_text.push_str(line);
        events.push(ThoughtEvent::Delta {
            section: self.section.clone(),
            text: line.to_string(),
        });
    }

    fn close_section(&mut self, events: &mut Vec<ThoughtEvent>) {
        if self.section_started && !self.section_text.is_empty() {
            events.push(ThoughtEvent::SectionEnd {
                section: self.section.clone(),
                text: std::mem::take(&mut self.section_text),
            });
        } else {
            self.section_text.clear();
        }
        self.section_started = false;
    }
}

impl Default for ThoughtStreamParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Recognize a section header line and return its title.
///
/// Headers are markdown headings (`# ...`, `## ...`) or step markers of the
/// form `Step N:`.
fn section_header(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if let Some(rest) = trimmed.strip_prefix("##") {
        let title = rest.trim_start_matches('#').trim();
        if !title.is_empty() {
            return Some(title.to_string());
        }
    } else if let Some(rest) = trimmed.strip_prefix("# ") {
        let title = rest.trim();
        if !title.is_empty() {
            return Some(title.to_string());
        }
    }

    if let Some(rest) = trimmed.strip_prefix("Step ") {
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        if !digits.is_empty() && rest[digits.len()..].starts_with(':') {
            return Some(format!("step {}", digits));
        }
    }

    None
}

/// Lowercase, alphanumeric-and-dashes section id from a header title.
fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_dash = true;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        "section".to_string()
    } else {
        slug
    }
}
