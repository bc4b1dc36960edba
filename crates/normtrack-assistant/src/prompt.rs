//! Prompt construction for the inference endpoint.
//!
//! Pure string building; deterministic given the same context window and
//! query.

use crate::context::Turn;

/// Delimiter the instruct model family uses to mark end-of-instruction.
/// Generated text before (and including) the last occurrence is prompt echo.
pub const END_OF_INSTRUCTION: &str = "[/INST]";

/// Fixed system instruction describing the assistant's domain.
pub const SYSTEM_INSTRUCTION: &str = "You are an ISO Management System expert assistant.";

/// Build the grounded prompt for a chat query.
///
/// Embeds the system instruction, the supplied recent turns as alternating
/// `Q:`/`A:` lines, and the new query, wrapped in the instruct template.
pub fn format_prompt(recent_turns: &[Turn], query: &str) -> String {
    let context_str = recent_turns
        .iter()
        .map(|t| format!("Q: {}\nA: {}", t.query, t.answer))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "<s>[INST] {}\nPrevious conversation:\n{}\n\nCurrent question about ISO standards, SOPs, HIRARC, or Auditing:\n{}\n\nPlease provide a professional, detailed, and contextually relevant response. [/INST]</s>",
        SYSTEM_INSTRUCTION, context_str, query
    )
}

/// Build the one-off prompt asking for an example value for a form field.
pub fn field_suggestion_prompt(field_name: &str, form_type: &str) -> String {
    format!(
        "Please provide a professional example or suggestion for the {} field in a {} form. Keep it concise and relevant to ISO management systems.",
        field_name, form_type
    )
}
