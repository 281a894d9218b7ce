//! Assembly of the text handed to embedding providers.
//!
//! A stored record embeds a composite of its descriptive fields rather than
//! any single one, so queries phrased against prerequisites or domain
//! vocabulary still land near the right vectors.

use crate::model::Solution;

/// Providers choke on very long inputs; anything beyond this is truncated.
const MAX_EMBED_CHARS: usize = 7000;

/// Only the head of the script carries signal worth embedding.
const SCRIPT_CONTEXT_LINES: usize = 5;

/// Build the composite embedding input for a solution.
///
/// Empty fields are skipped entirely so they contribute no label noise.
pub fn combined_embedding_text(solution: &Solution) -> String {
    let mut sections = Vec::new();

    if !solution.domain.trim().is_empty() {
        sections.push(format!("Domain: {}", solution.domain.trim()));
    }
    if !solution.summary.trim().is_empty() {
        sections.push(format!("Summary: {}", solution.summary.trim()));
    }
    if !solution.prerequisites.trim().is_empty() {
        sections.push(format!("Prerequisites: {}", solution.prerequisites.trim()));
    }
    if !solution.extra_info.trim().is_empty() {
        sections.push(format!(
            "Additional Information: {}",
            solution.extra_info.trim()
        ));
    }

    let script_head: Vec<&str> = solution
        .script
        .lines()
        .take(SCRIPT_CONTEXT_LINES)
        .collect();
    let script_head = script_head.join("\n");
    if !script_head.trim().is_empty() {
        sections.push(format!("Script Context: {}", script_head.trim()));
    }

    prepare(&sections.join("\n\n"))
}

/// Normalize whitespace and cap length at a character boundary.
fn prepare(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= MAX_EMBED_CHARS {
        return collapsed;
    }

    let truncated: String = collapsed.chars().take(MAX_EMBED_CHARS).collect();
    format!("{}...", truncated)
}
