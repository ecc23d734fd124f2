//! Cleanup of raw model output before it is narrated.
//!
//! Causal models echo the prompt and instruction-tuned models like to add
//! "Answer:"-style scaffolding. Both are removed here.

/// Lines whose lower-cased form starts with one of these are dropped.
pub const DROPPED_LINE_PREFIXES: &[&str] = &["input:", "question:", "answer:", "response:", "--"];

/// Strip the echoed prompt and scaffolding lines from a model response.
pub fn clean_rewrite(prompt: &str, raw: &str) -> String {
    let raw = raw.trim();
    let prompt = prompt.trim();
    let body = if !prompt.is_empty() {
        raw.strip_prefix(prompt).unwrap_or(raw)
    } else {
        raw
    };

    body.lines()
        .filter(|line| !is_scaffolding(line))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn is_scaffolding(line: &str) -> bool {
    let lower = line.to_lowercase();
    DROPPED_LINE_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}
