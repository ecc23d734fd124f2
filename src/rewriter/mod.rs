//! Tone rewriting through a text-generation back-end.
//!
//! Back-ends:
//! - `ollama`: local model behind Ollama's /api/generate
//! - `hosted`: hosted inference API with bearer auth and a 503 warm-up retry
//! - `disabled`: never calls out, always hands back the original text
//!
//! A rewrite never fails the caller. Every failure folds into
//! [`RewriteOutcome::Degraded`] carrying the original text and a reason.

pub mod hosted;
pub mod ollama;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::config::{RewriterBackend, RewriterConfig};
use crate::normalize::clean_rewrite;
use crate::voices::Tone;

const PROMPT_TEMPLATE: &str = r#"Rewrite the following text{tone_clause}. Preserve its meaning and keep it suitable for narration as an audiobook.

Output ONLY the rewritten text, nothing else.

Text: {text}

Rewritten:"#;

/// Result of a rewrite attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteOutcome {
    Rewritten(String),
    /// The back-end could not produce a rewrite; `text` is the original input.
    Degraded { text: String, reason: String },
}

impl RewriteOutcome {
    pub fn degraded(text: &str, reason: impl Into<String>) -> Self {
        Self::Degraded {
            text: text.to_string(),
            reason: reason.into(),
        }
    }

    /// The text to narrate, rewritten or not.
    pub fn text(&self) -> &str {
        match self {
            Self::Rewritten(text) | Self::Degraded { text, .. } => text,
        }
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            Self::Rewritten(_) => None,
            Self::Degraded { reason, .. } => Some(reason),
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Rewritten(text) | Self::Degraded { text, .. } => text,
        }
    }
}

#[async_trait]
pub trait Rewriter: Send + Sync {
    async fn rewrite(&self, text: &str, tone: Option<Tone>) -> RewriteOutcome;

    fn backend(&self) -> RewriterBackend;
}

/// Build the instruction sent to the model.
pub fn build_prompt(text: &str, tone: Option<Tone>) -> String {
    let tone_clause = tone
        .map(|t| format!(" in a {} tone", t.label().to_lowercase()))
        .unwrap_or_default();
    PROMPT_TEMPLATE
        .replace("{tone_clause}", &tone_clause)
        .replace("{text}", text.trim())
}

/// Clean a raw model response into the final outcome.
pub(crate) fn finish(original: &str, prompt: &str, raw: &str) -> RewriteOutcome {
    let cleaned = clean_rewrite(prompt, raw);
    if cleaned.is_empty() {
        warn!("Rewriter returned nothing usable, using original text");
        RewriteOutcome::degraded(original, "the model returned an empty rewrite")
    } else {
        RewriteOutcome::Rewritten(cleaned)
    }
}

/// Rewriter that never rewrites.
pub struct DisabledRewriter;

#[async_trait]
impl Rewriter for DisabledRewriter {
    async fn rewrite(&self, text: &str, _tone: Option<Tone>) -> RewriteOutcome {
        RewriteOutcome::degraded(text, "rewriting is disabled")
    }

    fn backend(&self) -> RewriterBackend {
        RewriterBackend::Disabled
    }
}

/// Construct the configured back-end.
pub fn from_config(config: &RewriterConfig) -> reqwest::Result<Arc<dyn Rewriter>> {
    Ok(match config.backend {
        RewriterBackend::Ollama => Arc::new(ollama::OllamaRewriter::new(config)?),
        RewriterBackend::Hosted => {
            let token = std::env::var(&config.api_token_env).ok();
            if token.is_none() {
                warn!(
                    "{} is not set, calling the hosted model anonymously",
                    config.api_token_env
                );
            }
            Arc::new(hosted::HostedRewriter::new(config, token)?)
        }
        RewriterBackend::Disabled => Arc::new(DisabledRewriter),
    })
}
