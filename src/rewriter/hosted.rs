//! Rewriting through a hosted inference API.
//!
//! Request: `{"inputs": prompt, "parameters": {...}}`, bearer token auth.
//! Response: `[{"generated_text": "..."}]` (a bare object is accepted too).
//! A cold model answers 503 while it loads; that is retried once.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, info, warn};

use super::{build_prompt, finish, RewriteOutcome, Rewriter};
use crate::config::{RewriterBackend, RewriterConfig};
use crate::http::{error_detail, send_with_loading_retry};
use crate::voices::Tone;

pub struct HostedRewriter {
    url: String,
    token: Option<String>,
    temperature: f32,
    top_p: f32,
    max_new_tokens: u32,
    loading_retry_delay: Duration,
    client: Client,
}

impl HostedRewriter {
    pub fn new(config: &RewriterConfig, token: Option<String>) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            url: config.hosted_url.clone(),
            token,
            temperature: config.temperature,
            top_p: config.top_p,
            max_new_tokens: config.max_new_tokens,
            loading_retry_delay: config.loading_retry_delay(),
            client,
        })
    }

    fn generated_text(data: &serde_json::Value) -> Option<&str> {
        match data {
            serde_json::Value::Array(items) => items.first()?["generated_text"].as_str(),
            other => other["generated_text"].as_str(),
        }
    }
}

#[async_trait]
impl Rewriter for HostedRewriter {
    async fn rewrite(&self, text: &str, tone: Option<Tone>) -> RewriteOutcome {
        if text.trim().is_empty() {
            return RewriteOutcome::degraded(text, "nothing to rewrite");
        }

        let t_start = Instant::now();
        let prompt = build_prompt(text, tone);
        let body = json!({
            "inputs": prompt,
            "parameters": {
                "temperature": self.temperature,
                "top_p": self.top_p,
                "max_new_tokens": self.max_new_tokens,
                "do_sample": true,
                "return_full_text": false
            }
        });
        debug!("Sending {} chars to hosted model {}", text.len(), self.url);

        let build = || {
            let req = self.client.post(&self.url).json(&body);
            match &self.token {
                Some(token) => req.bearer_auth(token),
                None => req,
            }
        };

        let resp = match send_with_loading_retry(build, self.loading_retry_delay, "hosted model").await {
            Ok(resp) => resp,
            Err(e) => {
                let reason = if e.is_timeout() {
                    "hosted model request timed out".to_string()
                } else {
                    format!("hosted model request failed: {e}")
                };
                warn!("{reason}");
                return RewriteOutcome::degraded(text, reason);
            }
        };

        if !resp.status().is_success() {
            let detail = error_detail(resp).await;
            warn!("Hosted model returned {detail}");
            return RewriteOutcome::degraded(text, format!("hosted model returned {detail}"));
        }

        let data = match resp.json::<serde_json::Value>().await {
            Ok(data) => data,
            Err(e) => {
                warn!("Failed to parse hosted model response: {e}");
                return RewriteOutcome::degraded(text, "malformed response from hosted model");
            }
        };

        let Some(raw) = Self::generated_text(&data) else {
            warn!("Hosted model response has no generated_text");
            return RewriteOutcome::degraded(text, "malformed response from hosted model");
        };

        let outcome = finish(text, &prompt, raw);
        if let RewriteOutcome::Rewritten(ref rewritten) = outcome {
            info!(
                "Hosted rewrite {} chars → {} chars ({:.0}ms)",
                text.len(),
                rewritten.len(),
                t_start.elapsed().as_secs_f64() * 1000.0
            );
        }
        outcome
    }

    fn backend(&self) -> RewriterBackend {
        RewriterBackend::Hosted
    }
}
