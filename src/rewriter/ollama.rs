//! Rewriting through a local model served by Ollama.
//!
//! Sends the tone prompt to Ollama's /api/generate endpoint. Falls back to
//! the original text if Ollama is unavailable.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, info, warn};

use super::{build_prompt, finish, RewriteOutcome, Rewriter};
use crate::config::{RewriterBackend, RewriterConfig};
use crate::voices::Tone;

pub struct OllamaRewriter {
    model: String,
    host: String,
    temperature: f32,
    top_p: f32,
    max_new_tokens: u32,
    client: Client,
}

impl OllamaRewriter {
    pub fn new(config: &RewriterConfig) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            model: config.model.clone(),
            host: config.host.trim_end_matches('/').to_string(),
            temperature: config.temperature,
            top_p: config.top_p,
            max_new_tokens: config.max_new_tokens,
            client,
        })
    }
}

#[async_trait]
impl Rewriter for OllamaRewriter {
    async fn rewrite(&self, text: &str, tone: Option<Tone>) -> RewriteOutcome {
        if text.trim().is_empty() {
            return RewriteOutcome::degraded(text, "nothing to rewrite");
        }

        let t_start = Instant::now();
        let prompt = build_prompt(text, tone);
        debug!("Sending to Ollama model '{}': {} chars", self.model, text.len());

        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": self.temperature,
                "top_p": self.top_p,
                "num_predict": self.max_new_tokens
            }
        });

        let url = format!("{}/api/generate", self.host);

        let resp = match self.client.post(&url).json(&body).send().await {
            Ok(resp) => resp,
            Err(e) => {
                let reason = if e.is_connect() {
                    format!("cannot connect to Ollama at {}", self.host)
                } else if e.is_timeout() {
                    "Ollama request timed out".to_string()
                } else {
                    format!("Ollama request failed: {e}")
                };
                warn!("{reason}");
                return RewriteOutcome::degraded(text, reason);
            }
        };

        if !resp.status().is_success() {
            let detail = crate::http::error_detail(resp).await;
            warn!("Ollama returned {detail}");
            return RewriteOutcome::degraded(text, format!("Ollama returned {detail}"));
        }

        let data = match resp.json::<serde_json::Value>().await {
            Ok(data) => data,
            Err(e) => {
                warn!("Failed to parse Ollama response: {e}");
                return RewriteOutcome::degraded(text, "malformed response from Ollama");
            }
        };

        let raw = data["response"].as_str().unwrap_or("");
        let outcome = finish(text, &prompt, raw);
        if let RewriteOutcome::Rewritten(ref rewritten) = outcome {
            info!(
                "Rewrote {} chars → {} chars ({:.0}ms)",
                text.len(),
                rewritten.len(),
                t_start.elapsed().as_secs_f64() * 1000.0
            );
        }
        outcome
    }

    fn backend(&self) -> RewriterBackend {
        RewriterBackend::Ollama
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::spawn_server;
    use axum::routing::post;
    use axum::{Json, Router};

    fn config_for(host: String) -> RewriterConfig {
        RewriterConfig {
            host,
            timeout_secs: 5,
            ..RewriterConfig::default()
        }
    }

    #[tokio::test]
    async fn unreachable_ollama_returns_original_text() {
        // Port 1 is reserved and refuses connections.
        let rewriter = OllamaRewriter::new(&config_for("http://127.0.0.1:1".into())).unwrap();
        let outcome = rewriter.rewrite("Keep me.", Some(Tone::Neutral)).await;
        assert_eq!(outcome.text(), "Keep me.");
        assert!(outcome.warning().is_some());
    }

    #[tokio::test]
    async fn sends_sampling_options_and_cleans_response() {
        let app = Router::new().route(
            "/api/generate",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["stream"], false);
                assert_eq!(body["options"]["num_predict"], 200);
                let prompt = body["prompt"].as_str().unwrap().to_string();
                assert!(prompt.contains("suspenseful"));
                Json(json!({
                    "response": format!("{prompt} The door creaked.\nResponse: (done)")
                }))
            }),
        );
        let addr = spawn_server(app).await;
        let rewriter = OllamaRewriter::new(&config_for(format!("http://{addr}"))).unwrap();

        let outcome = rewriter.rewrite("A door opened.", Some(Tone::Suspenseful)).await;
        assert_eq!(outcome, RewriteOutcome::Rewritten("The door creaked.".into()));
    }

    #[tokio::test]
    async fn error_status_degrades() {
        let app = Router::new().route(
            "/api/generate",
            post(|| async { (axum::http::StatusCode::NOT_FOUND, "model not found") }),
        );
        let addr = spawn_server(app).await;
        let rewriter = OllamaRewriter::new(&config_for(format!("http://{addr}"))).unwrap();

        let outcome = rewriter.rewrite("Original.", None).await;
        assert_eq!(outcome.text(), "Original.");
        assert!(outcome.warning().unwrap().contains("404"));
    }

    #[tokio::test]
    async fn blank_input_is_not_sent() {
        let rewriter = OllamaRewriter::new(&config_for("http://127.0.0.1:1".into())).unwrap();
        let outcome = rewriter.rewrite("   ", None).await;
        assert_eq!(outcome.warning(), Some("nothing to rewrite"));
    }
}
