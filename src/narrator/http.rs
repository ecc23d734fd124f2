//! Speech synthesis over an OpenAI-compatible `/v1/audio/speech` endpoint.
//!
//! Works with Edge TTS bridges that accept Azure neural voice names
//! (`en-US-JennyNeural`, ...) as the `voice` field. The response body is
//! read chunk by chunk and buffered.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::{NarrateError, SpeechSynthesizer};
use crate::config::NarratorConfig;
use crate::http::{error_detail, send_with_loading_retry};

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
}

pub struct HttpSynthesizer {
    endpoint: String,
    model: String,
    response_format: String,
    api_key: Option<String>,
    loading_retry_delay: Duration,
    client: Client,
}

impl HttpSynthesizer {
    pub fn new(config: &NarratorConfig, api_key: Option<String>) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            response_format: config.response_format.clone(),
            api_key,
            loading_retry_delay: config.loading_retry_delay(),
            client,
        })
    }

    pub fn from_config(config: &NarratorConfig) -> reqwest::Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.is_empty());
        Self::new(config, api_key)
    }
}

#[async_trait]
impl SpeechSynthesizer for HttpSynthesizer {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>, NarrateError> {
        let body = SpeechRequest {
            model: &self.model,
            input: text,
            voice: voice_id,
            response_format: &self.response_format,
        };

        let build = || {
            let req = self.client.post(&self.endpoint).json(&body);
            match &self.api_key {
                Some(key) => req.bearer_auth(key),
                None => req,
            }
        };

        let mut resp =
            send_with_loading_retry(build, self.loading_retry_delay, "speech service").await?;
        if !resp.status().is_success() {
            return Err(NarrateError::Status(error_detail(resp).await));
        }

        let mut audio = Vec::new();
        let mut chunks = 0usize;
        while let Some(chunk) = resp.chunk().await? {
            audio.extend_from_slice(&chunk);
            chunks += 1;
        }
        debug!("Received {} bytes of audio in {chunks} chunks", audio.len());
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::spawn_server;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};

    fn synthesizer_for(endpoint: String) -> HttpSynthesizer {
        let config = NarratorConfig {
            endpoint,
            timeout_secs: 5,
            loading_retry_delay_secs: 0,
            ..NarratorConfig::default()
        };
        HttpSynthesizer::new(&config, None).unwrap()
    }

    #[tokio::test]
    async fn posts_voice_and_collects_audio() {
        let app = Router::new().route(
            "/v1/audio/speech",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["voice"], "en-US-GuyNeural");
                assert_eq!(body["response_format"], "mp3");
                assert_eq!(body["input"], "Good evening.");
                vec![7u8; 4096]
            }),
        );
        let addr = spawn_server(app).await;
        let synth = synthesizer_for(format!("http://{addr}/v1/audio/speech"));

        let audio = synth.synthesize("Good evening.", "en-US-GuyNeural").await.unwrap();
        assert_eq!(audio, vec![7u8; 4096]);
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let app = Router::new().route(
            "/v1/audio/speech",
            post(|| async { (StatusCode::BAD_REQUEST, "invalid voice") }),
        );
        let addr = spawn_server(app).await;
        let synth = synthesizer_for(format!("http://{addr}/v1/audio/speech"));

        let err = synth.synthesize("Hi.", "xx").await.unwrap_err();
        assert!(matches!(err, NarrateError::Status(ref s) if s.contains("invalid voice")));
    }
}
