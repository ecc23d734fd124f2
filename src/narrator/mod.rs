//! Narration: text → voice id → synthesized audio → file on disk.
//!
//! The synthesis back-end sits behind [`SpeechSynthesizer`]; the shipped
//! implementation talks to an OpenAI-compatible speech endpoint (see
//! [`http::HttpSynthesizer`]). The narrator buffers the whole stream in
//! memory, removes any previous file at the target path, then writes.

pub mod http;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use crate::voices::voice_id;

#[derive(Debug, Error)]
pub enum NarrateError {
    #[error("there is no text to narrate")]
    EmptyText,

    #[error("speech service request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("speech service returned {0}")]
    Status(String),

    #[error("speech service returned no audio")]
    EmptyAudio,

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Turns text into encoded audio bytes.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>, NarrateError>;
}

pub struct Narrator {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    output_dir: PathBuf,
}

impl Narrator {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            synthesizer,
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Narrate `text` with the voice behind `voice_label` into
    /// `<output_dir>/<output_name>`, replacing any file already there.
    pub async fn narrate(
        &self,
        text: &str,
        voice_label: &str,
        output_name: &str,
    ) -> Result<PathBuf, NarrateError> {
        if text.trim().is_empty() {
            return Err(NarrateError::EmptyText);
        }

        let voice = voice_id(voice_label);
        debug!("Voice '{voice_label}' → {voice}");

        let t_start = Instant::now();
        let audio = self.synthesizer.synthesize(text, voice).await?;
        if audio.is_empty() {
            return Err(NarrateError::EmptyAudio);
        }

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| NarrateError::Io {
                path: self.output_dir.clone(),
                source,
            })?;

        let path = self.output_dir.join(output_name);
        // Remove first: a failed write leaves no file rather than a stale one.
        match tokio::fs::remove_file(&path).await {
            Ok(()) => debug!("Replaced existing narration {}", path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => return Err(NarrateError::Io { path, source }),
        }
        tokio::fs::write(&path, &audio)
            .await
            .map_err(|source| NarrateError::Io {
                path: path.clone(),
                source,
            })?;

        info!(
            "Narrated {} chars with {voice} → {} ({} bytes, {:.0}ms)",
            text.len(),
            path.display(),
            audio.len(),
            t_start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(path)
    }
}
