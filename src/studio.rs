//! The studio pipeline: rewrite → narrate → record.
//!
//! One request at a time holds the history lock for the whole cycle, so
//! history order matches completion order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::RewriterBackend;
use crate::history::{HistoryStore, NarrationRecord};
use crate::narrator::{NarrateError, Narrator};
use crate::rewriter::Rewriter;
use crate::titles::{audio_file_name, resolve_title};
use crate::voices::{Language, Tone};

#[derive(Debug, Error)]
pub enum StudioError {
    #[error("please enter some text or upload a .txt file")]
    EmptyInput,

    #[error("audio generation failed: {0}")]
    Narration(#[from] NarrateError),
}

#[derive(Debug, Clone)]
pub struct NarrationRequest {
    pub text: String,
    pub tone: Option<Tone>,
    pub voice_label: String,
    pub language: Language,
    pub title: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NarrationOutcome {
    pub record: NarrationRecord,
    /// Set when the rewrite degraded and the original text was narrated.
    pub warning: Option<String>,
    /// History as it stood right after this record was added, newest first.
    pub history: Vec<NarrationRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Love,
    Nice,
    NeedsWork,
}

impl Reaction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "love" => Some(Self::Love),
            "nice" => Some(Self::Nice),
            "needs-work" | "needs_work" => Some(Self::NeedsWork),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct FeedbackCounters {
    love: AtomicU64,
    nice: AtomicU64,
    needs_work: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub love: u64,
    pub nice: u64,
    pub needs_work: u64,
}

pub struct Studio {
    rewriter: Arc<dyn Rewriter>,
    narrator: Narrator,
    history: Mutex<HistoryStore>,
    feedback: FeedbackCounters,
}

impl Studio {
    pub fn new(rewriter: Arc<dyn Rewriter>, narrator: Narrator) -> Self {
        Self {
            rewriter,
            narrator,
            history: Mutex::new(HistoryStore::new()),
            feedback: FeedbackCounters::default(),
        }
    }

    pub fn rewriter_backend(&self) -> RewriterBackend {
        self.rewriter.backend()
    }

    /// Run one full cycle. Nothing is recorded unless narration succeeds.
    pub async fn create(&self, request: NarrationRequest) -> Result<NarrationOutcome, StudioError> {
        let original = request.text.trim().to_string();
        if original.is_empty() {
            return Err(StudioError::EmptyInput);
        }

        let mut history = self.history.lock().await;
        let t_start = Instant::now();

        let rewrite = self.rewriter.rewrite(&original, request.tone).await;
        let warning = rewrite.warning().map(String::from);
        match &warning {
            Some(reason) => warn!("Rewrite degraded ({reason}), narrating the original text"),
            None => debug!("Rewrite ready: {} chars", rewrite.text().len()),
        }
        let rewritten = rewrite.into_text();

        let now = Local::now();
        let title = resolve_title(request.title.as_deref(), request.tone, now);
        let audio_path = self
            .narrator
            .narrate(&rewritten, &request.voice_label, &audio_file_name(&title))
            .await?;

        let record = NarrationRecord {
            id: history.next_id(),
            title,
            original_text: original,
            rewritten_text: rewritten,
            tone: request.tone,
            voice_label: request.voice_label,
            language: request.language,
            audio_path,
            created_at: now,
        };
        history.insert(record.clone());

        info!(
            "Narration #{} '{}' ready in {:.0}ms ({} in history)",
            record.id,
            record.title,
            t_start.elapsed().as_secs_f64() * 1000.0,
            history.len()
        );
        let snapshot = history.iter().cloned().collect();
        Ok(NarrationOutcome {
            record,
            warning,
            history: snapshot,
        })
    }

    /// Snapshot of the history, newest first.
    pub async fn history(&self) -> Vec<NarrationRecord> {
        self.history.lock().await.iter().cloned().collect()
    }

    pub async fn record(&self, id: u64) -> Option<NarrationRecord> {
        self.history.lock().await.find(id).cloned()
    }

    /// Drop the record with `id` from history, then best-effort remove its
    /// audio file once the lock is released.
    pub async fn delete(&self, id: u64) -> Option<NarrationRecord> {
        let record = {
            let mut history = self.history.lock().await;
            let index = history.position(id)?;
            history.delete(index)?
        };
        if let Err(e) = tokio::fs::remove_file(&record.audio_path).await {
            debug!(
                "Could not remove {} for deleted narration: {e}",
                record.audio_path.display()
            );
        }
        info!("Deleted narration #{} '{}'", record.id, record.title);
        Some(record)
    }

    pub fn react(&self, reaction: Reaction) {
        let counter = match reaction {
            Reaction::Love => &self.feedback.love,
            Reaction::Nice => &self.feedback.nice,
            Reaction::NeedsWork => &self.feedback.needs_work,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        info!("Feedback received: {reaction:?}");
    }

    pub fn feedback(&self) -> Feedback {
        Feedback {
            love: self.feedback.love.load(Ordering::Relaxed),
            nice: self.feedback.nice.load(Ordering::Relaxed),
            needs_work: self.feedback.needs_work.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::narrator::testing::FakeSynthesizer;
    use crate::rewriter::{RewriteOutcome, Rewriter};
    use async_trait::async_trait;
    use std::path::Path;

    /// Rewriter that prefixes the tone, or fails when `fail` is set.
    pub struct FakeRewriter {
        pub fail: bool,
    }

    #[async_trait]
    impl Rewriter for FakeRewriter {
        async fn rewrite(&self, text: &str, tone: Option<Tone>) -> RewriteOutcome {
            if self.fail {
                return RewriteOutcome::degraded(text, "cannot connect to Ollama");
            }
            let tone = tone.map(|t| t.label()).unwrap_or("Plain");
            RewriteOutcome::Rewritten(format!("[{tone}] {text}"))
        }

        fn backend(&self) -> RewriterBackend {
            RewriterBackend::Ollama
        }
    }

    pub fn studio(dir: &Path, rewrite_fails: bool, synth: FakeSynthesizer) -> Studio {
        Studio::new(
            Arc::new(FakeRewriter { fail: rewrite_fails }),
            Narrator::new(Arc::new(synth), dir),
        )
    }

    pub fn request(text: &str) -> NarrationRequest {
        NarrationRequest {
            text: text.to_string(),
            tone: Some(Tone::Dramatic),
            voice_label: "Martin (Male)".into(),
            language: Language::English,
            title: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{request, studio};
    use super::*;
    use crate::narrator::testing::FakeSynthesizer;
    use std::time::Duration;
    use tempfile::TempDir;

    #[tokio::test]
    async fn end_to_end_cycle_records_newest_first() {
        let dir = TempDir::new().unwrap();
        let studio = studio(dir.path(), false, FakeSynthesizer::returning(b"mp3-bytes"));
        studio.create(request("Earlier story.")).await.unwrap();

        let outcome = studio
            .create(request("The sun set over the hills."))
            .await
            .unwrap();

        let record = &outcome.record;
        assert!(outcome.warning.is_none());
        assert!(!record.rewritten_text.is_empty());
        assert_ne!(record.rewritten_text, record.original_text);
        assert!(record.title.starts_with("Dramatic_Story_"));
        assert_eq!(std::fs::read(&record.audio_path).unwrap(), b"mp3-bytes");

        let history = studio.history().await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].original_text, "The sun set over the hills.");
        assert_eq!(history[0].voice_label, "Martin (Male)");
    }

    #[tokio::test]
    async fn degraded_rewrite_narrates_original_with_warning() {
        let dir = TempDir::new().unwrap();
        let studio = studio(dir.path(), true, FakeSynthesizer::returning(b"a"));

        let outcome = studio.create(request("Untouched.")).await.unwrap();
        assert_eq!(outcome.record.rewritten_text, "Untouched.");
        assert_eq!(outcome.warning.as_deref(), Some("cannot connect to Ollama"));
        assert_eq!(studio.history().await.len(), 1);
    }

    #[tokio::test]
    async fn narration_failure_records_nothing() {
        let dir = TempDir::new().unwrap();
        let studio = studio(dir.path(), false, FakeSynthesizer::failing());

        let err = studio.create(request("Doomed.")).await.unwrap_err();
        assert!(matches!(err, StudioError::Narration(_)));
        assert!(studio.history().await.is_empty());
    }

    #[tokio::test]
    async fn blank_input_is_rejected() {
        let dir = TempDir::new().unwrap();
        let studio = studio(dir.path(), false, FakeSynthesizer::returning(b"a"));
        assert!(matches!(
            studio.create(request(" \n ")).await,
            Err(StudioError::EmptyInput)
        ));
    }

    #[tokio::test]
    async fn user_title_is_sanitized() {
        let dir = TempDir::new().unwrap();
        let studio = studio(dir.path(), false, FakeSynthesizer::returning(b"a"));
        let mut req = request("Text.");
        req.title = Some("Inspiring Story! #1".into());

        let outcome = studio.create(req).await.unwrap();
        assert_eq!(outcome.record.title, "Inspiring Story 1");
        assert_eq!(outcome.record.audio_path, dir.path().join("Inspiring Story 1.mp3"));
    }

    #[tokio::test]
    async fn delete_drops_record_and_audio() {
        let dir = TempDir::new().unwrap();
        let studio = studio(dir.path(), false, FakeSynthesizer::returning(b"a"));
        let mut req = request("Text.");
        req.title = Some("Keep".into());
        studio.create(req.clone()).await.unwrap();
        req.title = Some("Drop".into());
        studio.create(req).await.unwrap();

        // ids follow creation order: Keep=1, Drop=2
        let removed = studio.delete(2).await.unwrap();
        assert_eq!(removed.title, "Drop");
        assert!(!dir.path().join("Drop.mp3").exists());
        assert!(dir.path().join("Keep.mp3").exists());
        assert!(studio.delete(2).await.is_none());
        assert!(studio.delete(5).await.is_none());
        assert_eq!(studio.record(1).await.unwrap().title, "Keep");
    }

    #[tokio::test]
    async fn missing_audio_file_does_not_block_delete() {
        let dir = TempDir::new().unwrap();
        let studio = studio(dir.path(), false, FakeSynthesizer::returning(b"a"));
        let record = studio.create(request("Text.")).await.unwrap().record;
        std::fs::remove_file(&record.audio_path).unwrap();

        assert!(studio.delete(record.id).await.is_some());
        assert!(studio.history().await.is_empty());
    }

    #[tokio::test]
    async fn overlapping_creates_each_get_their_own_record() {
        let dir = TempDir::new().unwrap();
        let studio = studio(
            dir.path(),
            false,
            FakeSynthesizer::slow(b"a", Duration::from_millis(200)),
        );
        let mut first = request("One.");
        first.title = Some("First".into());
        let mut second = request("Two.");
        second.title = Some("Second".into());

        let (a, b) = tokio::join!(studio.create(first), studio.create(second));
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_ne!(a.record.id, b.record.id);
        assert_eq!(studio.record(a.record.id).await.unwrap().title, "First");
        assert_eq!(studio.record(b.record.id).await.unwrap().title, "Second");
        // Each snapshot has its own record on top, whatever ran later.
        assert_eq!(a.history[0].id, a.record.id);
        assert_eq!(b.history[0].id, b.record.id);
        assert_eq!(studio.history().await.len(), 2);
    }

    #[test]
    fn feedback_counts_reactions() {
        let dir = TempDir::new().unwrap();
        let studio = studio(dir.path(), false, FakeSynthesizer::default());
        studio.react(Reaction::Love);
        studio.react(Reaction::Love);
        studio.react(Reaction::parse("needs-work").unwrap());
        assert_eq!(
            studio.feedback(),
            Feedback { love: 2, nice: 0, needs_work: 1 }
        );
        assert_eq!(Reaction::parse("meh"), None);
    }
}
