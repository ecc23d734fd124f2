//! Narration history for the lifetime of the process.
//!
//! Records are kept newest first. Nothing is persisted; a restart starts
//! from an empty history while audio files stay on disk.

use std::collections::VecDeque;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::debug;

use crate::voices::{Language, Tone};

/// One completed rewrite + narrate cycle.
#[derive(Debug, Clone, Serialize)]
pub struct NarrationRecord {
    /// Stable for the lifetime of the process; positions shift, ids don't.
    pub id: u64,
    pub title: String,
    pub original_text: String,
    pub rewritten_text: String,
    pub tone: Option<Tone>,
    pub voice_label: String,
    pub language: Language,
    pub audio_path: PathBuf,
    pub created_at: DateTime<Local>,
}

impl NarrationRecord {
    /// One-line label used in listings, e.g. `Dusk (Dramatic, Martin (Male), English)`.
    pub fn summary(&self) -> String {
        let tone = self.tone.map(|t| t.label()).unwrap_or("No tone");
        format!(
            "{} ({tone}, {}, {})",
            self.title, self.voice_label, self.language
        )
    }
}

#[derive(Debug, Default)]
pub struct HistoryStore {
    records: VecDeque<NarrationRecord>,
    last_id: u64,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the id for the next record. Ids start at 1 and are never reused.
    pub fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    /// Prepend a record; index 0 is always the newest.
    pub fn insert(&mut self, record: NarrationRecord) {
        debug!("History: adding #{} '{}'", record.id, record.title);
        self.records.push_front(record);
    }

    /// Remove the record at `index`. The caller owns removing its audio file.
    pub fn delete(&mut self, index: usize) -> Option<NarrationRecord> {
        let record = self.records.remove(index)?;
        debug!("History: deleted #{} '{}'", record.id, record.title);
        Some(record)
    }

    pub fn get(&self, index: usize) -> Option<&NarrationRecord> {
        self.records.get(index)
    }

    /// Current position of the record with `id`, if it is still listed.
    pub fn position(&self, id: u64) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    pub fn find(&self, id: u64) -> Option<&NarrationRecord> {
        self.position(id).and_then(|index| self.get(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &NarrationRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
