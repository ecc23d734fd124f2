//! Narration titles and the file names derived from them.

use chrono::{DateTime, Local};

use crate::voices::Tone;

pub const AUDIO_EXTENSION: &str = "mp3";

/// Longest title in bytes. Leaves room for the extension under the usual
/// 255-byte file name limit.
pub const MAX_TITLE_BYTES: usize = 200;

/// Keep letters, digits, space, `-` and `_`; drop everything else and
/// trailing whitespace. Long titles are cut to [`MAX_TITLE_BYTES`] on a
/// char boundary.
pub fn sanitize_title(title: &str) -> String {
    let mut kept: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    if kept.len() > MAX_TITLE_BYTES {
        let cut = (0..=MAX_TITLE_BYTES)
            .rev()
            .find(|&i| kept.is_char_boundary(i))
            .unwrap_or(0);
        kept.truncate(cut);
    }
    kept.trim_end().to_string()
}

/// Title used when the user leaves it blank, e.g. `Dramatic_Story_2025-01-31_18-04-05`.
pub fn default_title(tone: Option<Tone>, now: DateTime<Local>) -> String {
    let stamp = now.format("%Y-%m-%d_%H-%M-%S");
    match tone {
        Some(tone) => format!("{}_Story_{stamp}", tone.label()),
        None => format!("Narration_{stamp}"),
    }
}

/// Resolve the user's title to a filesystem-safe one, falling back to the
/// default when nothing usable is left.
pub fn resolve_title(requested: Option<&str>, tone: Option<Tone>, now: DateTime<Local>) -> String {
    let sanitized = requested.map(sanitize_title).unwrap_or_default();
    if sanitized.trim().is_empty() {
        default_title(tone, now)
    } else {
        sanitized
    }
}

pub fn audio_file_name(title: &str) -> String {
    format!("{title}.{AUDIO_EXTENSION}")
}
