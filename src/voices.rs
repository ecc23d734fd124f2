//! Tones, narration voices and languages offered by the studio.

use serde::Serialize;

/// Voice id used when a label is not in [`VOICE_MAP`].
pub const DEFAULT_VOICE_ID: &str = "en-US-JennyNeural";

/// Display label → back-end voice id.
pub const VOICE_MAP: &[(&str, &str)] = &[
    ("Lisa (Female)", "en-US-JennyNeural"),
    ("Martin (Male)", "en-US-GuyNeural"),
    ("Sofia (Female)", "es-ES-ElviraNeural"),
    ("Ethan (Male)", "en-AU-WilliamNeural"),
    ("Ravi (Male)", "hi-IN-MadhurNeural"),
    ("Priya (Female)", "hi-IN-SwaraNeural"),
];

/// Resolve a voice label to a back-end voice id, falling back to Lisa.
pub fn voice_id(label: &str) -> &'static str {
    VOICE_MAP
        .iter()
        .find(|(l, _)| *l == label)
        .map(|(_, id)| *id)
        .unwrap_or(DEFAULT_VOICE_ID)
}

pub fn voice_labels() -> impl Iterator<Item = &'static str> {
    VOICE_MAP.iter().map(|(label, _)| *label)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tone {
    Inspiring,
    Suspenseful,
    Neutral,
    Romantic,
    Dramatic,
    Comedic,
    Empathetic,
    Narrative,
}

impl Tone {
    pub const ALL: [Tone; 8] = [
        Tone::Inspiring,
        Tone::Suspenseful,
        Tone::Neutral,
        Tone::Romantic,
        Tone::Dramatic,
        Tone::Comedic,
        Tone::Empathetic,
        Tone::Narrative,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Inspiring => "Inspiring",
            Self::Suspenseful => "Suspenseful",
            Self::Neutral => "Neutral",
            Self::Romantic => "Romantic",
            Self::Dramatic => "Dramatic",
            Self::Comedic => "Comedic",
            Self::Empathetic => "Empathetic",
            Self::Narrative => "Narrative",
        }
    }

    /// Case-insensitive lookup; `None` for blank or unknown input.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|tone| tone.label().eq_ignore_ascii_case(s))
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Narration language. Display metadata only: voice selection ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Language {
    #[default]
    English,
    Hindi,
    Telugu,
    Spanish,
    French,
    German,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::English,
        Language::Hindi,
        Language::Telugu,
        Language::Spanish,
        Language::French,
        Language::German,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Hindi => "Hindi",
            Self::Telugu => "Telugu",
            Self::Spanish => "Spanish",
            Self::French => "French",
            Self::German => "German",
        }
    }

    pub fn locale_hint(self) -> &'static str {
        match self {
            Self::English => "en-US",
            Self::Hindi => "hi-IN",
            Self::Telugu => "te-IN",
            Self::Spanish => "es-ES",
            Self::French => "fr-FR",
            Self::German => "de-DE",
        }
    }

    /// Unknown values parse to English.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|lang| lang.label().eq_ignore_ascii_case(s))
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_labels_map_to_their_voice() {
        assert_eq!(voice_id("Martin (Male)"), "en-US-GuyNeural");
        assert_eq!(voice_id("Priya (Female)"), "hi-IN-SwaraNeural");
    }

    #[test]
    fn unknown_labels_fall_back_to_default_voice() {
        assert_eq!(voice_id("Zed (Robot)"), DEFAULT_VOICE_ID);
        assert_eq!(voice_id(""), DEFAULT_VOICE_ID);
        // Lookup is exact; labels are presented verbatim by the form.
        assert_eq!(voice_id("martin (male)"), DEFAULT_VOICE_ID);
    }

    #[test]
    fn tone_parsing_is_case_insensitive_and_optional() {
        assert_eq!(Tone::parse("dramatic"), Some(Tone::Dramatic));
        assert_eq!(Tone::parse(" Comedic "), Some(Tone::Comedic));
        assert_eq!(Tone::parse(""), None);
        assert_eq!(Tone::parse("Sarcastic"), None);
    }

    #[test]
    fn unknown_language_is_english() {
        assert_eq!(Language::parse("Klingon"), Language::English);
        assert_eq!(Language::parse("german"), Language::German);
        assert_eq!(Language::Telugu.locale_hint(), "te-IN");
    }
}
