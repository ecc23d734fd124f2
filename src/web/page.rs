//! HTML rendering for the studio page.

use std::fmt::Write;

use crate::history::NarrationRecord;
use crate::studio::Feedback;
use crate::voices::{voice_labels, Language, Tone};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; display: flex; color: #1c1c1c; }
aside { width: 260px; background: #eef7f9; padding: 20px; min-height: 100vh; }
main { flex: 1; padding: 24px 40px; max-width: 1100px; }
.brand { font-size: 26px; font-weight: bold; color: #00bcd4; }
label { color: #003366; font-weight: 600; display: block; margin-top: 12px; }
textarea { width: 100%; min-height: 220px; }
button { background: #00bcd4; color: white; border: 0; border-radius: 12px; padding: 8px 16px; font-weight: bold; cursor: pointer; }
button:hover { background: #008c9e; }
.columns { display: flex; gap: 24px; }
.columns > div { flex: 1; }
.panel { background: #f9f9f9; padding: 16px; border-radius: 12px; box-shadow: 0 4px 8px rgba(0,0,0,0.05); margin-top: 16px; }
.warning { background: #fff3cd; padding: 12px; border-radius: 8px; }
.error { background: #f8d7da; padding: 12px; border-radius: 8px; }
.muted { color: #5d6d7e; }
pre { white-space: pre-wrap; }
"#;

/// What the page shows besides the form and history.
#[derive(Debug, Default)]
pub struct PageView {
    pub result: Option<NarrationRecord>,
    pub warning: Option<String>,
    pub error: Option<String>,
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn options<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values
        .map(|v| {
            let v = escape(v);
            format!("<option value=\"{v}\">{v}</option>")
        })
        .collect()
}

fn render_form(out: &mut String) {
    let tones = options(Tone::ALL.iter().map(|t| t.label()));
    let voices = options(voice_labels());
    let languages: String = Language::ALL
        .iter()
        .map(|l| {
            format!(
                "<option value=\"{0}\">{0} ({1})</option>",
                l.label(),
                l.locale_hint()
            )
        })
        .collect();

    let _ = write!(
        out,
        r#"<form class="panel" method="post" action="/narrate" enctype="multipart/form-data">
<h2>Input</h2>
<label for="text">Enter original text</label>
<textarea id="text" name="text"></textarea>
<label for="file">…or upload a .txt file</label>
<input id="file" type="file" name="file" accept=".txt,text/plain">
<h2>Tone &amp; voice</h2>
<label for="tone">Tone</label><select id="tone" name="tone">{tones}</select>
<label for="voice">Voice</label><select id="voice" name="voice">{voices}</select>
<label for="language">Language</label><select id="language" name="language">{languages}</select>
<label for="title">Title (optional)</label><input id="title" name="title" placeholder="Leave blank for an automatic title">
<p><button type="submit">Rewrite and generate audio</button></p>
</form>
"#
    );
}

fn render_result(out: &mut String, view: &PageView) {
    if let Some(error) = &view.error {
        let _ = write!(out, "<p class=\"error\">{}</p>", escape(error));
    }
    if let Some(warning) = &view.warning {
        let _ = write!(
            out,
            "<p class=\"warning\">Rewrite unavailable ({}); the original text was narrated.</p>",
            escape(warning)
        );
    }
    let Some(record) = &view.result else {
        return;
    };
    let _ = write!(
        out,
        r#"<section class="panel">
<h2>{title}</h2>
<div class="columns">
<div><h4>Original text</h4><pre>{original}</pre></div>
<div><h4>Rewritten text</h4><pre>{rewritten}</pre></div>
</div>
<audio controls src="/narrations/{id}/audio"></audio>
<p><a id="result-audio" href="/narrations/{id}/audio">Download MP3</a> · <a id="result-text" href="/narrations/{id}/text">Download rewritten text</a></p>
</section>
"#,
        id = record.id,
        title = escape(&record.title),
        original = escape(&record.original_text),
        rewritten = escape(&record.rewritten_text),
    );
}

fn render_history(out: &mut String, history: &[NarrationRecord]) {
    out.push_str("<section class=\"panel\"><h2>Full narration history</h2>");
    if history.is_empty() {
        out.push_str("<p class=\"muted\">No narrations yet.</p>");
    }
    for record in history {
        let _ = write!(
            out,
            r#"<details>
<summary>{summary} <span class="muted">{created}</span></summary>
<p><strong>Original text:</strong> {original}</p>
<p><strong>Rewritten text:</strong> {rewritten}</p>
<audio controls src="/narrations/{id}/audio"></audio>
<p><a href="/narrations/{id}/audio">Download</a> · <a href="/narrations/{id}/text">Text</a></p>
<form method="post" action="/narrations/{id}/delete"><button type="submit">Delete</button></form>
</details>
"#,
            id = record.id,
            summary = escape(&record.summary()),
            created = record.created_at.format("%Y-%m-%d %H:%M:%S"),
            original = escape(&record.original_text),
            rewritten = escape(&record.rewritten_text),
        );
    }
    out.push_str("</section>");
}

fn render_feedback(out: &mut String, feedback: Feedback) {
    let _ = write!(
        out,
        r#"<section class="panel"><h2>Did you enjoy the last narration?</h2>
<form method="post" action="/feedback/love" style="display:inline"><button>😍 Love it! ({})</button></form>
<form method="post" action="/feedback/nice" style="display:inline"><button>👍 Nice! ({})</button></form>
<form method="post" action="/feedback/needs-work" style="display:inline"><button>🤔 Needs work ({})</button></form>
</section>
"#,
        feedback.love, feedback.nice, feedback.needs_work
    );
}

/// Render the full studio page.
pub fn render(view: &PageView, history: &[NarrationRecord], feedback: Feedback) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>EchoVerse – AI Audiobook Creator</title><style>{STYLE}</style></head><body>"
    );

    out.push_str("<aside><div class=\"brand\">🎧 EchoVerse</div><p>Your personal audiobook studio.</p><h4>Past narrations</h4><ul>");
    for record in history {
        let _ = write!(out, "<li>🔊 <em>{}</em></li>", escape(&record.title));
    }
    out.push_str("</ul></aside><main>");

    out.push_str("<h1>EchoVerse – AI Audiobook Creator</h1><p class=\"muted\">Craft expressive audiobooks using AI tone, voice, and language</p>");
    render_result(&mut out, view);
    render_form(&mut out);
    render_history(&mut out, history);
    render_feedback(&mut out, feedback);

    out.push_str("</main></body></html>");
    out
}
