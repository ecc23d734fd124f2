//! Browser front-end and JSON API.
//!
//! Routes:
//! - `GET /`                          studio page (form, history, feedback)
//! - `POST /narrate`                  multipart form → rewrite + narrate
//! - `GET /narrations/{id}/audio`     download narration audio
//! - `GET /narrations/{id}/text`      download rewritten text
//! - `POST /narrations/{id}/delete`
//! - `POST /feedback/{reaction}`
//! - `GET /api/status`, `GET /api/narrations`

mod page;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::{info, warn};

use crate::history::NarrationRecord;
use crate::studio::{Feedback, NarrationRequest, Reaction, Studio, StudioError};
use crate::titles::AUDIO_EXTENSION;
use crate::voices::{Language, Tone};

use page::PageView;

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub studio: Arc<Studio>,
}

#[derive(Serialize)]
struct StatusResponse {
    rewriter: String,
    narrations: usize,
    feedback: Feedback,
}

/// Build the axum router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/narrate", post(handle_narrate))
        .route("/narrations/{id}/audio", get(handle_audio))
        .route("/narrations/{id}/text", get(handle_text))
        .route("/narrations/{id}/delete", post(handle_delete))
        .route("/feedback/{reaction}", post(handle_feedback))
        .route("/api/status", get(handle_status))
        .route("/api/narrations", get(handle_list))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Serve the studio until the process is stopped.
pub async fn serve(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("EchoVerse studio listening on http://{addr}");
    axum::serve(listener, router(state)).await
}

// --- Handlers ---

async fn render(state: &AppState, view: PageView) -> Html<String> {
    let history = state.studio.history().await;
    render_with(state, view, &history)
}

fn render_with(state: &AppState, view: PageView, history: &[NarrationRecord]) -> Html<String> {
    Html(page::render(&view, history, state.studio.feedback()))
}

async fn handle_index(State(state): State<AppState>) -> Html<String> {
    render(&state, PageView::default()).await
}

/// Raw form fields as submitted.
#[derive(Default)]
struct NarrateForm {
    text: String,
    file: Option<String>,
    tone: String,
    voice: String,
    language: String,
    title: String,
}

enum FormError {
    Multipart(MultipartError),
    NotUtf8,
}

impl From<MultipartError> for FormError {
    fn from(e: MultipartError) -> Self {
        Self::Multipart(e)
    }
}

impl IntoResponse for FormError {
    fn into_response(self) -> Response {
        match self {
            Self::Multipart(e) => e.into_response(),
            Self::NotUtf8 => (
                StatusCode::BAD_REQUEST,
                "uploaded file is not valid UTF-8 text",
            )
                .into_response(),
        }
    }
}

async fn read_form(mut multipart: Multipart) -> Result<NarrateForm, FormError> {
    let mut form = NarrateForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    let content =
                        String::from_utf8(bytes.to_vec()).map_err(|_| FormError::NotUtf8)?;
                    form.file = Some(content);
                }
            }
            "text" => form.text = field.text().await?,
            "tone" => form.tone = field.text().await?,
            "voice" => form.voice = field.text().await?,
            "language" => form.language = field.text().await?,
            "title" => form.title = field.text().await?,
            other => warn!("Ignoring unexpected form field '{other}'"),
        }
    }
    Ok(form)
}

impl NarrateForm {
    fn into_request(self) -> NarrationRequest {
        // Uploaded content wins over the text area when both are present.
        let text = match self.file {
            Some(content) if !content.trim().is_empty() => content,
            _ => self.text,
        };
        let title = Some(self.title).filter(|t| !t.trim().is_empty());
        NarrationRequest {
            text,
            tone: Tone::parse(&self.tone),
            voice_label: self.voice,
            language: Language::parse(&self.language),
            title,
        }
    }
}

async fn handle_narrate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, FormError> {
    let request = read_form(multipart).await?.into_request();
    info!(
        "POST /narrate: {} chars, tone={:?}, voice='{}', language={}",
        request.text.len(),
        request.tone,
        request.voice_label,
        request.language
    );

    match state.studio.create(request).await {
        Ok(outcome) => {
            // Render from the snapshot taken under the history lock; a
            // submission queued behind this one may already have landed.
            let view = PageView {
                result: Some(outcome.record),
                warning: outcome.warning,
                error: None,
            };
            Ok(render_with(&state, view, &outcome.history).into_response())
        }
        Err(e) => {
            let status = match e {
                StudioError::EmptyInput => StatusCode::UNPROCESSABLE_ENTITY,
                StudioError::Narration(_) => StatusCode::BAD_GATEWAY,
            };
            warn!("Narration failed: {e}");
            let view = PageView {
                error: Some(e.to_string()),
                ..PageView::default()
            };
            Ok((status, render(&state, view).await).into_response())
        }
    }
}

fn attachment(title: &str, extension: &str) -> HeaderValue {
    let ascii: String = title
        .chars()
        .map(|c| if c.is_ascii() && c != '"' { c } else { '_' })
        .collect();
    HeaderValue::from_str(&format!("attachment; filename=\"{ascii}.{extension}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

async fn find_record(state: &AppState, id: u64) -> Result<NarrationRecord, StatusCode> {
    state
        .studio
        .record(id)
        .await
        .ok_or(StatusCode::NOT_FOUND)
}

async fn handle_audio(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Response, StatusCode> {
    let record = find_record(&state, id).await?;
    let audio = tokio::fs::read(&record.audio_path).await.map_err(|e| {
        warn!("Cannot read {}: {e}", record.audio_path.display());
        StatusCode::NOT_FOUND
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("audio/mpeg")),
            (
                header::CONTENT_DISPOSITION,
                attachment(&record.title, AUDIO_EXTENSION),
            ),
        ],
        audio,
    )
        .into_response())
}

async fn handle_text(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Response, StatusCode> {
    let record = find_record(&state, id).await?;
    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            ),
            (header::CONTENT_DISPOSITION, attachment(&record.title, "txt")),
        ],
        record.rewritten_text,
    )
        .into_response())
}

async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Redirect, StatusCode> {
    state
        .studio
        .delete(id)
        .await
        .map(|_| Redirect::to("/"))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn handle_feedback(
    State(state): State<AppState>,
    Path(reaction): Path<String>,
) -> Result<Redirect, StatusCode> {
    let reaction = Reaction::parse(&reaction).ok_or(StatusCode::NOT_FOUND)?;
    state.studio.react(reaction);
    Ok(Redirect::to("/"))
}

async fn handle_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        rewriter: state.studio.rewriter_backend().to_string(),
        narrations: state.studio.history().await.len(),
        feedback: state.studio.feedback(),
    })
}

async fn handle_list(State(state): State<AppState>) -> Json<Vec<NarrationRecord>> {
    Json(state.studio.history().await)
}
