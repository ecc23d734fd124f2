//! Shared HTTP helpers for the hosted back-ends.

use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use tracing::warn;

/// Send a request, retrying exactly once after `delay` when the service
/// answers 503 (hosted models report "still loading" this way).
///
/// `build` is called once per attempt because a `RequestBuilder` is consumed
/// by `send`.
pub async fn send_with_loading_retry<F>(
    build: F,
    delay: Duration,
    service: &str,
) -> reqwest::Result<Response>
where
    F: Fn() -> RequestBuilder,
{
    let resp = build().send().await?;
    if resp.status() != StatusCode::SERVICE_UNAVAILABLE {
        return Ok(resp);
    }

    warn!(
        "{service} is still loading (503), retrying once in {:.1}s",
        delay.as_secs_f64()
    );
    tokio::time::sleep(delay).await;
    build().send().await
}

/// Best-effort short description of an error body for logs and warnings.
pub async fn error_detail(resp: Response) -> String {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let body: String = body.trim().chars().take(200).collect();
    if body.is_empty() {
        format!("status {status}")
    } else {
        format!("status {status}: {body}")
    }
}


#[cfg(test)]
mod tests {
    use super::testing::spawn_server;
    use super::*;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::post;
    use axum::Router;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn flaky_app(failures: usize, hits: Arc<AtomicUsize>) -> Router {
        Router::new().route(
            "/",
            post(move || {
                let hits = hits.clone();
                async move {
                    let n = hits.fetch_add(1, Ordering::SeqCst);
                    if n < failures {
                        (AxumStatus::SERVICE_UNAVAILABLE, "loading")
                    } else {
                        (AxumStatus::OK, "ready")
                    }
                }
            }),
        )
    }

    #[tokio::test]
    async fn retries_once_after_503() {
        let hits = Arc::new(AtomicUsize::new(0));
        let addr = spawn_server(flaky_app(1, hits.clone())).await;
        let client = reqwest::Client::new();
        let url = format!("http://{addr}/");

        let resp = send_with_loading_retry(|| client.post(&url), Duration::ZERO, "fake")
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn gives_up_after_second_503() {
        let hits = Arc::new(AtomicUsize::new(0));
        let addr = spawn_server(flaky_app(5, hits.clone())).await;
        let client = reqwest::Client::new();
        let url = format!("http://{addr}/");

        let resp = send_with_loading_retry(|| client.post(&url), Duration::ZERO, "fake")
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(error_detail(resp).await, "status 503 Service Unavailable: loading");
    }
}
