//! HTTP routes and handlers

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use hookline_core::{detect_hooks, Hook, HookConfig};
use hookline_media::{decode_to_mono, MediaFetcher};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<HookConfig>,
}

/// Build the application router
pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/hooks", post(find_hooks))
        .with_state(ctx)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct HooksRequest {
    url: Option<String>,
}

/// POST /hooks: fetch the referenced media, run the pipeline, report hooks
///
/// Outcomes are kept distinct: a successful run with no hooks is 404
/// `no_hooks_found`, while any fetch/decode/pipeline failure is 502
/// `processing_failed`.
async fn find_hooks(
    State(ctx): State<AppContext>,
    Json(request): Json<HooksRequest>,
) -> (StatusCode, Json<Value>) {
    let Some(url) = request.url.filter(|u| !u.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "status": "bad_request", "detail": "a media url is required" })),
        );
    };

    let config = ctx.config.clone();
    let worker_url = url.clone();
    let result =
        tokio::task::spawn_blocking(move || process_reference(&worker_url, &config)).await;

    let hooks = match result {
        Ok(Ok(hooks)) => hooks,
        Ok(Err(e)) => {
            log::warn!("processing failed for {}: {:#}", url, e);
            return (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "status": "processing_failed", "detail": format!("{:#}", e) })),
            );
        }
        Err(e) => {
            log::error!("worker panicked for {}: {}", url, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "processing_failed", "detail": "internal error" })),
            );
        }
    };

    let Some(primary) = hooks.first() else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "status": "no_hooks_found", "detail": "computation succeeded but nothing stood out" })),
        );
    };

    (
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "primary": {
                "start": primary.start_time,
                "end": primary.start_time + primary.duration,
            },
            "hooks": hooks,
        })),
    )
}

/// Blocking fetch -> decode -> detect for one media reference
fn process_reference(url: &str, config: &HookConfig) -> anyhow::Result<Vec<Hook>> {
    let workdir = tempfile::tempdir()?;
    let path = MediaFetcher::new().fetch(url, workdir.path())?;
    let audio = decode_to_mono(&path, config.sample_rate)?;
    log::debug!("decoded {:.1}s of audio from {}", audio.duration_secs(), url);
    let hooks = detect_hooks(&audio.samples, audio.sample_rate, config)?;
    Ok(hooks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_reports_ok() {
        let response = health().await;
        assert_eq!(response.0.status, "ok");
    }

    #[tokio::test]
    async fn test_missing_url_is_bad_request() {
        let ctx = AppContext {
            config: Arc::new(HookConfig::default()),
        };
        let (status, body) =
            find_hooks(State(ctx), Json(HooksRequest { url: None })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.0["status"], "bad_request");
    }
}
