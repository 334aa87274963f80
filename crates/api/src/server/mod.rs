//! HTTP control surface
//!
//! Exposes the long-running flows as live job streams (SSE with a terminal
//! sentinel event) and receives the base-price webhook. Each stream endpoint
//! enqueues the corresponding subcommand of this binary as a background job
//! and relays its output lines; the caller's request thread never runs the
//! flow itself.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use futures::StreamExt;
use priceloom_domain::{constants, PriceloomError, Result, ShopConfig};
use priceloom_infra::integrations::shopify::{verify_webhook_signature, MetafieldNotification};
use priceloom_infra::JobRegistry;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::flows;

const SIGNATURE_HEADER: &str = "X-Shopify-Hmac-SHA256";

/// State shared by all routes; owns the job registry for the process.
pub struct AppState {
    registry: JobRegistry,
    config: ShopConfig,
    /// Program invoked for background jobs (this binary).
    program: PathBuf,
}

impl AppState {
    pub fn new(config: ShopConfig, program: PathBuf) -> Self {
        Self { registry: JobRegistry::new(), config, program }
    }
}

/// Build the route table.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/stream/percentage", get(stream_percentage))
        .route("/stream/ensemble", get(stream_ensemble))
        .route("/stream/reset", get(stream_reset))
        .route("/webhook/metafield", post(metafield_webhook))
        .with_state(state)
}

/// Bind and serve until the process is terminated.
pub async fn serve(config: ShopConfig, bind: SocketAddr) -> Result<()> {
    let program = std::env::current_exe()
        .map_err(|err| PriceloomError::Internal(format!("cannot resolve own binary: {err}")))?;
    let state = Arc::new(AppState::new(config, program));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|err| PriceloomError::Io(format!("cannot bind {bind}: {err}")))?;
    info!(%bind, "control surface listening");

    axum::serve(listener, app)
        .await
        .map_err(|err| PriceloomError::Io(format!("server error: {err}")))
}

#[derive(Debug, Deserialize)]
struct PercentageParams {
    percent: Option<String>,
}

async fn stream_percentage(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PercentageParams>,
) -> Response {
    let Some(percent) = params.percent else {
        return (StatusCode::BAD_REQUEST, "Missing percent").into_response();
    };
    if percent.parse::<f64>().is_err() {
        return (StatusCode::BAD_REQUEST, "Invalid percent").into_response();
    }

    stream_job(&state, vec!["percentage".into(), "--percent".into(), percent])
}

async fn stream_ensemble(State(state): State<Arc<AppState>>) -> Response {
    stream_job(&state, vec!["ensemble".into()])
}

async fn stream_reset(State(state): State<Arc<AppState>>) -> Response {
    stream_job(&state, vec!["reset".into()])
}

/// Enqueue a subcommand of this binary and relay its output as SSE events,
/// closing with the sentinel event.
fn stream_job(state: &AppState, args: Vec<String>) -> Response {
    let command = priceloom_domain::JobCommand::new(
        state.program.display().to_string(),
        args,
    );

    let job_id = match state.registry.enqueue(command) {
        Ok(id) => id,
        Err(err) => {
            error!(error = %err, "failed to enqueue job");
            return (StatusCode::INTERNAL_SERVER_ERROR, "job queue unavailable").into_response();
        }
    };
    info!(%job_id, "job stream opened");

    let events = state
        .registry
        .stream(job_id)
        .map(|line| Ok::<_, std::convert::Infallible>(Event::default().data(line)))
        .chain(futures::stream::once(async {
            Ok(Event::default().data(constants::JOB_DONE_SENTINEL))
        }));

    Sse::new(events).keep_alive(KeepAlive::default()).into_response()
}

async fn metafield_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let secret = state.config.webhook_secret.as_deref().unwrap_or_default();

    if let Err(err) = verify_webhook_signature(secret, &body, signature) {
        warn!(error = %err, "webhook rejected");
        return StatusCode::UNAUTHORIZED;
    }

    let Ok(notification) = serde_json::from_slice::<MetafieldNotification>(&body) else {
        return StatusCode::OK;
    };
    if !notification.is_base_price() {
        return StatusCode::OK;
    }
    let Some(owner_id) = notification.owner_id_string() else {
        warn!("base-price notification without an owner id");
        return StatusCode::OK;
    };

    let value = notification.value_string();
    match flows::webhook::apply_base_price(state.config.clone(), &owner_id, &value).await {
        Ok(()) => StatusCode::OK,
        Err(err) => {
            error!(error = %err, %owner_id, "webhook reaction failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use hmac::{Hmac, Mac};
    use sha2::Sha256;
    use tower::util::ServiceExt;

    use super::*;

    fn test_state() -> Arc<AppState> {
        let config = ShopConfig {
            shop_domain: "test.myshopify.com".into(),
            api_token: "shpat_test".into(),
            api_version: "2024-04".into(),
            webhook_secret: Some("testsecret".into()),
            api_origin: None,
        };
        Arc::new(AppState::new(config, PathBuf::from("/bin/true")))
    }

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        BASE64.encode(mac.finalize().into_bytes())
    }

    #[tokio::test]
    async fn webhook_with_bad_signature_is_unauthorized() {
        let app = router(test_state());
        let response = app
            .oneshot(
                Request::post("/webhook/metafield")
                    .header(SIGNATURE_HEADER, "bm90LXRoZS1yaWdodC1kaWdlc3Q=")
                    .body(Body::from(r#"{"namespace":"custom","key":"base_price"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn webhook_without_signature_is_unauthorized() {
        let app = router(test_state());
        let response = app
            .oneshot(Request::post("/webhook/metafield").body(Body::from("{}")).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn webhook_ignores_unrelated_metafields() {
        let body = r#"{"namespace":"custom","key":"color","value":"red","owner_id":1}"#;
        let app = router(test_state());
        let response = app
            .oneshot(
                Request::post("/webhook/metafield")
                    .header(SIGNATURE_HEADER, sign("testsecret", body.as_bytes()))
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn webhook_tolerates_base_price_without_owner() {
        let body = r#"{"namespace":"custom","key":"base_price","value":"10.00"}"#;
        let app = router(test_state());
        let response = app
            .oneshot(
                Request::post("/webhook/metafield")
                    .header(SIGNATURE_HEADER, sign("testsecret", body.as_bytes()))
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn stream_percentage_requires_a_valid_percent() {
        let app = router(test_state());
        let response = app
            .oneshot(Request::get("/stream/percentage").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let app = router(test_state());
        let response = app
            .oneshot(
                Request::get("/stream/percentage?percent=ten").body(Body::empty()).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn stream_endpoints_answer_with_event_streams() {
        let app = router(test_state());
        let response = app
            .oneshot(Request::get("/stream/reset").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get("content-type").unwrap().to_str().unwrap();
        assert!(content_type.starts_with("text/event-stream"));
    }
}
