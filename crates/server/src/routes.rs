//! HTTP routes.
//!
//! Every endpoint takes a JSON body with the article `url` and returns the
//! core result type as JSON. Failures are rendered by [`ApiError`].

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{Method, Request, StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use referent_core::{
    Action, ExtractionResult, Illustration, ProcessOutcome, Referent, ReferentError, Translation, validate_url,
};
use serde::Deserialize;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info_span;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub referent: Arc<Referent>,
}

#[derive(Debug, Deserialize)]
pub struct UrlRequest {
    #[serde(default)]
    url: String,
}

#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    #[serde(default)]
    url: String,
    #[serde(default)]
    action: String,
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Routes without middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/parse", post(parse))
        .route("/api/ai-process", post(ai_process))
        .route("/api/translate", post(translate))
        .route("/api/illustrate", post(illustrate))
        .with_state(state)
}

/// Routes wrapped in tracing, CORS, compression and a request timeout.
pub fn app(state: AppState, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        info_span!(
            "request",
            id = %Uuid::new_v4(),
            method = %request.method(),
            uri = %request.uri()
        )
    });

    router(state)
        .layer(TimeoutLayer::with_status_code(StatusCode::GATEWAY_TIMEOUT, request_timeout))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(trace)
}

async fn health() -> &'static str {
    "ok"
}

async fn parse(
    State(state): State<AppState>,
    payload: Result<Json<UrlRequest>, JsonRejection>,
) -> ApiResult<ExtractionResult> {
    let Json(request) = payload?;
    Ok(Json(state.referent.parse_url(&request.url).await?))
}

/// Only the short-form actions are served here; translation has its own route.
fn text_action(raw: &str) -> Result<Action, ReferentError> {
    let action = raw.parse::<Action>()?;
    if Action::PROCESSING.contains(&action) {
        Ok(action)
    } else {
        Err(ReferentError::InvalidInput(format!(
            "unsupported action {:?}, expected one of: summary, theses, telegram",
            action.as_str()
        )))
    }
}

async fn ai_process(
    State(state): State<AppState>,
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> ApiResult<ProcessOutcome> {
    let Json(request) = payload?;
    validate_url(&request.url)?;
    let action = text_action(&request.action)?;

    Ok(Json(state.referent.process(&request.url, action).await?))
}

async fn translate(
    State(state): State<AppState>,
    payload: Result<Json<UrlRequest>, JsonRejection>,
) -> ApiResult<Translation> {
    let Json(request) = payload?;
    Ok(Json(state.referent.translate(&request.url).await?))
}

async fn illustrate(
    State(state): State<AppState>,
    payload: Result<Json<UrlRequest>, JsonRejection>,
) -> ApiResult<Illustration> {
    let Json(request) = payload?;
    Ok(Json(state.referent.illustrate(&request.url).await?))
}
