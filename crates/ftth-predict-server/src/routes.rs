//! HTTP routes and handlers

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use ftth_predict_core::{FieldError, Prediction, ValidationErrors};
use serde_json::{json, Value};
use std::time::Instant;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.limits.max_body_bytes;

    Router::new()
        .route("/health", get(health_check))
        .route("/schema", get(schema))
        .route("/metrics", get(metrics))
        .route("/predict", post(predict))
        .fallback(fallback)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "model": state.predictor.model_name(),
        "scaler": state.predictor.scaler().kind(),
        "features": state.predictor.schema().len(),
    }))
}

async fn schema(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "features": state.predictor.schema().features() }))
}

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics_handle.render()
}

/// Validate, scale and predict a single record
async fn predict(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Prediction>, AppError> {
    let start = Instant::now();
    let result = run_prediction(&state, &headers, body);

    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) => e.outcome(),
    };
    metrics::counter!("ftth_predict_requests_total", "outcome" => outcome).increment(1);
    metrics::histogram!("ftth_predict_latency_us").record(start.elapsed().as_micros() as f64);

    result.map(Json)
}

fn run_prediction(
    state: &AppState,
    headers: &HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Prediction, AppError> {
    let body = decode_body(headers, &body?)?;

    let features = state
        .predictor
        .schema()
        .validate(&body)
        .map_err(AppError::Validation)?;
    debug!("Validated features: {:?}", features.as_slice());

    Ok(state.predictor.predict(&features)?)
}

/// Decode the request body as JSON.
///
/// A missing content type is read as JSON. A non-JSON content type leaves
/// the body undecoded, so it fails validation as a non-object.
fn decode_body(headers: &HeaderMap, body: &Bytes) -> Result<Value, AppError> {
    if body.is_empty() {
        return Err(AppError::Validation(ValidationErrors::single(FieldError::new(
            vec!["body".to_string()],
            "Field required",
            "missing",
        ))));
    }

    match headers.get(header::CONTENT_TYPE) {
        None => Ok(serde_json::from_slice(body)?),
        Some(value) if value.to_str().map_or(false, is_json_content_type) => {
            Ok(serde_json::from_slice(body)?)
        }
        Some(_) => Ok(Value::String(String::from_utf8_lossy(body).into_owned())),
    }
}

/// `application/json`, `text/json` and any `+json` subtype
fn is_json_content_type(value: &str) -> bool {
    let mime = value.split(';').next().unwrap_or_default().trim();
    let Some((_, subtype)) = mime.split_once('/') else {
        return false;
    };
    subtype.eq_ignore_ascii_case("json") || subtype.to_ascii_lowercase().ends_with("+json")
}

async fn fallback() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not Found" })))
}
