//! Mapping failures to HTTP responses
//!
//! Bodies use a `detail` field: a string for request-level failures, a list
//! of field errors for validation failures.

use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ftth_predict_core::{FieldError, ValidationErrors};
use serde_json::json;
use tracing::{error, warn};

#[derive(Debug)]
pub enum AppError {
    /// Body does not match the feature schema
    Validation(ValidationErrors),
    /// Body is not a JSON document
    InvalidJson(String),
    /// Body exceeds the configured limit
    PayloadTooLarge,
    /// Scaler rejected the row
    Scaler(String),
    /// Model failed to produce a prediction
    Model(String),
    InternalError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidJson(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Scaler(_) => StatusCode::BAD_REQUEST,
            Self::Model(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Label used for the outcome metric
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::InvalidJson(_) => "invalid",
            Self::PayloadTooLarge => "too_large",
            Self::Scaler(_) => "scaler_error",
            Self::Model(_) => "model_error",
            Self::InternalError(_) => "internal_error",
        }
    }
}

impl From<ftth_predict_core::Error> for AppError {
    fn from(err: ftth_predict_core::Error) -> Self {
        use ftth_predict_core::Error;

        match err {
            Error::Validation(errors) => AppError::Validation(errors),
            Error::Scaler(msg) => AppError::Scaler(msg),
            Error::Model(msg) => AppError::Model(msg),
            other => AppError::InternalError(other.to_string()),
        }
    }
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::InternalError(rejection.body_text())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidJson(format!("JSON decode error: {}", err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            AppError::Validation(errors) => {
                warn!("Rejected request: {}", errors);
                json!({ "detail": errors })
            }
            AppError::InvalidJson(msg) => {
                warn!("Rejected request body: {}", msg);
                let error = FieldError::new(vec!["body".to_string()], msg, "json_invalid");
                json!({ "detail": [error] })
            }
            AppError::PayloadTooLarge => json!({ "detail": "Request body too large" }),
            AppError::Scaler(msg) => {
                warn!("Scaler transformation failed: {}", msg);
                json!({ "detail": format!("Scaler transformation error: {}", msg) })
            }
            AppError::Model(msg) => {
                error!("Model prediction failed: {}", msg);
                json!({ "detail": format!("Model prediction error: {}", msg) })
            }
            AppError::InternalError(msg) => {
                error!("Internal error: {}", msg);
                json!({ "detail": msg })
            }
        };

        (status, Json(body)).into_response()
    }
}
