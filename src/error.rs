//! Error types for the predictor

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

/// Failures loading or running the regression model.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("failed to read model at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("corrupt model: {0}")]
    Corrupt(String),

    #[error("unsupported model format: {0}")]
    UnsupportedFormat(String),

    #[error("unsupported objective: {0}")]
    UnsupportedObjective(String),

    #[error("feature length mismatch: got {got}, expected {expected}")]
    FeatureLength { expected: usize, got: usize },

    #[error("inference backend error: {0}")]
    Backend(String),
}

/// A submitted value outside the range its control permits.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: String,
        min: String,
        max: String,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Request-level failure returned by the HTTP handlers.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Inference(#[from] ModelError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Input(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to a client. Inference details stay in the log.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Input(e) => e.to_string(),
            AppError::Inference(_) => "An internal error occurred".to_string(),
        }
    }

    /// Records server-side failures; call once per failed request.
    pub fn log(&self) {
        if let AppError::Inference(e) = self {
            tracing::error!(detail = %e, "inference failed");
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status();
        let body = Json(json!({
            "error": true,
            "message": self.public_message(),
        }));

        (status, body).into_response()
    }
}
