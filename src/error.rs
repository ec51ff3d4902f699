use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unknown hardware version: {0}")]
    UnknownHardware(String),

    #[error("Failed to read hardware version from {path}: {source}")]
    ConfigUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{0} is not available on this hardware")]
    CapabilityAbsent(&'static str),

    #[error("GPIO access failed on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("GPIO value {value:?} on {path} is not an integer")]
    MalformedValue { path: PathBuf, value: String },

    #[error("Invalid BootSourceOverrideTarget: {0}")]
    InvalidBootTarget(String),

    #[error("Invalid ResetType: {0}")]
    InvalidActionName(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Redfish error message body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidBootTarget(_)
            | AppError::InvalidActionName(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn redfish_code(&self) -> &'static str {
        match self {
            AppError::InvalidBootTarget(_) => "Base.1.0.PropertyValueNotInList",
            AppError::InvalidActionName(_) => "Base.1.0.ActionParameterNotSupported",
            AppError::BadRequest(_) => "Base.1.0.MalformedJSON",
            AppError::NotFound(_) => "Base.1.0.ResourceMissingAtURI",
            _ => "Base.1.0.GeneralError",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.redfish_code(),
                message: self.to_string(),
            },
        };

        tracing::error!(
            status = status.as_u16(),
            error_message = %body.error.message,
            "Request failed"
        );

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
