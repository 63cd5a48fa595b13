//! Unified error types for the data output API
//!
//! This module defines error types for each layer:
//! - `DomainError`: storage and lookup errors raised behind the port traits
//! - `ConfigError`: feed options that fail validation, or an unreadable feeds file
//! - `RenderError`: a feed document that could not be produced
//! - `AppError`: Application layer errors (wraps the above for HTTP responses)

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::domain::validation::ValidationFailure;
use crate::feed::OutputFormat;

/// Body returned to feed readers that present an unknown secret
pub const NOT_AUTHORIZED: &str = "Not Authorized";

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Feed configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid feed options: {}", join_failures(.0))]
    Invalid(Vec<ValidationFailure>),

    #[error("Duplicate feed id: {0}")]
    DuplicateFeed(String),

    #[error("Failed to read feeds file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse feeds file: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    /// Field-level failures, empty for I/O and parse errors
    pub fn failures(&self) -> &[ValidationFailure] {
        match self {
            ConfigError::Invalid(failures) => failures,
            _ => &[],
        }
    }
}

fn join_failures(failures: &[ValidationFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Feed rendering errors
///
/// A render either produces the whole document or one of these. Partial
/// output is never returned to feed readers.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Malformed template for feed {feed}: {reason}")]
    MalformedTemplate { feed: String, reason: String },

    #[error("XML serialization failed: {0}")]
    Xml(String),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Application layer errors - used by HTTP handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Render(#[from] RenderError),

    /// The supplied secret matched none of the feed's secrets
    #[error("Not authorized")]
    Unauthorized(OutputFormat),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Error response body for JSON responses
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

/// Feed readers get the exact body their format expects
fn unauthorized_response(format: OutputFormat) -> Response {
    match format {
        OutputFormat::Syndication => (
            StatusCode::UNAUTHORIZED,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            NOT_AUTHORIZED,
        )
            .into_response(),
        OutputFormat::Structured => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": NOT_AUTHORIZED })),
        )
            .into_response(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized(format) => return unauthorized_response(*format),
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, "Not found", Some(msg.clone()))
            }
            AppError::Domain(DomainError::Storage(msg)) => {
                tracing::error!("Storage error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
            AppError::Config(e @ ConfigError::Invalid(_)) => (
                StatusCode::BAD_REQUEST,
                "Validation error",
                Some(e.to_string()),
            ),
            AppError::Config(e) => (StatusCode::BAD_REQUEST, "Bad request", Some(e.to_string())),
            AppError::Render(e) => {
                tracing::error!("Render error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            details,
        });

        (status, body).into_response()
    }
}
