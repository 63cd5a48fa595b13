//! Feed handlers
//!
//! Endpoints for reading a feed and checking whether it is still fed.
//! Supports content negotiation: a `.xml` or `.json` suffix on the secret
//! wins, then `Accept: application/json` for JSON, otherwise RSS.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::app::FeedStatus;
use crate::domain::entities::FeedId;
use crate::domain::ports::{FeedRepository, RecordStore};
use crate::error::AppError;
use crate::feed::OutputFormat;
use crate::AppState;

/// Split a format suffix off the secret path segment
fn split_format(segment: &str) -> (&str, Option<OutputFormat>) {
    if let Some((secret, extension)) = segment.rsplit_once('.') {
        if let Some(format) = OutputFormat::from_extension(extension) {
            return (secret, Some(format));
        }
    }
    (segment, None)
}

fn accept_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::ACCEPT).and_then(|v| v.to_str().ok())
}

fn parse_feed_id(raw: &str) -> Result<FeedId, AppError> {
    Uuid::parse_str(raw)
        .map(FeedId)
        .map_err(|_| AppError::NotFound(format!("Feed {} not found", raw)))
}

/// GET /feeds/:feed_id/:secret
///
/// Returns the feed's newest records.
/// - `secret.json` or Accept: application/json → JSON response
/// - Otherwise → RSS 2.0
pub async fn get_feed<FR, RS>(
    State(state): State<AppState<FR, RS>>,
    Path((feed_id, segment)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, AppError>
where
    FR: FeedRepository + 'static,
    RS: RecordStore + 'static,
{
    let (secret, suffix) = split_format(&segment);
    let format = suffix.unwrap_or_else(|| OutputFormat::from_media_type(accept_header(&headers)));
    let feed_id = parse_feed_id(&feed_id)?;

    let body = state
        .feed_service
        .serve(&feed_id, secret, format, Utc::now())
        .await?;

    Ok(([(header::CONTENT_TYPE, format.content_type())], body).into_response())
}

/// GET /feeds/:feed_id
///
/// A request without a secret; answered like any unknown secret, in the
/// format the Accept header asks for.
pub async fn get_feed_without_secret<FR, RS>(
    State(state): State<AppState<FR, RS>>,
    Path(feed_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError>
where
    FR: FeedRepository + 'static,
    RS: RecordStore + 'static,
{
    let format = OutputFormat::from_media_type(accept_header(&headers));
    let feed_id = parse_feed_id(&feed_id)?;

    let body = state
        .feed_service
        .serve(&feed_id, "", format, Utc::now())
        .await?;

    Ok(([(header::CONTENT_TYPE, format.content_type())], body).into_response())
}

/// GET /health/feeds/:feed_id
///
/// Reports whether the feed's sources produced a record recently.
/// Exposes no records, so no secret is required.
pub async fn feed_status<FR, RS>(
    State(state): State<AppState<FR, RS>>,
    Path(feed_id): Path<String>,
) -> Result<Json<FeedStatus>, AppError>
where
    FR: FeedRepository + 'static,
    RS: RecordStore + 'static,
{
    let feed_id = parse_feed_id(&feed_id)?;
    let status = state.feed_service.status(&feed_id, Utc::now()).await?;
    Ok(Json(status))
}
