//! Maps failed attempts onto [`ErrorKind`].
//!
//! Retry decisions only look at [`ErrorKind::is_retryable`], so the mapping
//! here fully determines which failures the coordinator retries.

use crate::{ErrorKind, PropertyDataError, RawResult};

/// Classifies an HTTP status code; `None` means the status is a success.
pub fn classify_status(status: u16) -> Option<ErrorKind> {
    match status {
        401 => Some(ErrorKind::Authentication),
        429 => Some(ErrorKind::RateLimit),
        400..=499 => Some(ErrorKind::ClientError),
        500.. => Some(ErrorKind::ServerError),
        _ => None,
    }
}

/// Builds the error for a response whose status is not a success.
#[track_caller]
pub fn status_error(kind: ErrorKind, status: u16, body: &str) -> PropertyDataError {
    let message = match kind {
        ErrorKind::Authentication => {
            "invalid PropertyData API key or authentication failed".to_owned()
        }
        ErrorKind::RateLimit => "PropertyData API rate limit exceeded".to_owned(),
        ErrorKind::ServerError => {
            format!("PropertyData API server error: HTTP {status}{}", body_excerpt(body))
        }
        _ => format!("PropertyData API client error: HTTP {status}{}", body_excerpt(body)),
    };
    PropertyDataError::new(kind, message).with_status(status)
}

/// Any failure before a complete response arrived is a connection failure.
///
/// The URL is stripped from the cause, since its query string carries the
/// API key.
#[track_caller]
pub fn transport_error(err: reqwest::Error) -> PropertyDataError {
    let detail = if err.is_timeout() {
        "request timed out"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "transport failure"
    };
    PropertyDataError::connection(format!(
        "unable to connect to PropertyData API: {detail}"
    ))
    .with_source(err.without_url())
}

/// Decodes a success body into a [`RawResult`].
#[track_caller]
pub fn parse_body(body: &str) -> Result<RawResult, PropertyDataError> {
    if body.trim().is_empty() {
        return Err(PropertyDataError::malformed(
            "empty response from PropertyData API",
        ));
    }

    let value: serde_json::Value = serde_json::from_str(body).map_err(|err| {
        PropertyDataError::malformed(format!(
            "invalid JSON response from PropertyData API: {err}"
        ))
        .with_source(err)
    })?;

    RawResult::from_json(value).map_err(|_| {
        PropertyDataError::malformed("PropertyData API response is not a valid container")
    })
}

fn body_excerpt(body: &str) -> String {
    const MAX: usize = 200;
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    match trimmed.char_indices().nth(MAX) {
        Some((cut, _)) => format!(": {}...", &trimmed[..cut]),
        None => format!(": {trimmed}"),
    }
}
