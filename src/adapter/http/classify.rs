//! HTTP Error Classification
//!
//! HTTPステータス・通信エラー・レスポンス本文をエラー種別に分類

use serde_json::Value;

use crate::domain::errors::{ConductorError, ErrorKind};

/// Longest response body excerpt kept in an error message
const MAX_BODY_EXCERPT: usize = 300;

/// Convert an error and its sources into a single line
pub fn error_chain_to_string(e: &(dyn std::error::Error + 'static)) -> String {
    let mut messages = vec![e.to_string()];
    let mut source = e.source();
    while let Some(cause) = source {
        messages.push(cause.to_string());
        source = cause.source();
    }
    messages.join(" | ")
}

/// Check for an HTTP status code standing on its own
///
/// `"HTTP 503"` / `"503 Service Unavailable"` は一致、`"9f5031ab"` のような
/// ID やハッシュの一部は一致しない
pub fn mentions_status_code(error_msg: &str, code: u16) -> bool {
    let code = code.to_string();
    error_msg.match_indices(&code).any(|(start, _)| {
        let end = start + code.len();
        let before = error_msg[..start].chars().next_back();
        let after = error_msg[end..].chars().next();
        !before.is_some_and(|c| c.is_ascii_alphanumeric())
            && !after.is_some_and(|c| c.is_ascii_alphanumeric())
    })
}

/// Check if a message describes an unreachable service
pub fn is_connection_error(error_msg: &str) -> bool {
    let msg = error_msg.to_lowercase();
    msg.contains("connection refused")
        || msg.contains("econnrefused")
        || msg.contains("connection reset")
        || msg.contains("broken pipe")
        || msg.contains("timed out")
        || msg.contains("timeout")
        || msg.contains("dns error")
        || msg.contains("failed to lookup address")
        || msg.contains("no route to host")
        || msg.contains("unexpected end of file")
        || mentions_status_code(&msg, 503)
        || mentions_status_code(&msg, 502)
}

/// Check if a message describes rejected credentials
pub fn is_auth_error(error_msg: &str) -> bool {
    let msg = error_msg.to_lowercase();
    mentions_status_code(&msg, 401)
        || mentions_status_code(&msg, 403)
        || msg.contains("unauthorized")
        || msg.contains("forbidden")
        || msg.contains("invalid token")
        || msg.contains("token expired")
        || msg.contains("access denied")
}

/// Check if a message describes a missing or unreadable local file
pub fn is_file_error(error_msg: &str) -> bool {
    let msg = error_msg.to_lowercase();
    msg.contains("no such file")
        || msg.contains("filenotfound")
        || msg.contains("file not found")
        || msg.contains("permission denied")
        || msg.contains("is a directory")
}

/// Check if a message describes rejected data
pub fn is_validation_error(error_msg: &str) -> bool {
    let msg = error_msg.to_lowercase();
    mentions_status_code(&msg, 400)
        || mentions_status_code(&msg, 422)
        || msg.contains("bad request")
        || msg.contains("invalid")
        || msg.contains("validation")
        || msg.contains("md5")
        || msg.contains("already exists")
}

/// Classify free-form output from a service we do not control
///
/// 判定順: AUTH → FILE → CONNECTION → VALIDATION、いずれにも当たらなければ CONNECTION
pub fn classify_message(error_msg: &str) -> ErrorKind {
    if is_auth_error(error_msg) {
        ErrorKind::Auth
    } else if is_file_error(error_msg) {
        ErrorKind::File
    } else if is_connection_error(error_msg) {
        ErrorKind::Connection
    } else if is_validation_error(error_msg) {
        ErrorKind::Validation
    } else {
        ErrorKind::Connection
    }
}

/// Status codes worth retrying with the same request
pub fn is_transient_status(status: u16) -> bool {
    matches!(status, 408 | 429) || (500..600).contains(&status)
}

/// Pull a human readable message out of an error response body
///
/// Lyric: `{error, message, details}` / SONG: `{errorId, message}`
pub fn extract_body_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(json) = serde_json::from_str::<Value>(trimmed) {
        let field = |key: &str| json.get(key).and_then(Value::as_str).map(str::to_string);
        return match (field("message"), field("error").or_else(|| field("errorId"))) {
            (Some(message), Some(code)) if message != code => {
                Some(format!("{}: {}", code, message))
            }
            (Some(message), _) => Some(message),
            (None, Some(code)) => Some(code),
            (None, None) => Some(excerpt(trimmed)),
        };
    }

    Some(excerpt(trimmed))
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= MAX_BODY_EXCERPT {
        text.to_string()
    } else {
        let cut: String = text.chars().take(MAX_BODY_EXCERPT).collect();
        format!("{}...", cut)
    }
}

/// Classify a non-success HTTP response
pub fn classify_status(service: &str, url: &str, status: u16, body: &str) -> ConductorError {
    let detail = extract_body_message(body).unwrap_or_else(|| "no response body".to_string());
    let message = format!("{} returned HTTP {}: {}", service, status, detail);

    let err = match status {
        401 | 403 => ConductorError::auth(message)
            .with_suggestion(format!("Check the auth token used for {}", service)),
        404 => ConductorError::validation(message)
            .with_suggestion("Check that the referenced id exists on the service")
            .with_suggestion(format!("Verify the {} URL points at the right deployment", service)),
        400 | 409 | 422 => ConductorError::validation(message),
        s if is_transient_status(s) => ConductorError::connection(message)
            .with_suggestion(format!("{} may be overloaded or restarting", service))
            .retryable(true),
        _ => match classify_message(&detail) {
            ErrorKind::Connection => ConductorError::connection(message),
            kind => ConductorError::new(kind, message),
        },
    };

    err.with_detail("service", service)
        .with_detail("url", url)
        .with_detail("status", status)
        .with_default_suggestions()
}

/// Classify a transport failure (no HTTP response received)
pub fn classify_transport(service: &str, url: &str, err: &reqwest::Error) -> ConductorError {
    let chain = error_chain_to_string(err);

    let conductor_err = if err.is_timeout() {
        ConductorError::connection(format!("Request to {} timed out: {}", service, url))
            .with_suggestion("Increase --timeout-secs if the service is slow to respond")
            .retryable(true)
    } else if err.is_connect() || is_connection_error(&chain) {
        ConductorError::connection(format!("Could not connect to {} at {}: {}", service, url, chain))
            .with_suggestion(format!("Check that {} is running and reachable", service))
            .retryable(true)
    } else if err.is_decode() {
        ConductorError::connection(format!(
            "Unexpected response from {} at {}: {}",
            service, url, chain
        ))
        .with_suggestion(format!("Verify the {} URL points at the right service", service))
    } else {
        ConductorError::connection(format!("Request to {} failed: {}", service, chain))
    };

    conductor_err
        .with_detail("service", service)
        .with_detail("url", url)
        .with_default_suggestions()
}
