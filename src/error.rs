// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client error types with consistent, user-presentable messages.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Field name -> validation message.
pub type FieldErrors = BTreeMap<String, String>;

/// Error type shared by every component of the client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Validation failed: {}", summarize(.0))]
    Validation(FieldErrors),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Unexpected response body: {0}")]
    Decode(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Authentication required: {0}")]
    AuthRequired(String),

    #[error("Storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),
}

impl ClientError {
    /// True when the server rejected the access token (HTTP 401).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Api(e) if e.status == 401)
    }

    /// Cancellation is an outcome, not a failure; callers drop it silently.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }

    /// Field-scoped messages, from either local validation or the server.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ClientError::Validation(fields) => Some(fields),
            ClientError::Api(e) if !e.field_errors.is_empty() => Some(&e.field_errors),
            _ => None,
        }
    }

    pub(crate) fn transport(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

fn summarize(fields: &FieldErrors) -> String {
    fields
        .iter()
        .map(|(field, msg)| format!("{}: {}", field, msg))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Non-2xx response from the REST API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("HTTP {status}: {message}")]
pub struct ApiError {
    pub status: u16,
    pub message: String,
    /// Business error code (e.g. `RESERVATION_DUPLICATE`) when the body carries one.
    pub code: Option<String>,
    pub field_errors: FieldErrors,
}

/// Union of the problem-detail and `{code, message, details}` error bodies.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    title: Option<String>,
    detail: Option<String>,
    message: Option<String>,
    code: Option<String>,
    errors: Option<serde_json::Map<String, serde_json::Value>>,
    details: Option<serde_json::Map<String, serde_json::Value>>,
}

impl ApiError {
    /// Build an error from a failed response's status, content type and body.
    ///
    /// Message preference: `detail`, `title`, `message` from a JSON body;
    /// otherwise the raw text; otherwise `"{status} {reason}"`.
    pub fn from_body(status: u16, content_type: &str, body: &str) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("");
        let fallback = format!("{} {}", status, reason).trim_end().to_string();

        let mut error = ApiError {
            status,
            message: fallback,
            code: None,
            field_errors: FieldErrors::new(),
        };

        if content_type.contains("json") {
            if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
                let ErrorBody {
                    title,
                    detail,
                    message,
                    code,
                    errors,
                    details,
                } = parsed;

                error.code = code.or_else(|| title.clone());
                if let Some(msg) = detail.or(title).or(message).filter(|m| !m.is_empty()) {
                    error.message = msg;
                }
                error.field_errors = errors
                    .or(details)
                    .map(|map| {
                        map.into_iter()
                            .map(|(k, v)| {
                                let text = match v {
                                    serde_json::Value::String(s) => s,
                                    other => other.to_string(),
                                };
                                (k, text)
                            })
                            .collect()
                    })
                    .unwrap_or_default();
            }
        } else if !body.trim().is_empty() {
            error.message = body.to_string();
        }

        error
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
