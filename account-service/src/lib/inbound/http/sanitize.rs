//! Outbound payload sanitization.
//!
//! Every JSON body leaving the service is rewritten so that sensitive keys
//! (the password digest) and `null` values never cross the process boundary.

use std::collections::HashSet;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use serde_json::Map;
use serde_json::Value;

/// Keys stripped from every response.
pub const SENSITIVE_FIELDS: &[&str] = &["password", "hash"];

/// Recursively drop `omit_keys` and null-valued keys from a JSON value.
///
/// Arrays keep their order. Timestamps are serialized as RFC 3339 strings
/// before they get here, so they pass through as scalars.
pub fn sanitize(value: Value, omit_keys: &HashSet<String>) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| sanitize(item, omit_keys))
                .collect(),
        ),
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .filter(|(key, value)| !value.is_null() && !omit_keys.contains(key))
                .map(|(key, value)| (key, sanitize(value, omit_keys)))
                .collect::<Map<String, Value>>(),
        ),
        scalar => scalar,
    }
}

/// Omit-set shared by the response middleware.
#[derive(Debug, Clone)]
pub struct ResponseSanitizer {
    omit_keys: Arc<HashSet<String>>,
}

impl ResponseSanitizer {
    pub fn new<I, S>(omit_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            omit_keys: Arc::new(omit_keys.into_iter().map(Into::into).collect()),
        }
    }

    pub fn apply(&self, value: Value) -> Value {
        sanitize(value, &self.omit_keys)
    }
}

impl Default for ResponseSanitizer {
    fn default() -> Self {
        Self::new(SENSITIVE_FIELDS.iter().copied())
    }
}

/// Middleware rewriting JSON response bodies through the sanitizer.
///
/// Non-JSON and empty bodies are forwarded untouched.
pub async fn sanitize_response(
    State(sanitizer): State<ResponseSanitizer>,
    req: Request,
    next: Next,
) -> Response {
    let response = next.run(req).await;

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));
    if !is_json {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, "Failed to buffer response body");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let value = match serde_json::from_slice::<Value>(&bytes) {
        Ok(value) => value,
        Err(_) => return Response::from_parts(parts, Body::from(bytes)),
    };

    match serde_json::to_vec(&sanitizer.apply(value)) {
        Ok(sanitized) => {
            parts.headers.remove(header::CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(sanitized))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize sanitized body");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
