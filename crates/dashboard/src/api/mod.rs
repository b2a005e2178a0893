//! Marketplace backend API client.
//!
//! Provides typed access to the seller, auth and product endpoints.
//!
//! # Credentials
//!
//! The backend keeps session state in a cookie. Calls that read or mutate
//! seller, session or product state go out with the cookie jar attached;
//! signup and the seller lookup right after login go out without it.

pub mod client;

pub use client::{Credentials, SellerApi};

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when calling the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("API error: {status} - {body}")]
    Status { status: u16, body: String },

    /// Backend rejected a payload with a structured validation error.
    #[error("Validation error ({status}): {message}")]
    Validation { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Response carried no usable seller identity.
    #[error("Response has no seller identity")]
    MissingIdentity,

    /// The view that issued the request was torn down before it finished.
    #[error("Request cancelled")]
    Cancelled,
}

impl ApiError {
    /// The backend's human-readable validation message, if any.
    #[must_use]
    pub fn validation_message(&self) -> Option<&str> {
        match self {
            Self::Validation { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Convert a failed response into the matching error, extracting the
    /// first validation issue when the body has the structured shape.
    pub(crate) fn from_status(status: u16, body: String) -> Self {
        serde_json::from_str::<ValidationBody>(&body)
            .ok()
            .and_then(|b| b.issues.into_iter().find_map(|i| i.message))
            .map_or(Self::Status { status, body }, |message| Self::Validation {
                status,
                message,
            })
    }
}

/// Structured validation error body, e.g.
/// `{"issues":[{"path":["email"],"message":"Email já cadastrado"}]}`.
#[derive(Debug, Deserialize)]
struct ValidationBody {
    #[serde(default)]
    issues: Vec<ValidationIssue>,
}

#[derive(Debug, Deserialize)]
struct ValidationIssue {
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_issue_becomes_validation_error() {
        let body = r#"{"issues":[{"message":"Email já cadastrado"},{"message":"second"}]}"#;
        let err = ApiError::from_status(400, body.to_owned());
        assert_eq!(err.validation_message(), Some("Email já cadastrado"));
    }

    #[test]
    fn test_unstructured_body_stays_status_error() {
        let err = ApiError::from_status(500, "boom".to_owned());
        assert!(matches!(err, ApiError::Status { status: 500, .. }));
        assert_eq!(err.validation_message(), None);
    }

    #[test]
    fn test_empty_issues_stays_status_error() {
        let err = ApiError::from_status(422, r#"{"issues":[]}"#.to_owned());
        assert!(matches!(err, ApiError::Status { status: 422, .. }));
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::Status {
            status: 503,
            body: "down".to_owned(),
        };
        assert_eq!(err.to_string(), "API error: 503 - down");
        assert_eq!(ApiError::Cancelled.to_string(), "Request cancelled");
    }
}
