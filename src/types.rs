//! Data model for the JSON error envelope returned by cloud APIs.
//!
//! Failed API calls carry a structured error body of the form
//! `{"error": {"code": ..., "message": ..., "errors": [...]}}`. The types in
//! this module are a tolerant decoding of that envelope: unknown fields are
//! ignored, missing fields default, and malformed input decodes to `None`
//! rather than an error of its own.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single entry in the `errors` list of an API error envelope.
///
/// Entries pair a machine-readable `reason` code (e.g. `"rateLimitExceeded"`)
/// with the `domain` namespace that scopes it (e.g. `"usageLimits"`) and an
/// optional human-readable message. An entry with neither a reason nor a
/// domain never matches any error category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorDetail {
    /// Machine-readable short code identifying the error condition.
    pub reason: Option<String>,
    /// Namespace qualifying the reason's applicability.
    pub domain: Option<String>,
    /// Human-readable detail text.
    pub message: Option<String>,
}

/// Parsed JSON error envelope from a failed API response.
///
/// `code` is a conventional HTTP status number (400, 403, 404, ...) or a
/// pseudo-status such as 429 used to signal rate limiting. `message` is the
/// top-level human-readable text; `errors` is the ordered list of detail
/// entries.
///
/// `ApiError` implements [`std::error::Error`], so a response layer can
/// attach it first-class anywhere in an error chain and the classifier will
/// find it by downcast.
///
/// # Examples
///
/// ```rust
/// use api_error_classifier::ApiError;
///
/// let err = ApiError::from_json(
///     r#"{"error": {"code": 404, "message": "Not Found"}}"#,
/// ).unwrap();
/// assert_eq!(err.code, 404);
/// assert_eq!(err.message, "Not Found");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiError {
    /// HTTP-like status code, or a provider pseudo-status such as 429.
    pub code: u16,
    /// Top-level human-readable message.
    pub message: String,
    /// Ordered detail entries.
    pub errors: Vec<ErrorDetail>,
}

impl ApiError {
    /// Decode an error envelope from JSON text.
    ///
    /// Accepts both the wire shape `{"error": {...}}` and a bare error
    /// object `{...}`, which is how lower layers stringify the envelope when
    /// wrapping it into a plain error message. Input that does not parse, or
    /// that parses without a status code, yields `None`.
    pub fn from_json(text: &str) -> Option<ApiError> {
        let value: serde_json::Value = serde_json::from_str(text).ok()?;
        let body = match value.get("error") {
            Some(inner) => inner.clone(),
            None => value,
        };
        let error: ApiError = serde_json::from_value(body).ok()?;
        if error.code == 0 {
            None
        } else {
            Some(error)
        }
    }

    /// Best-effort extraction of an envelope embedded in free text.
    ///
    /// Wrapping layers often fold the envelope into a larger message
    /// (`"request failed: {...}"`), so this slices the outermost `{...}`
    /// span before decoding. Returns `None` when no such span exists or the
    /// span is not a valid envelope.
    pub fn from_embedded_json(text: &str) -> Option<ApiError> {
        let start = text.find('{')?;
        let end = text.rfind('}')?;
        if end < start {
            return None;
        }
        Self::from_json(&text[start..=end])
    }

    /// First detail entry, when present.
    pub fn first_detail(&self) -> Option<&ErrorDetail> {
        self.errors.first()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
