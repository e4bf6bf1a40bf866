//! # API Error Classifier
//!
//! Stateless classification of error chains produced by cloud API clients.
//!
//! Failed calls come back as layered errors: a structured JSON error
//! envelope from the service, wrapped by transports, retry layers, and
//! cleanup paths. This crate walks those chains — nested causes and
//! suppressed companions alike — and answers the questions a client library
//! needs for its retry and translation decisions: was this a permission
//! error? a missing object? quota pushback? a flaky socket?
//!
//! ## Quick Start
//!
//! ```rust
//! use api_error_classifier::{ApiError, ErrorClassifier};
//! use std::io;
//!
//! let classifier = ErrorClassifier::new();
//!
//! // A structured error wrapped by a transport layer.
//! let denied = ApiError::from_json(
//!     r#"{"error": {"code": 403, "message": "Forbidden"}}"#,
//! ).unwrap();
//! let wrapped = io::Error::other(denied);
//!
//! assert!(classifier.access_denied(&wrapped));
//! assert!(!classifier.item_not_found(&wrapped));
//! assert_eq!(classifier.error_message(&wrapped), "Forbidden");
//! ```

pub mod chain;
pub mod classifier;
pub mod types;


// Re-export commonly used types for convenience
pub use chain::{Chain, CompositeError};
pub use classifier::{
    ErrorClassifier, ErrorClassifierBuilder, GLOBAL_DOMAIN, RATE_LIMITED_REASON,
    READ_TIMED_OUT_MESSAGE, RESOURCE_NOT_READY_REASON, USAGE_LIMITS_DOMAIN,
    USER_RATE_LIMITED_REASON,
};
pub use types::{ApiError, ErrorDetail};
