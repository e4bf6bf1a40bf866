//! Integration tests exercising classification through the public API only.

use api_error_classifier::{ApiError, CompositeError, ErrorClassifier};
use std::io;

/// Error body captured from a storage service quota rejection.
const QUOTA_BODY: &str = r#"{
  "error": {
    "errors": [
      {
        "domain": "usageLimits",
        "reason": "rateLimitExceeded",
        "message": "The total number of changes to the object exceeds the rate limit."
      }
    ],
    "code": 429,
    "message": "Too Many Requests"
  }
}"#;

#[test]
fn classifies_a_quota_rejection_through_transport_layers() {
    let classifier = ErrorClassifier::new();

    // The response layer parses the body and attaches it; the transport and
    // retry layers wrap it.
    let api_error = ApiError::from_json(QUOTA_BODY).expect("body decodes");
    let transport = io::Error::other(api_error);
    let outer = CompositeError::with_source("object update failed", transport);

    assert!(classifier.rate_limited(&outer));
    assert!(classifier.retryable(&outer));
    assert!(!classifier.access_denied(&outer));
    assert!(!classifier.item_not_found(&outer));
    assert_eq!(classifier.error_message(&outer), "Too Many Requests");

    let unwrapped = classifier.unwrap_api_error(&outer).expect("found");
    assert_eq!(unwrapped.code, 429);
    assert_eq!(
        unwrapped.first_detail().and_then(|d| d.domain.as_deref()),
        Some("usageLimits")
    );
}

#[test]
fn classifies_a_stringified_body_from_a_lower_layer() {
    let classifier = ErrorClassifier::new();

    // Some layers fold the body into a plain message instead of attaching
    // the parsed error.
    let transport = io::Error::other(format!("GET /b/bucket/o/key: {QUOTA_BODY}"));
    let outer = CompositeError::with_source("read failed", transport);

    assert!(classifier.rate_limited(&outer));
    assert_eq!(classifier.error_message(&outer), "Too Many Requests");
}

#[test]
fn finds_the_body_hidden_in_a_suppressed_companion() {
    let classifier = ErrorClassifier::new();

    let mut failure = CompositeError::new("upload failed");
    failure.push_suppressed(io::Error::new(
        io::ErrorKind::BrokenPipe,
        "write aborted mid-stream",
    ));
    failure.push_suppressed(io::Error::other(QUOTA_BODY.to_string()));

    assert!(classifier.rate_limited(&failure));
    // Transport predicates walk the primary chain only; companions are
    // consulted for structured errors, not for I/O classification.
    assert!(!classifier.socket_error(&failure));
    assert!(!classifier.io_error(&failure));
}

#[test]
fn transport_failures_classify_without_a_structured_body() {
    let classifier = ErrorClassifier::new();

    let timeout = io::Error::new(io::ErrorKind::TimedOut, "Read timed out");
    assert!(classifier.read_timed_out(&timeout));
    assert!(classifier.socket_error(&timeout));
    assert!(classifier.io_error(&timeout));
    assert!(classifier.retryable(&timeout));
    assert!(classifier.unwrap_api_error(&timeout).is_none());
    assert_eq!(classifier.error_message(&timeout), "Read timed out");
}

#[test]
fn unrelated_failures_classify_as_nothing() {
    let classifier = ErrorClassifier::new();

    let unrelated = CompositeError::new("config file missing a key");
    assert!(!classifier.access_denied(&unrelated));
    assert!(!classifier.item_already_exists(&unrelated));
    assert!(!classifier.item_not_found(&unrelated));
    assert!(!classifier.range_not_satisfiable(&unrelated));
    assert!(!classifier.precondition_not_met(&unrelated));
    assert!(!classifier.rate_limited(&unrelated));
    assert!(!classifier.resource_not_ready(&unrelated));
    assert!(!classifier.io_error(&unrelated));
    assert!(!classifier.socket_error(&unrelated));
    assert!(!classifier.read_timed_out(&unrelated));
    assert!(!classifier.retryable(&unrelated));
    assert_eq!(classifier.error_message(&unrelated), "config file missing a key");
}
