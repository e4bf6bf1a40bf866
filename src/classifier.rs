//! Classification predicates over API error chains.

use reqwest::StatusCode;
use std::error::Error as StdError;
use std::io;

use crate::chain::{Chain, CompositeError};
use crate::types::{ApiError, ErrorDetail};

/// Reason code reported when a project-level rate limit trips.
pub const RATE_LIMITED_REASON: &str = "rateLimitExceeded";
/// Reason code reported when a per-user rate limit trips.
pub const USER_RATE_LIMITED_REASON: &str = "userRateLimitExceeded";
/// Reason code reported while a newly created resource is still provisioning.
pub const RESOURCE_NOT_READY_REASON: &str = "resourceNotReady";
/// Quota domain used by storage-style services.
pub const USAGE_LIMITS_DOMAIN: &str = "usageLimits";
/// Quota domain used by BigQuery-style services.
pub const GLOBAL_DOMAIN: &str = "global";
/// Exact message a read-timeout failure carries.
pub const READ_TIMED_OUT_MESSAGE: &str = "Read timed out";

/// Recursion budget when descending into suppressed companions.
const MAX_SUPPRESSED_DEPTH: usize = 4;

/// Stateless classifier for error chains produced by cloud API clients.
///
/// Every operation takes the root of an error chain, never mutates it, and
/// never fails: an unrelated error simply classifies as `false` or `None`.
/// Structured predicates look for the nearest [`ApiError`] on the chain,
/// whether attached first-class or embedded as JSON text in a wrapped
/// error's message; transport predicates look for `std::io::Error` and
/// `reqwest::Error` nodes.
///
/// The rate-limit reason and domain allow-lists default to
/// [`RATE_LIMITED_REASON`]/[`USER_RATE_LIMITED_REASON`] and
/// [`USAGE_LIMITS_DOMAIN`]/[`GLOBAL_DOMAIN`]; both can be extended (never
/// shrunk) through [`ErrorClassifier::builder`].
///
/// # Examples
///
/// ```rust
/// use api_error_classifier::{ApiError, ErrorClassifier};
/// use std::io;
///
/// let classifier = ErrorClassifier::new();
/// let denied = ApiError::from_json(
///     r#"{"error": {"code": 403, "message": "Forbidden"}}"#,
/// ).unwrap();
/// let wrapped = io::Error::other(denied);
///
/// assert!(classifier.access_denied(&wrapped));
/// assert!(!classifier.item_not_found(&wrapped));
/// ```
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    rate_limit_reasons: Vec<String>,
    rate_limit_domains: Vec<String>,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ErrorClassifier {
    /// Create a classifier with the default allow-lists.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for a classifier with extended allow-lists.
    pub fn builder() -> ErrorClassifierBuilder {
        ErrorClassifierBuilder::new()
    }

    /// The call was rejected with 403 Forbidden.
    pub fn access_denied(&self, err: &(dyn StdError + 'static)) -> bool {
        self.status_matches(err, StatusCode::FORBIDDEN)
    }

    /// The call failed with 409 Conflict because the item already exists.
    pub fn item_already_exists(&self, err: &(dyn StdError + 'static)) -> bool {
        self.status_matches(err, StatusCode::CONFLICT)
    }

    /// The call failed with 404 Not Found.
    pub fn item_not_found(&self, err: &(dyn StdError + 'static)) -> bool {
        self.status_matches(err, StatusCode::NOT_FOUND)
    }

    /// The requested byte range was not satisfiable (416).
    pub fn range_not_satisfiable(&self, err: &(dyn StdError + 'static)) -> bool {
        self.status_matches(err, StatusCode::RANGE_NOT_SATISFIABLE)
    }

    /// A precondition supplied with the request did not hold (412).
    pub fn precondition_not_met(&self, err: &(dyn StdError + 'static)) -> bool {
        self.status_matches(err, StatusCode::PRECONDITION_FAILED)
    }

    /// The call was rejected for exceeding a quota.
    ///
    /// A 429 status alone is not enough: some detail entry must carry a
    /// rate-limit reason code scoped to a quota domain. The domain gate
    /// keeps unrelated errors that reuse the reason string from classifying
    /// as retryable quota pressure.
    pub fn rate_limited(&self, err: &(dyn StdError + 'static)) -> bool {
        match self.unwrap_api_error(err) {
            Some(error) if error.code == StatusCode::TOO_MANY_REQUESTS.as_u16() => error
                .errors
                .iter()
                .any(|detail| self.is_rate_limit_detail(detail)),
            _ => false,
        }
    }

    /// The target resource exists but is still provisioning.
    ///
    /// Matches on the detail reason alone; providers report it alongside
    /// varying status codes.
    pub fn resource_not_ready(&self, err: &(dyn StdError + 'static)) -> bool {
        match self.unwrap_api_error(err) {
            Some(error) if error.code != StatusCode::OK.as_u16() => error
                .errors
                .iter()
                .any(|detail| detail.reason.as_deref() == Some(RESOURCE_NOT_READY_REASON)),
            _ => false,
        }
    }

    /// The chain contains a generic I/O failure: a timeout, premature
    /// stream termination, or transport error.
    pub fn io_error(&self, err: &(dyn StdError + 'static)) -> bool {
        Chain::new(err).any(is_io_failure)
    }

    /// The chain contains a socket-level or TLS-handshake-level failure.
    ///
    /// Strictly narrower than [`io_error`](Self::io_error): stream-level
    /// failures such as a premature EOF count as I/O errors but not as
    /// socket errors.
    pub fn socket_error(&self, err: &(dyn StdError + 'static)) -> bool {
        Chain::new(err).any(is_socket_failure)
    }

    /// The given error itself is a read timeout.
    ///
    /// Deliberately root-only and narrower than
    /// [`socket_error`](Self::socket_error): the error must be a timed-out
    /// I/O failure whose message is exactly [`READ_TIMED_OUT_MESSAGE`].
    pub fn read_timed_out(&self, err: &(dyn StdError + 'static)) -> bool {
        match err.downcast_ref::<io::Error>() {
            Some(e) => {
                e.kind() == io::ErrorKind::TimedOut && e.to_string() == READ_TIMED_OUT_MESSAGE
            }
            None => false,
        }
    }

    /// The nearest structured error's code is a 4xx status.
    pub fn client_error(&self, err: &(dyn StdError + 'static)) -> bool {
        self.http_status(err).is_some_and(|s| s.is_client_error())
    }

    /// The nearest structured error's code is a 5xx status.
    pub fn server_error(&self, err: &(dyn StdError + 'static)) -> bool {
        self.http_status(err).is_some_and(|s| s.is_server_error())
    }

    /// Whether a retry has a chance of succeeding.
    ///
    /// Quota pushback, server-side failures, and transport failures are
    /// retryable; everything else needs a changed request.
    pub fn retryable(&self, err: &(dyn StdError + 'static)) -> bool {
        self.rate_limited(err) || self.server_error(err) || self.io_error(err)
    }

    /// The nearest structured error's code as an HTTP status.
    ///
    /// `None` when no structured error is found or its code is not a valid
    /// status number.
    pub fn http_status(&self, err: &(dyn StdError + 'static)) -> Option<StatusCode> {
        self.unwrap_api_error(err)
            .and_then(|error| StatusCode::from_u16(error.code).ok())
    }

    /// Human-readable message for the failure.
    ///
    /// The top-level message of the nearest structured error when one is
    /// present and non-empty, otherwise the root error's own text.
    pub fn error_message(&self, err: &(dyn StdError + 'static)) -> String {
        match self.unwrap_api_error(err) {
            Some(error) if !error.message.is_empty() => error.message,
            _ => err.to_string(),
        }
    }

    /// Locate the nearest structured error anywhere in the chain.
    ///
    /// The search runs in three passes: first-class [`ApiError`] values
    /// attached on the primary cause chain, then JSON text embedded in a
    /// chain node's message, then the suppressed companions of any
    /// [`CompositeError`] on the chain, each searched the same way. Returns
    /// `None` when every pass comes up empty.
    pub fn unwrap_api_error(&self, err: &(dyn StdError + 'static)) -> Option<ApiError> {
        find_api_error(err, MAX_SUPPRESSED_DEPTH)
    }

    fn status_matches(&self, err: &(dyn StdError + 'static), status: StatusCode) -> bool {
        match self.unwrap_api_error(err) {
            Some(error) => error.code == status.as_u16(),
            None => false,
        }
    }

    fn is_rate_limit_detail(&self, detail: &ErrorDetail) -> bool {
        match (detail.reason.as_deref(), detail.domain.as_deref()) {
            (Some(reason), Some(domain)) => {
                self.rate_limit_reasons.iter().any(|r| r == reason)
                    && self.rate_limit_domains.iter().any(|d| d == domain)
            }
            _ => false,
        }
    }
}

fn find_api_error(root: &(dyn StdError + 'static), budget: usize) -> Option<ApiError> {
    for node in Chain::new(root) {
        if let Some(error) = node.downcast_ref::<ApiError>() {
            return Some(error.clone());
        }
    }

    // The textual decode only runs once no first-class error is attached
    // anywhere on the primary chain.
    for node in Chain::new(root) {
        if let Some(error) = ApiError::from_embedded_json(&node.to_string()) {
            return Some(error);
        }
    }

    if budget == 0 {
        return None;
    }
    for node in Chain::new(root) {
        if let Some(composite) = node.downcast_ref::<CompositeError>() {
            for companion in composite.suppressed() {
                if let Some(error) = find_api_error(companion, budget - 1) {
                    return Some(error);
                }
            }
        }
    }

    None
}

fn is_io_failure(node: &(dyn StdError + 'static)) -> bool {
    if node.is::<io::Error>() {
        return true;
    }
    if let Some(e) = node.downcast_ref::<reqwest::Error>() {
        return e.is_timeout() || e.is_connect() || e.is_request();
    }
    false
}

fn is_socket_failure(node: &(dyn StdError + 'static)) -> bool {
    if let Some(e) = node.downcast_ref::<io::Error>() {
        return match e.kind() {
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::NotConnected
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::TimedOut => true,
            // TLS failures surface as InvalidData in rustls-based stacks;
            // the handshake must have died on an actual transport failure.
            io::ErrorKind::InvalidData => match e.get_ref() {
                Some(inner) => Chain::new(inner).any(is_io_failure),
                None => false,
            },
            _ => false,
        };
    }
    if let Some(e) = node.downcast_ref::<reqwest::Error>() {
        return e.is_timeout() || e.is_connect();
    }
    false
}

/// Builder for an [`ErrorClassifier`] with extended allow-lists.
///
/// The defaults are always included; the builder can only widen what counts
/// as rate limiting, so the documented contract is a floor.
#[derive(Debug, Default)]
pub struct ErrorClassifierBuilder {
    extra_reasons: Vec<String>,
    extra_domains: Vec<String>,
}

impl ErrorClassifierBuilder {
    /// Create a builder with the default allow-lists.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also treat `reason` as a rate-limit reason code.
    pub fn rate_limit_reason(mut self, reason: impl Into<String>) -> Self {
        self.extra_reasons.push(reason.into());
        self
    }

    /// Also treat `domain` as a quota domain.
    pub fn rate_limit_domain(mut self, domain: impl Into<String>) -> Self {
        self.extra_domains.push(domain.into());
        self
    }

    /// Build the classifier.
    pub fn build(self) -> ErrorClassifier {
        let mut reasons = vec![
            RATE_LIMITED_REASON.to_string(),
            USER_RATE_LIMITED_REASON.to_string(),
        ];
        reasons.extend(self.extra_reasons);

        let mut domains = vec![USAGE_LIMITS_DOMAIN.to_string(), GLOBAL_DOMAIN.to_string()];
        domains.extend(self.extra_domains);

        ErrorClassifier {
            rate_limit_reasons: reasons,
            rate_limit_domains: domains,
        }
    }
}
