//! Error-chain traversal.
//!
//! Classification never looks at a single error in isolation: transports
//! wrap API failures, retry layers wrap transports, and cleanup paths attach
//! their own failures on the side. This module models that shape with a
//! bounded [`Chain`] iterator over `source()` links and [`CompositeError`],
//! a wrapper that carries suppressed companion failures alongside its
//! primary chain.

use std::error::Error as StdError;
use std::io;
use thiserror::Error;

/// Upper bound on cause-chain traversal.
///
/// Keeps every walk finite, including over errors that report themselves as
/// their own source.
pub(crate) const MAX_CHAIN_DEPTH: usize = 32;

/// Iterator over an error and its transitive causes, nearest first.
///
/// The walk is depth-bounded by [`MAX_CHAIN_DEPTH`] and steps through
/// `std::io::Error`'s custom payload explicitly: `io::Error::source()` skips
/// the wrapped error and reports the payload's own source, which would hide
/// a directly wrapped cause from the walk.
///
/// # Examples
///
/// ```rust
/// use api_error_classifier::{Chain, CompositeError};
/// use std::io;
///
/// let root = io::Error::other(CompositeError::new("backend gave up"));
/// let messages: Vec<String> = Chain::new(&root).map(|e| e.to_string()).collect();
/// assert_eq!(messages, vec!["backend gave up".to_string(); 2]);
/// ```
pub struct Chain<'a> {
    next: Option<&'a (dyn StdError + 'static)>,
    remaining: usize,
}

impl<'a> Chain<'a> {
    /// Start a walk at `root`.
    pub fn new(root: &'a (dyn StdError + 'static)) -> Self {
        Chain {
            next: Some(root),
            remaining: MAX_CHAIN_DEPTH,
        }
    }
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a (dyn StdError + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let current = self.next?;
        self.next = match current.downcast_ref::<io::Error>() {
            Some(io_err) => io_err
                .get_ref()
                .map(|inner| inner as &(dyn StdError + 'static)),
            None => current.source(),
        };
        Some(current)
    }
}

/// Error wrapper that carries secondary failures alongside its primary chain.
///
/// When a request fails and the cleanup that follows fails too, the cleanup
/// errors should not displace the original cause. `CompositeError` keeps the
/// original as the `source()` chain and the rest as suppressed companions,
/// which the classifier consults only after the primary chain yields
/// nothing.
///
/// # Examples
///
/// ```rust
/// use api_error_classifier::CompositeError;
/// use std::io;
///
/// let mut failure = CompositeError::new("upload failed");
/// failure.push_suppressed(io::Error::other("abort failed too"));
/// assert_eq!(failure.suppressed().count(), 1);
/// ```
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CompositeError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
    suppressed: Vec<Box<dyn StdError + Send + Sync>>,
}

impl CompositeError {
    /// Create a wrapper with no cause.
    pub fn new(message: impl Into<String>) -> Self {
        CompositeError {
            message: message.into(),
            source: None,
            suppressed: Vec::new(),
        }
    }

    /// Create a wrapper around a primary cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        CompositeError {
            message: message.into(),
            source: Some(source.into()),
            suppressed: Vec::new(),
        }
    }

    /// Attach a companion failure without displacing the primary cause.
    pub fn push_suppressed(&mut self, error: impl Into<Box<dyn StdError + Send + Sync>>) {
        self.suppressed.push(error.into());
    }

    /// The suppressed companions, in attachment order.
    pub fn suppressed(&self) -> impl Iterator<Item = &(dyn StdError + 'static)> {
        self.suppressed
            .iter()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_visits_nearest_first() {
        let root = CompositeError::with_source(
            "outer",
            CompositeError::with_source("middle", CompositeError::new("inner")),
        );
        let messages: Vec<String> = Chain::new(&root).map(|e| e.to_string()).collect();
        assert_eq!(messages, vec!["outer", "middle", "inner"]);
    }

    #[test]
    fn test_walk_steps_through_io_error_payload() {
        let root = io::Error::other(CompositeError::new("wrapped cause"));
        let chain: Vec<_> = Chain::new(&root).collect();

        assert_eq!(chain.len(), 2);
        assert!(chain[0].is::<io::Error>());
        assert!(chain[1].is::<CompositeError>());
    }

    #[test]
    fn test_walk_is_depth_bounded() {
        let mut error = CompositeError::new("level 0");
        for level in 1..(MAX_CHAIN_DEPTH * 2) {
            error = CompositeError::with_source(format!("level {level}"), error);
        }

        assert_eq!(Chain::new(&error).count(), MAX_CHAIN_DEPTH);
    }

    #[test]
    fn test_suppressed_companions_do_not_join_primary_chain() {
        let mut error = CompositeError::with_source("primary", CompositeError::new("cause"));
        error.push_suppressed(CompositeError::new("companion a"));
        error.push_suppressed(CompositeError::new("companion b"));

        assert_eq!(Chain::new(&error).count(), 2);
        let companions: Vec<String> = error.suppressed().map(|e| e.to_string()).collect();
        assert_eq!(companions, vec!["companion a", "companion b"]);
    }
}
