// Copyright 2025 Cowboy AI, LLC.

//! Error types
//!
//! Two tiers live here:
//! - [`Error`] is a business failure carried as a value inside an
//!   [`Outcome`](crate::Outcome). It is never thrown.
//! - [`MediatorError`] reports a defect in how the mediator was wired
//!   (missing or duplicate handlers, failing factories, bad configuration).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

/// Default message of an aggregated validation failure
pub const VALIDATION_MESSAGE: &str = "validation failed";

/// Default code of an aggregated validation failure
pub const VALIDATION_CODE: &str = "validation";

/// An expected failure: message, optional code and path, and nested details
///
/// Details are themselves errors, which lets a validation failure carry one
/// entry per broken rule.
///
/// # Examples
///
/// ```rust
/// use cim_result::Error;
///
/// let err = Error::new("name is required")
///     .with_code("E_REQUIRED")
///     .at("customer.name");
///
/// assert_eq!(err.message(), "name is required");
/// assert_eq!(err.code(), Some("E_REQUIRED"));
/// assert_eq!(err.path(), Some("customer.name"));
/// assert!(!err.has_details());
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, ThisError,
)]
#[error("{message}")]
pub struct Error {
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    details: Vec<Error>,
}

impl Error {
    /// Create an error with a message only
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            path: None,
            details: Vec::new(),
        }
    }

    /// Build an aggregate error whose details are the given errors
    pub fn aggregate(message: impl Into<String>, details: impl IntoIterator<Item = Error>) -> Self {
        Self::new(message).with_details(details)
    }

    /// Aggregate validation failures under the default validation message and code
    pub fn validation(details: impl IntoIterator<Item = Error>) -> Self {
        Self::aggregate(VALIDATION_MESSAGE, details).with_code(VALIDATION_CODE)
    }

    /// Attach a machine-readable code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attach the path of the offending member
    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Append one detail
    pub fn with_detail(mut self, detail: Error) -> Self {
        self.details.push(detail);
        self
    }

    /// Append several details, keeping their order
    pub fn with_details(mut self, details: impl IntoIterator<Item = Error>) -> Self {
        self.details.extend(details);
        self
    }

    /// The human-readable message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The code, if any
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// The path, if any
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Nested details in the order they were added
    pub fn details(&self) -> &[Error] {
        &self.details
    }

    /// Whether this error carries nested details
    pub fn has_details(&self) -> bool {
        !self.details.is_empty()
    }

    /// Depth-first walk over this error and every nested detail
    pub fn flatten(&self) -> Flatten<'_> {
        Flatten { stack: vec![self] }
    }
}

impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Error::new(message)
    }
}

impl From<String> for Error {
    fn from(message: String) -> Self {
        Error::new(message)
    }
}

/// Iterator returned by [`Error::flatten`]
#[derive(Debug)]
pub struct Flatten<'a> {
    stack: Vec<&'a Error>,
}

impl<'a> Iterator for Flatten<'a> {
    type Item = &'a Error;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        self.stack.extend(current.details.iter().rev());
        Some(current)
    }
}

/// Defects raised while wiring or resolving the mediator pipeline
#[derive(Debug, Clone, ThisError)]
pub enum MediatorError {
    /// No handler was registered for the dispatched request type
    #[error("No handler registered for request {request}")]
    HandlerNotRegistered {
        /// Type name of the request
        request: &'static str,
    },

    /// A second handler was registered for the same request type
    #[error("A handler is already registered for request {request}")]
    DuplicateHandler {
        /// Type name of the request
        request: &'static str,
    },

    /// A provider could not produce its service
    #[error("Failed to resolve {service}: {reason}")]
    ResolutionFailed {
        /// Type name of the service being resolved
        service: &'static str,
        /// Why the factory failed
        reason: String,
    },

    /// Configuration could not be accepted
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Configuration could not be parsed
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for mediator wiring and resolution
pub type MediatorResult<T> = Result<T, MediatorError>;

impl From<serde_json::Error> for MediatorError {
    fn from(err: serde_json::Error) -> Self {
        MediatorError::Serialization(err.to_string())
    }
}

impl MediatorError {
    /// Whether the error comes from how the mediator was assembled
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            MediatorError::HandlerNotRegistered { .. }
                | MediatorError::DuplicateHandler { .. }
                | MediatorError::InvalidConfiguration(_)
        )
    }
}
