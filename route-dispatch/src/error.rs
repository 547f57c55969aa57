//! Error types for route definition and dispatch
//!
//! # Error Codes
//!
//! Error codes are represented by the [`RouteErrorCode`] enum. When serialized,
//! codes are converted to SCREAMING_SNAKE_CASE strings.
//!
//! Definition-time errors (`InvalidConfiguration`, `InvalidArgument`,
//! `AlreadyFinalized`) are raised at the mutating call. Failures raised by a
//! handler during dispatch travel back to the caller untouched.
//!
//! # Example
//! ```rust,ignore
//! use route_dispatch::{RouteError, RouteErrorCode};
//!
//! let error = RouteError::new(RouteErrorCode::InvocationFailure, "database offline");
//! let error = RouteError::invocation("database offline"); // Convenience method
//! ```

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use thiserror::Error;

/// Error codes for route operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteErrorCode {
    // Definition-time errors
    /// A configuration value (e.g. output capture mode) is not recognised
    InvalidConfiguration,
    /// An argument to a route mutator is unusable
    InvalidArgument,
    /// Middleware was added after the chain was finalized
    AlreadyFinalized,

    // Dispatch-time errors
    /// The handler or invocation strategy failed
    InvocationFailure,
    /// A named handler could not be resolved
    HandlerNotResolved,
    /// No route is registered under the requested identifier or name
    RouteNotFound,
    /// JSON serialization/deserialization failed
    SerializationError,
}

impl RouteErrorCode {
    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration => "INVALID_CONFIGURATION",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::AlreadyFinalized => "ALREADY_FINALIZED",
            Self::InvocationFailure => "INVOCATION_FAILURE",
            Self::HandlerNotResolved => "HANDLER_NOT_RESOLVED",
            Self::RouteNotFound => "ROUTE_NOT_FOUND",
            Self::SerializationError => "SERIALIZATION_ERROR",
        }
    }

    /// Returns true if the error is raised while defining routes rather than
    /// while dispatching a request.
    pub fn is_definition_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration | Self::InvalidArgument | Self::AlreadyFinalized
        )
    }
}

impl fmt::Display for RouteErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Route error with a typed code and message.
///
/// # Example
/// ```rust,ignore
/// use route_dispatch::RouteError;
///
/// let error = RouteError::invocation("upstream timed out")
///     .with_details(serde_json::json!({"upstream": "billing"}))
///     .with_cause("connect: connection refused");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("[{code}] {message}")]
pub struct RouteError {
    /// Typed error code
    pub code: RouteErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (JSON value)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Optional cause for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl RouteError {
    /// Create a new error with code and message.
    pub fn new(code: RouteErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            cause: None,
        }
    }

    /// Add details to the error.
    pub fn with_details(mut self, details: impl Serialize) -> Self {
        self.details = serde_json::to_value(details).ok();
        self
    }

    /// Add a cause string for debugging.
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    // Convenience constructors

    /// Create an INVALID_CONFIGURATION error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::new(RouteErrorCode::InvalidConfiguration, message)
    }

    /// Create an INVALID_ARGUMENT error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(RouteErrorCode::InvalidArgument, message)
    }

    /// Create an ALREADY_FINALIZED error.
    pub fn already_finalized(route: impl fmt::Display) -> Self {
        Self::new(
            RouteErrorCode::AlreadyFinalized,
            format!("Middleware can't be added to '{}' once it has been finalized", route),
        )
    }

    /// Create an INVOCATION_FAILURE error.
    pub fn invocation(message: impl Into<String>) -> Self {
        Self::new(RouteErrorCode::InvocationFailure, message)
    }

    /// Create a HANDLER_NOT_RESOLVED error.
    pub fn handler_not_resolved(name: &str) -> Self {
        Self::new(
            RouteErrorCode::HandlerNotResolved,
            format!("Handler '{}' could not be resolved", name),
        )
    }

    /// Create a ROUTE_NOT_FOUND error.
    pub fn route_not_found(key: impl fmt::Display) -> Self {
        Self::new(
            RouteErrorCode::RouteNotFound,
            format!("Route '{}' not found", key),
        )
    }

    /// Create a SERIALIZATION_ERROR error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(RouteErrorCode::SerializationError, message)
    }
}

impl From<serde_json::Error> for RouteError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for RouteError {
    fn from(err: std::io::Error) -> Self {
        Self::invocation(format!("IO error: {}", err))
    }
}

impl From<Infallible> for RouteError {
    fn from(err: Infallible) -> Self {
        match err {}
    }
}

/// Result type alias for route operations.
pub type RouteResult<T> = Result<T, RouteError>;
