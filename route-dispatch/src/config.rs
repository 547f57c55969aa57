//! Route settings
//!
//! [`RouteSettings`] holds the defaults a [`RouteCollector`](crate::RouteCollector)
//! applies to every route it creates.
//!
//! # Example
//! ```rust,ignore
//! use route_dispatch::{OutputCapture, RouteSettings};
//!
//! let settings = RouteSettings::new()
//!     .with_output_capture(OutputCapture::Prepend)
//!     .with_debug_logging(true);
//!
//! // Or from JSON
//! let settings = RouteSettings::from_json(r#"{"output_capture": "prepend"}"#)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::{OutputCapture, RouteError, RouteResult};

/// Defaults applied to newly created routes.
///
/// # Fields
///
/// * `output_capture` - How output written by handlers is merged into the
///   response. Accepts `"append"`, `"prepend"`, `"disabled"` or `false` when
///   deserialized. Default: `Append`.
///
/// * `debug_logging` - Log bound arguments and reconciliation details for
///   every dispatch. Default: false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteSettings {
    /// Output capture mode for new routes (default: Append)
    pub output_capture: OutputCapture,
    /// Enable per-dispatch debug logging (default: false)
    pub debug_logging: bool,
}

impl Default for RouteSettings {
    fn default() -> Self {
        Self {
            output_capture: OutputCapture::default(),
            debug_logging: false,
        }
    }
}

impl RouteSettings {
    /// Create settings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> RouteResult<Self> {
        serde_json::from_str(json).map_err(|err| {
            RouteError::invalid_configuration("Invalid route settings").with_cause(err.to_string())
        })
    }

    /// Set the output capture mode.
    pub fn with_output_capture(mut self, mode: OutputCapture) -> Self {
        self.output_capture = mode;
        self
    }

    /// Enable or disable per-dispatch debug logging.
    pub fn with_debug_logging(mut self, enabled: bool) -> Self {
        self.debug_logging = enabled;
        self
    }
}
