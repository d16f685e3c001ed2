//! Engine error types
//!
//! Only configuration problems are errors. Transient input problems (zero-size
//! resizes, out-of-range control events) are clamped or skipped where they
//! happen, and host side-effect failures never reach the engine.

use thiserror::Error;

/// Errors that prevent a run from starting
#[derive(Debug, Error)]
pub enum EngineError {
    /// Arena has no drawable area
    #[error("invalid arena {width}x{height}: both dimensions must be positive")]
    InvalidArena {
        /// Requested width
        width: f32,
        /// Requested height
        height: f32,
    },

    /// A configuration field is out of range
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Dotted path of the offending field
        field: &'static str,
        /// The value provided
        value: String,
        /// Description of the accepted range
        expected: &'static str,
    },

    /// Unknown preset name
    #[error("unknown preset '{0}'")]
    UnknownPreset(String),

    /// Configuration JSON could not be parsed
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Configuration file could not be read
    #[error("config read error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub(crate) fn invalid(field: &'static str, value: impl ToString, expected: &'static str) -> Self {
        Self::InvalidValue {
            field,
            value: value.to_string(),
            expected,
        }
    }
}
