//! Errors surfaced by the control cycle entry point.
//!
//! Device-level problems (missing points, out-of-range readings, failed
//! controls) never reach this type: they are recorded in the cycle log and
//! the device is taken out of service. Only structural problems detected at
//! entry are returned to the caller.

use thiserror::Error;

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Structural error that makes a control cycle impossible to evaluate.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    /// A pair of limits is ordered the wrong way round.
    #[error("invalid limits: {lower} ({lower_value}) must not exceed {upper} ({upper_value})")]
    InvalidLimits {
        lower: &'static str,
        lower_value: f64,
        upper: &'static str,
        upper_value: f64,
    },
    /// A control token is empty or shared with another token.
    #[error("invalid token `{name}`: {reason}")]
    InvalidToken { name: &'static str, reason: String },
    /// The carry-forward was produced for a different device set.
    #[error("carry-forward has {found} {kind} entries, substation has {expected}")]
    CarryForwardMismatch {
        kind: &'static str,
        expected: usize,
        found: usize,
    },
}
