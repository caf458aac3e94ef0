//! Status and command tokens used by the SCADA points.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// String values the SCADA system reports for statuses and accepts as commands.
///
/// Status points are compared against these tokens rather than against
/// hard-coded literals, so a utility can map its own vocabulary (for example
/// `"CLOSED"` instead of `"CLOSE"`) through configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tokens {
    pub raise: String,
    pub lower: String,
    pub close: String,
    pub trip: String,
    pub on: String,
    pub off: String,
    pub remote: String,
    pub local: String,
    pub auto: String,
    pub manual: String,
    pub normal: String,
    pub alarm: String,
    /// Placeholder written when a point has no meaningful value.
    pub dashes: String,
}

impl Default for Tokens {
    fn default() -> Self {
        Self {
            raise: "RAISE".to_string(),
            lower: "LOWER".to_string(),
            close: "CLOSE".to_string(),
            trip: "TRIP".to_string(),
            on: "ON".to_string(),
            off: "OFF".to_string(),
            remote: "REMOTE".to_string(),
            local: "LOCAL".to_string(),
            auto: "AUTO".to_string(),
            manual: "MANUAL".to_string(),
            normal: "NORMAL".to_string(),
            alarm: "ALARM".to_string(),
            dashes: "----".to_string(),
        }
    }
}

impl Tokens {
    fn named(&self) -> [(&'static str, &str); 13] {
        [
            ("raise", self.raise.as_str()),
            ("lower", self.lower.as_str()),
            ("close", self.close.as_str()),
            ("trip", self.trip.as_str()),
            ("on", self.on.as_str()),
            ("off", self.off.as_str()),
            ("remote", self.remote.as_str()),
            ("local", self.local.as_str()),
            ("auto", self.auto.as_str()),
            ("manual", self.manual.as_str()),
            ("normal", self.normal.as_str()),
            ("alarm", self.alarm.as_str()),
            ("dashes", self.dashes.as_str()),
        ]
    }

    /// Checks that every token is non-empty and distinct from the others.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidToken` naming the first offending token.
    pub fn validate(&self) -> Result<()> {
        let named = self.named();
        for (i, &(name, value)) in named.iter().enumerate() {
            if value.is_empty() {
                return Err(EngineError::InvalidToken {
                    name,
                    reason: "must not be empty".to_string(),
                });
            }
            if let Some((other, _)) = named[..i].iter().find(|(_, v)| *v == value) {
                return Err(EngineError::InvalidToken {
                    name,
                    reason: format!("duplicates token `{other}` (\"{value}\")"),
                });
            }
        }
        Ok(())
    }

    /// Returns the command string written to the control point for `action`.
    pub fn command(&self, action: ControlAction) -> &str {
        match action {
            ControlAction::Raise => &self.raise,
            ControlAction::Lower => &self.lower,
            ControlAction::Close => &self.close,
            ControlAction::Trip => &self.trip,
        }
    }

    /// Returns `true` if `value` is present and equals `token`.
    pub fn is(value: Option<&str>, token: &str) -> bool {
        value == Some(token)
    }
}

/// A control the engine can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlAction {
    /// Move an LTC one tap up.
    Raise,
    /// Move an LTC one tap down.
    Lower,
    /// Put a capacitor bank in service.
    Close,
    /// Take a capacitor bank out of service.
    Trip,
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ControlAction::Raise => "raise",
            ControlAction::Lower => "lower",
            ControlAction::Close => "close",
            ControlAction::Trip => "trip",
        };
        f.write_str(s)
    }
}
