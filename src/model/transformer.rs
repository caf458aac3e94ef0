//! LTC transformer configuration and per-cycle state.

use serde::{Deserialize, Serialize};

use super::tokens::{ControlAction, Tokens};

/// Point tags for one LTC transformer.
///
/// The tags are opaque keys into the measurement table; the engine never
/// interprets them beyond lookup and reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformerPoints {
    /// Device location, e.g. `"TX4"`.
    pub device_id: String,
    pub loc_rem_id: String,
    pub scada_sw_id: String,
    pub high_side_id: String,
    pub low_side_id: String,
    pub tap_id: String,
    pub mw_id: String,
    pub mvar_id: String,
    pub volts_id: String,
    /// Control point the dispatcher writes raise/lower commands to.
    pub ltc_ctl_id: String,
}

impl TransformerPoints {
    /// Builds the conventional tag set for a device, `"<device>.<POINT>"`.
    pub fn for_device(device_id: &str) -> Self {
        Self {
            device_id: device_id.to_string(),
            loc_rem_id: format!("{device_id}.LOC_REM"),
            scada_sw_id: format!("{device_id}.SCADA_SW"),
            high_side_id: format!("{device_id}.HS_BKR"),
            low_side_id: format!("{device_id}.LS_BKR"),
            tap_id: format!("{device_id}.TAP"),
            mw_id: format!("{device_id}.MW"),
            mvar_id: format!("{device_id}.MVAR"),
            volts_id: format!("{device_id}.KV"),
            ltc_ctl_id: format!("{device_id}.LTC_CTL"),
        }
    }
}

/// One transformer as seen during a single control cycle.
///
/// Readings are `None` when the point was absent from the measurement table.
/// `prev_tap`/`prev_mvar`, `control_done`, and `prev_ctl` arrive through the
/// carry-forward; everything else is re-derived each cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformerState {
    pub points: TransformerPoints,
    pub loc_rem: Option<String>,
    pub scada_sw: Option<String>,
    pub high_side: Option<String>,
    pub low_side: Option<String>,
    pub volts: Option<f64>,
    pub tap: Option<i32>,
    pub mw: Option<f64>,
    pub mvar: Option<f64>,
    /// Tap reading from the previous cycle.
    pub prev_tap: Option<i32>,
    /// MVAR reading from the previous cycle.
    pub prev_mvar: Option<f64>,
    pub in_service: bool,
    /// A control was issued last cycle and awaits verification.
    pub control_done: bool,
    pub prev_ctl: Option<ControlAction>,
}

impl TransformerState {
    /// Creates a transformer with no readings, out of service.
    pub fn new(points: TransformerPoints) -> Self {
        Self {
            points,
            loc_rem: None,
            scada_sw: None,
            high_side: None,
            low_side: None,
            volts: None,
            tap: None,
            mw: None,
            mvar: None,
            prev_tap: None,
            prev_mvar: None,
            in_service: false,
            control_done: false,
            prev_ctl: None,
        }
    }

    /// Whether the high-side breaker reads tripped; `None` if unavailable.
    pub fn high_side_open(&self, tokens: &Tokens) -> Option<bool> {
        self.high_side.as_deref().map(|v| v == tokens.trip)
    }

    /// Whether the low-side breaker reads tripped; `None` if unavailable.
    pub fn low_side_open(&self, tokens: &Tokens) -> Option<bool> {
        self.low_side.as_deref().map(|v| v == tokens.trip)
    }

    /// Tap position, or the given fallback when the reading is missing.
    ///
    /// In-service transformers always have a tap reading, so the fallback
    /// only matters for out-of-service units.
    pub fn tap_or(&self, fallback: i32) -> i32 {
        self.tap.unwrap_or(fallback)
    }
}
