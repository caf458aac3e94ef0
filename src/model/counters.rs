//! Cross-cycle counters and the carry-forward hand-off.
//!
//! A cycle never reaches back into the previous cycle's snapshot. Instead the
//! previous cycle emits a [`CarryForward`] holding exactly the values that
//! must survive, and the caller passes it into the next cycle.

use serde::{Deserialize, Serialize};

use super::tokens::ControlAction;

/// Substation-wide hold-off and dwell counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubstationCounters {
    /// Cycles counted toward the tap hold-off (`ConsecTap`).
    pub consec_tap: u32,
    /// Cycles counted toward the bank hold-off (`ConsecCap`).
    pub consec_cap: u32,
    /// Cycles since the last bank control, saturating at `Zcdel` (`Ncdel`).
    pub cap_delay_count: u32,
    /// Cycles since the last tap control, saturating at `Zdel` (`Ntdel`).
    pub tap_delay_count: u32,
    /// Day the daily bank counts belong to (`OldDay`); `None` before the first cycle.
    pub old_day: Option<u32>,
    /// Set once "no LTC in service" has been alarmed; cleared when one returns.
    pub no_ltc_reported: bool,
}

/// Per-transformer values carried into the next cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformerCarry {
    pub control_done: bool,
    pub tap: Option<i32>,
    pub mvar: Option<f64>,
    pub prev_ctl: Option<ControlAction>,
}

/// Per-bank values carried into the next cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacitorCarry {
    pub prev_ctl: Option<ControlAction>,
    pub nc_trip: u32,
    pub nc_close: u32,
    pub trip_ex: bool,
    pub close_ex: bool,
}

/// Everything one cycle hands to the next.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarryForward {
    pub counters: SubstationCounters,
    pub transformers: Vec<TransformerCarry>,
    pub capacitors: Vec<CapacitorCarry>,
}

impl CarryForward {
    /// Carry-forward for a substation that has never run: all counters zero,
    /// no pending controls.
    pub fn fresh(transformers: usize, capacitors: usize) -> Self {
        Self {
            counters: SubstationCounters::default(),
            transformers: vec![TransformerCarry::default(); transformers],
            capacitors: vec![CapacitorCarry::default(); capacitors],
        }
    }
}
