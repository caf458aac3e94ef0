//! Capacitor bank configuration and per-cycle state.

use serde::{Deserialize, Serialize};

use super::tokens::ControlAction;

/// Point tags for one capacitor bank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CapacitorPoints {
    /// Operational-enable point (bank available for automatic control).
    pub op_cap_id: String,
    pub scada_sw_id: String,
    pub loc_rem_id: String,
    pub auto_man_id: String,
    pub misc_id: String,
    pub bus_bkr_id: String,
    pub cap_bkr_id: String,
    /// Lockout voltage analog.
    pub lockv_id: String,
    /// Device the dispatcher writes close/trip commands to.
    pub cap_ctl_dev: String,
    pub cap_ctl_id: String,
}

impl CapacitorPoints {
    /// Builds the conventional tag set for a bank, `"<device>.<POINT>"`.
    pub fn for_device(device: &str) -> Self {
        Self {
            op_cap_id: format!("{device}.OP_CAP"),
            scada_sw_id: format!("{device}.SCADA_SW"),
            loc_rem_id: format!("{device}.LOC_REM"),
            auto_man_id: format!("{device}.AUTO_MAN"),
            misc_id: format!("{device}.MISC"),
            bus_bkr_id: format!("{device}.BUS_BKR"),
            cap_bkr_id: format!("{device}.CAP_BKR"),
            lockv_id: format!("{device}.LOCK_KV"),
            cap_ctl_dev: device.to_string(),
            cap_ctl_id: format!("{device}.CAP_CTL"),
        }
    }
}

/// Lockout-voltage hysteresis bands for one bank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CapacitorSettings {
    /// Close when the lockout voltage falls below this (`Clov`).
    pub close_below: f64,
    /// Trip when the lockout voltage rises above this (`Chiv`).
    pub trip_above: f64,
    /// Alternate close band, used while generator MVAR is high (`Alovc`).
    pub alt_close_below: f64,
    /// Alternate trip band, used while generator MVAR is low (`Ahivt`).
    pub alt_trip_above: f64,
}

impl Default for CapacitorSettings {
    fn default() -> Self {
        Self {
            close_below: 119.0,
            trip_above: 127.0,
            alt_close_below: 122.0,
            alt_trip_above: 124.0,
        }
    }
}

/// Configuration of one bank: its tags and its bands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CapacitorConfig {
    pub points: CapacitorPoints,
    pub settings: CapacitorSettings,
}

/// One capacitor bank as seen during a single control cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacitorBankState {
    pub points: CapacitorPoints,
    pub settings: CapacitorSettings,
    pub op_cap: Option<String>,
    pub scada_sw: Option<String>,
    pub loc_rem: Option<String>,
    pub auto_man: Option<String>,
    pub misc: Option<String>,
    pub bus_bkr: Option<String>,
    pub cap_bkr: Option<String>,
    pub lockv: Option<f64>,
    /// Trips issued today (`NcTrip`).
    pub nc_trip: u32,
    /// Closes issued today (`NcClose`).
    pub nc_close: u32,
    /// The daily trip ceiling has been reached and reported (`TripEx`).
    pub trip_ex: bool,
    /// The daily close ceiling has been reached and reported (`CloseEx`).
    pub close_ex: bool,
    pub in_service: bool,
    pub prev_ctl: Option<ControlAction>,
}

impl CapacitorBankState {
    /// Creates a bank with no readings, out of service, with clean daily counts.
    pub fn new(config: &CapacitorConfig) -> Self {
        Self {
            points: config.points.clone(),
            settings: config.settings,
            op_cap: None,
            scada_sw: None,
            loc_rem: None,
            auto_man: None,
            misc: None,
            bus_bkr: None,
            cap_bkr: None,
            lockv: None,
            nc_trip: 0,
            nc_close: 0,
            trip_ex: false,
            close_ex: false,
            in_service: false,
            prev_ctl: None,
        }
    }

    /// Clears the daily trip/close counts and their latches.
    pub fn reset_daily_counts(&mut self) {
        self.nc_trip = 0;
        self.nc_close = 0;
        self.trip_ex = false;
        self.close_ex = false;
    }
}
