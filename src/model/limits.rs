//! Static substation limits, loaded once per run.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Voltage, tap, and megavar limits governing the LTC transformers.
///
/// Field docs give the classic mnemonic used on the substation data sheets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LtcLimits {
    /// Extreme low bus voltage (`ZVLO`); below it a reading is not trusted.
    pub volts_extreme_low: f64,
    /// Low edge of the operating band (`VLLIM`).
    pub volts_low_limit: f64,
    /// High edge of the operating band (`VHLIM`).
    pub volts_high_limit: f64,
    /// Extreme high bus voltage (`ZVHI`).
    pub volts_extreme_high: f64,
    /// Lowest usable tap (`ZLOTAP`).
    pub tap_lowest: i32,
    /// Highest usable tap (`ZHITAP`).
    pub tap_highest: i32,
    /// Megavar spread above which the LTCs are considered unbalanced (`ZBAL`).
    pub mvar_balance: f64,
    /// MW and MVAR magnitudes below this mean a dead signal (`ZLOWV`).
    pub low_signal: f64,
    /// Largest tap spread at which the LTCs are still coordinated (`ZDIFTAP`).
    pub max_tap_spread: i32,
    /// Consecutive cycles required before a tap control fires (`ZTCONS`).
    pub tap_consecutive: u32,
}

impl Default for LtcLimits {
    fn default() -> Self {
        Self {
            volts_extreme_low: 100.0,
            volts_low_limit: 120.0,
            volts_high_limit: 126.0,
            volts_extreme_high: 140.0,
            tap_lowest: -16,
            tap_highest: 16,
            mvar_balance: 5.0,
            low_signal: 0.5,
            max_tap_spread: 4,
            tap_consecutive: 2,
        }
    }
}

impl LtcLimits {
    /// Midpoint of the operating band, used to pick the direction of a
    /// balance-only correction.
    pub fn band_midpoint(&self) -> f64 {
        (self.volts_low_limit + self.volts_high_limit) / 2.0
    }

    /// Returns `true` if `volts` lies within the extreme band `[ZVLO, ZVHI]`.
    pub fn volts_reasonable(&self, volts: f64) -> bool {
        volts >= self.volts_extreme_low && volts <= self.volts_extreme_high
    }

    /// Returns `true` if `tap` lies within `[ZLOTAP, ZHITAP]`.
    pub fn tap_reasonable(&self, tap: i32) -> bool {
        tap >= self.tap_lowest && tap <= self.tap_highest
    }

    /// Checks that every lower bound sits at or below its upper bound.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidLimits` for the first inverted pair.
    pub fn validate(&self) -> Result<()> {
        let pairs = [
            (
                "volts_extreme_low",
                self.volts_extreme_low,
                "volts_low_limit",
                self.volts_low_limit,
            ),
            (
                "volts_low_limit",
                self.volts_low_limit,
                "volts_high_limit",
                self.volts_high_limit,
            ),
            (
                "volts_high_limit",
                self.volts_high_limit,
                "volts_extreme_high",
                self.volts_extreme_high,
            ),
            (
                "tap_lowest",
                f64::from(self.tap_lowest),
                "tap_highest",
                f64::from(self.tap_highest),
            ),
        ];
        for (lower, lower_value, upper, upper_value) in pairs {
            if lower_value > upper_value {
                return Err(EngineError::InvalidLimits {
                    lower,
                    lower_value,
                    upper,
                    upper_value,
                });
            }
        }
        if self.mvar_balance < 0.0 {
            return Err(EngineError::InvalidLimits {
                lower: "0",
                lower_value: 0.0,
                upper: "mvar_balance",
                upper_value: self.mvar_balance,
            });
        }
        if self.max_tap_spread < 0 {
            return Err(EngineError::InvalidLimits {
                lower: "0",
                lower_value: 0.0,
                upper: "max_tap_spread",
                upper_value: f64::from(self.max_tap_spread),
            });
        }
        Ok(())
    }
}

/// Dwell, daily-count, and generator thresholds governing the capacitor banks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CapacitorLimits {
    /// Consecutive cycles required before a bank control fires (`Zccons`).
    pub cap_consecutive: u32,
    /// Cycles that must pass after a bank control before the next (`Zcdel`).
    pub cap_delay: u32,
    /// Cycles that must pass after a tap control before a bank control (`Zdel`).
    pub tap_delay: u32,
    /// Trips allowed per bank per day (`Zmaxtrip`).
    pub max_trips_per_day: u32,
    /// Closes allowed per bank per day (`Zmaxclose`).
    pub max_closes_per_day: u32,
    /// Generator MVAR above which banks close on the alternate band (`Zclmvr`).
    pub close_gen_mvar: f64,
    /// Generator MVAR below which banks trip on the alternate band (`Ztrmvr`).
    pub trip_gen_mvar: f64,
}

impl Default for CapacitorLimits {
    fn default() -> Self {
        Self {
            cap_consecutive: 2,
            cap_delay: 5,
            tap_delay: 2,
            max_trips_per_day: 4,
            max_closes_per_day: 4,
            close_gen_mvar: 60.0,
            trip_gen_mvar: -20.0,
        }
    }
}
