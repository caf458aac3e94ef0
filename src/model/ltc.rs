//! Aggregate LTC statistics accumulated during the health pass.

use serde::{Deserialize, Serialize};

/// Substation-wide LTC statistics for one cycle.
///
/// Built fresh at the start of every cycle, accumulated over the in-service
/// transformers, then consumed by both decision state machines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LtcStatus {
    /// In-service transformer count (`Nins`).
    pub nins: usize,
    /// Running sum, then average, of in-service bus voltage (`Avv`).
    pub avv: f64,
    pub min_var: f64,
    pub max_var: f64,
    pub min_tap: i32,
    pub max_tap: i32,
    /// Raise candidate: the in-service unit with the lowest MVAR (`RTX`).
    pub rtx: Option<usize>,
    /// Lower candidate: the in-service unit with the highest MVAR (`LTX`).
    pub ltx: Option<usize>,
    /// Megavar spread `MaxVar - MinVar` (`BalMvr`).
    pub bal_mvr: f64,
    /// Tap spread `MaxTap - MinTap` (`DifTap`).
    pub dif_tap: i32,
    /// Controls from last cycle that showed no response (`Cfail`).
    pub cfail: u32,
}

impl Default for LtcStatus {
    fn default() -> Self {
        Self {
            nins: 0,
            avv: 0.0,
            min_var: f64::INFINITY,
            max_var: f64::NEG_INFINITY,
            min_tap: i32::MAX,
            max_tap: i32::MIN,
            rtx: None,
            ltx: None,
            bal_mvr: 0.0,
            dif_tap: 0,
            cfail: 0,
        }
    }
}

impl LtcStatus {
    /// Folds one in-service transformer into the running statistics.
    pub fn accumulate(&mut self, index: usize, volts: f64, mvar: f64, tap: i32) {
        self.nins += 1;
        self.avv += volts;
        if mvar < self.min_var {
            self.rtx = Some(index);
            self.min_var = mvar;
        }
        if mvar > self.max_var {
            self.ltx = Some(index);
            self.max_var = mvar;
        }
        self.min_tap = self.min_tap.min(tap);
        self.max_tap = self.max_tap.max(tap);
    }

    /// Turns the running sums into the final averages and spreads.
    ///
    /// A lone in-service transformer has nothing to be unbalanced against, so
    /// its spreads are zero. With none in service the statistics stay as
    /// seeded and the caller must skip tap control.
    pub fn finalize(&mut self) {
        match self.nins {
            0 => {}
            1 => {
                self.bal_mvr = 0.0;
                self.dif_tap = 0;
            }
            n => {
                self.avv /= n as f64;
                self.bal_mvr = self.max_var - self.min_var;
                self.dif_tap = self.max_tap - self.min_tap;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_units_average_and_spread() {
        let mut ltc = LtcStatus::default();
        ltc.accumulate(0, 118.0, 10.0, 3);
        ltc.accumulate(1, 120.0, 4.0, 5);
        ltc.finalize();

        assert_eq!(ltc.nins, 2);
        assert!((ltc.avv - 119.0).abs() < 1e-9);
        assert!((ltc.bal_mvr - 6.0).abs() < 1e-9);
        assert_eq!(ltc.dif_tap, 2);
        assert_eq!(ltc.rtx, Some(1));
        assert_eq!(ltc.ltx, Some(0));
    }

    #[test]
    fn single_unit_has_no_spread() {
        let mut ltc = LtcStatus::default();
        ltc.accumulate(1, 121.5, -40.0, 12);
        ltc.finalize();

        assert_eq!(ltc.bal_mvr, 0.0);
        assert_eq!(ltc.dif_tap, 0);
        assert!((ltc.avv - 121.5).abs() < 1e-9);
    }

    #[test]
    fn extreme_mvar_readings_still_select_candidates() {
        let mut ltc = LtcStatus::default();
        ltc.accumulate(0, 120.0, 150_000.0, 0);
        ltc.accumulate(1, 120.0, -40_000.0, 0);
        ltc.finalize();
        assert_eq!(ltc.ltx, Some(0));
        assert_eq!(ltc.rtx, Some(1));
        assert!((ltc.bal_mvr - 190_000.0).abs() < 1e-6);
    }

    #[test]
    fn equal_mvar_keeps_first_candidate() {
        let mut ltc = LtcStatus::default();
        ltc.accumulate(0, 120.0, 5.0, 0);
        ltc.accumulate(1, 120.0, 5.0, 0);
        assert_eq!(ltc.rtx, Some(0));
        assert_eq!(ltc.ltx, Some(0));
    }
}
