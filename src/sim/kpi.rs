//! Post-hoc KPI computation from cycle records.

use std::fmt;

use super::runner::CycleRecord;
use crate::model::ControlAction;

/// Aggregate indicators derived from a complete run.
///
/// Computed post-hoc from `Vec<CycleRecord>` so the reported figures always
/// agree with the per-cycle data.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiReport {
    /// Cycles evaluated.
    pub cycles: usize,
    pub tap_raises: usize,
    pub tap_lowers: usize,
    pub bank_closes: usize,
    pub bank_trips: usize,
    /// Tap controls that showed no response on the following cycle.
    pub control_failures: u32,
    /// Cycles with at least one LTC in service but average voltage outside the band.
    pub out_of_band_cycles: usize,
    /// Cycles with no LTC in service.
    pub no_ltc_cycles: usize,
    /// Mean average voltage over cycles with an LTC in service (kV).
    pub mean_kv: f64,
    pub min_kv: f64,
    pub max_kv: f64,
}

impl KpiReport {
    /// Computes all KPIs from the complete record vector.
    ///
    /// # Arguments
    ///
    /// * `records` - Every cycle of the run, in order
    ///
    /// # Returns
    ///
    /// A `KpiReport` with all fields populated; voltage figures are zero
    /// when no cycle had an LTC in service.
    pub fn from_records(records: &[CycleRecord]) -> Self {
        let mut report = Self {
            cycles: records.len(),
            tap_raises: 0,
            tap_lowers: 0,
            bank_closes: 0,
            bank_trips: 0,
            control_failures: 0,
            out_of_band_cycles: 0,
            no_ltc_cycles: 0,
            mean_kv: 0.0,
            min_kv: 0.0,
            max_kv: 0.0,
        };

        let mut kv_sum = 0.0;
        let mut kv_n = 0_usize;
        let mut min_kv = f64::INFINITY;
        let mut max_kv = f64::NEG_INFINITY;

        for r in records {
            report.tap_raises += r.count(ControlAction::Raise);
            report.tap_lowers += r.count(ControlAction::Lower);
            report.bank_closes += r.count(ControlAction::Close);
            report.bank_trips += r.count(ControlAction::Trip);
            report.control_failures += r.cfail;

            if r.nins == 0 {
                report.no_ltc_cycles += 1;
                continue;
            }
            if !r.in_band {
                report.out_of_band_cycles += 1;
            }
            kv_sum += r.avg_kv;
            kv_n += 1;
            min_kv = min_kv.min(r.avg_kv);
            max_kv = max_kv.max(r.avg_kv);
        }

        if kv_n > 0 {
            report.mean_kv = kv_sum / kv_n as f64;
            report.min_kv = min_kv;
            report.max_kv = max_kv;
        }
        report
    }
}

impl fmt::Display for KpiReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- KPI Report ---")?;
        writeln!(f, "Cycles:                {}", self.cycles)?;
        writeln!(
            f,
            "Tap controls:          {} raise, {} lower",
            self.tap_raises, self.tap_lowers
        )?;
        writeln!(
            f,
            "Bank controls:         {} close, {} trip",
            self.bank_closes, self.bank_trips
        )?;
        writeln!(f, "Control failures:      {}", self.control_failures)?;
        writeln!(f, "Out-of-band cycles:    {}", self.out_of_band_cycles)?;
        writeln!(f, "Cycles without LTC:    {}", self.no_ltc_cycles)?;
        write!(
            f,
            "Average voltage:       {:.2} kV (min {:.2}, max {:.2})",
            self.mean_kv, self.min_kv, self.max_kv
        )
    }
}
