//! Multi-cycle driver that threads the carry-forward between cycles.

use std::fmt;

use tracing::info;

use super::plant::Plant;
use crate::engine::{ControlDecision, MeasurementTable, run_cycle};
use crate::error::Result;
use crate::model::{CarryForward, ControlAction, SubstationConfig};

/// Summary of one evaluated cycle.
#[derive(Debug, Clone)]
pub struct CycleRecord {
    pub cycle: usize,
    pub day: u32,
    /// In-service transformer count.
    pub nins: usize,
    /// Average in-service bus voltage (kV).
    pub avg_kv: f64,
    pub bal_mvar: f64,
    pub dif_tap: i32,
    /// Controls from the previous cycle that showed no response.
    pub cfail: u32,
    /// Whether the average voltage sits inside the operating band.
    pub in_band: bool,
    /// Tap reading of each transformer.
    pub taps: Vec<Option<i32>>,
    pub decisions: Vec<ControlDecision>,
    /// Rendered audit trail.
    pub log: String,
}

impl CycleRecord {
    /// Number of decisions with the given action.
    pub fn count(&self, action: ControlAction) -> usize {
        self.decisions.iter().filter(|d| d.action == action).count()
    }
}

impl fmt::Display for CycleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let taps: Vec<String> = self
            .taps
            .iter()
            .map(|t| t.map_or_else(|| "-".to_string(), |t| t.to_string()))
            .collect();
        let decisions: Vec<String> = self.decisions.iter().map(ToString::to_string).collect();
        write!(
            f,
            "c={:>3} d={:>2} | kv={:>7.2} bal={:>5.2} dif={:>2} nins={} | taps=[{}] | ctl=[{}]{}",
            self.cycle,
            self.day,
            self.avg_kv,
            self.bal_mvar,
            self.dif_tap,
            self.nins,
            taps.join(","),
            decisions.join("; "),
            if self.cfail > 0 { " FAIL" } else { "" },
        )
    }
}

/// Drives the engine over successive measurement tables.
///
/// The runner owns the carry-forward; each [`Runner::step`] feeds the
/// previous cycle's hand-off into the next.
#[derive(Debug, Clone)]
pub struct Runner {
    config: SubstationConfig,
    carry: CarryForward,
    cycles_per_day: usize,
    next_cycle: usize,
}

impl Runner {
    /// Creates a runner starting from `carry`.
    ///
    /// # Arguments
    ///
    /// * `config` - Substation description
    /// * `carry` - Starting hand-off, fresh or loaded from a state file
    /// * `cycles_per_day` - Cycles per day for the day ordinal (clamped to >= 1)
    pub fn new(config: SubstationConfig, carry: CarryForward, cycles_per_day: usize) -> Self {
        Self {
            config,
            carry,
            cycles_per_day: cycles_per_day.max(1),
            next_cycle: 0,
        }
    }

    /// Runner for a substation that has never run.
    pub fn fresh(config: SubstationConfig, cycles_per_day: usize) -> Self {
        let carry = config.fresh_carry();
        Self::new(config, carry, cycles_per_day)
    }

    pub fn carry(&self) -> &CarryForward {
        &self.carry
    }

    /// Evaluates one cycle and advances the hand-off.
    ///
    /// # Errors
    ///
    /// Returns an `EngineError` if the configuration or carry-forward is
    /// structurally invalid; the carry-forward is left unchanged.
    pub fn step(&mut self, table: &MeasurementTable) -> Result<CycleRecord> {
        let cycle = self.next_cycle;
        let day = u32::try_from(cycle / self.cycles_per_day).unwrap_or(u32::MAX);
        let out = run_cycle(&self.config, table, &self.carry, day)?;

        let ltc = &out.snapshot.ltc;
        let limits = &self.config.limits;
        let record = CycleRecord {
            cycle,
            day,
            nins: ltc.nins,
            avg_kv: ltc.avv,
            bal_mvar: ltc.bal_mvr,
            dif_tap: ltc.dif_tap,
            cfail: ltc.cfail,
            in_band: ltc.nins > 0
                && ltc.avv >= limits.volts_low_limit
                && ltc.avv < limits.volts_high_limit,
            taps: out.snapshot.transformers.iter().map(|tx| tx.tap).collect(),
            decisions: out.decisions,
            log: out.log.to_string(),
        };

        self.carry = out.carry;
        self.next_cycle += 1;
        Ok(record)
    }

    /// Runs `cycles` cycles against a simulated plant, applying each
    /// cycle's decisions before the next measurement.
    ///
    /// # Errors
    ///
    /// Stops at the first structural `EngineError`.
    pub fn run_plant(&mut self, plant: &mut Plant, cycles: usize) -> Result<Vec<CycleRecord>> {
        let mut records = Vec::with_capacity(cycles);
        for _ in 0..cycles {
            let table = plant.measurements(self.next_cycle);
            let record = self.step(&table)?;
            let ignored = plant.apply(&record.decisions);
            if ignored > 0 {
                info!(cycle = record.cycle, ignored, "plant ignored tap commands");
            }
            records.push(record);
        }
        Ok(records)
    }

    /// Runs one cycle per recorded measurement frame.
    ///
    /// # Errors
    ///
    /// Stops at the first structural `EngineError`.
    pub fn run_frames(&mut self, frames: &[MeasurementTable]) -> Result<Vec<CycleRecord>> {
        frames.iter().map(|table| self.step(table)).collect()
    }
}
