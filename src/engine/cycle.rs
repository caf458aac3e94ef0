//! The per-cycle entry point.

use tracing::debug;

use super::capacitor::decide_capacitors;
use super::decision::ControlDecision;
use super::health::{evaluate_capacitors, evaluate_transformers};
use super::log::CycleLog;
use super::measurement::{MeasurementTable, ingest};
use super::tap::decide_taps;
use super::verify::verify_previous_controls;
use crate::error::Result;
use crate::model::{
    CapacitorLimits, CarryForward, SubstationConfig, SubstationCounters, SubstationSnapshot, Tokens,
};

/// Everything one cycle produces.
#[derive(Debug, Clone)]
pub struct CycleOutput {
    /// The fully evaluated snapshot, for reporting.
    pub snapshot: SubstationSnapshot,
    /// Controls for the dispatcher, in the order they were decided.
    pub decisions: Vec<ControlDecision>,
    pub log: CycleLog,
    /// Hand-off for the next cycle.
    pub carry: CarryForward,
}

/// Runs one control cycle.
///
/// The function holds no state between calls: everything that survives a
/// cycle travels in the returned [`CycleOutput::carry`], which the caller
/// passes back in next time. Independent substations can therefore be run
/// side by side with no coordination.
///
/// # Arguments
///
/// * `config` - Static substation description and limits
/// * `table` - Fresh measurements for this cycle
/// * `carry` - Hand-off from the previous cycle, or [`SubstationConfig::fresh_carry`]
/// * `day` - Day ordinal of this cycle, used to reset the daily bank counts
///
/// # Errors
///
/// Returns an `EngineError` if the limits or tokens are inconsistent, or if
/// `carry` was produced for a different set of devices. Device-level
/// problems never surface here; they appear in the log.
pub fn run_cycle(
    config: &SubstationConfig,
    table: &MeasurementTable,
    carry: &CarryForward,
    day: u32,
) -> Result<CycleOutput> {
    config.validate_against(carry)?;

    let mut log = CycleLog::new();
    let mut decisions = Vec::new();

    let mut snapshot = ingest(config, table, carry, &mut log);
    advance_dwell(&mut snapshot.counters, &config.capacitor_limits);
    roll_day(&mut snapshot, day, &mut log);
    report_program_status(&snapshot, config, &mut log);

    evaluate_transformers(&mut snapshot, &config.limits, &config.tokens, &mut log);
    evaluate_capacitors(&mut snapshot, &config.limits, &config.tokens, &mut log);
    verify_previous_controls(&mut snapshot, &mut log);
    decide_taps(
        &mut snapshot,
        &config.limits,
        &config.tokens,
        &mut log,
        &mut decisions,
    );
    decide_capacitors(
        &mut snapshot,
        &config.capacitor_limits,
        &config.tokens,
        &mut log,
        &mut decisions,
    );

    debug!(
        substation = %config.name,
        day,
        nins = snapshot.ltc.nins,
        avv = snapshot.ltc.avv,
        decisions = decisions.len(),
        "cycle complete"
    );

    let carry = snapshot.carry_forward();
    Ok(CycleOutput {
        snapshot,
        decisions,
        log,
        carry,
    })
}

/// Counts the bank and tap dwell timers up toward their thresholds.
fn advance_dwell(counters: &mut SubstationCounters, limits: &CapacitorLimits) {
    if counters.cap_delay_count < limits.cap_delay {
        counters.cap_delay_count += 1;
    }
    if counters.tap_delay_count < limits.tap_delay {
        counters.tap_delay_count += 1;
    }
}

fn roll_day(snapshot: &mut SubstationSnapshot, day: u32, log: &mut CycleLog) {
    match snapshot.counters.old_day {
        Some(old) if old == day => {}
        Some(old) => {
            for bank in &mut snapshot.capacitors {
                bank.reset_daily_counts();
            }
            log.push(format!("New day {old} -> {day}, daily capacitor counts reset"));
            snapshot.counters.old_day = Some(day);
        }
        None => snapshot.counters.old_day = Some(day),
    }
}

fn report_program_status(snapshot: &SubstationSnapshot, config: &SubstationConfig, log: &mut CycleLog) {
    let tag = &config.points.program_status_id;
    match snapshot.program_status.as_deref() {
        None => log.push(format!("LTC program status undefined bits set {tag}")),
        Some(v) if Tokens::is(Some(v), &config.tokens.on) => {
            log.push(format!("LTC program control {v}"));
        }
        Some(v) => log.push(format!("LTC program status {tag} = {v}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::model::ControlAction;

    fn table(volts: f64) -> MeasurementTable {
        let mut table = MeasurementTable::new();
        for (i, dev) in ["TX1", "TX2"].iter().enumerate() {
            table.insert(format!("{dev}.LOC_REM"), "REMOTE");
            table.insert(format!("{dev}.SCADA_SW"), "ON");
            table.insert(format!("{dev}.HS_BKR"), "CLOSE");
            table.insert(format!("{dev}.LS_BKR"), "CLOSE");
            table.insert(format!("{dev}.KV"), volts);
            table.insert(format!("{dev}.TAP"), 2_i64);
            table.insert(format!("{dev}.MW"), 25.0);
            table.insert(format!("{dev}.MVAR"), 6.0 + i as f64 * 0.5);
        }
        table.insert("SUB.LTC_PROG", "ON");
        table
    }

    #[test]
    fn dwell_counters_saturate() {
        let limits = CapacitorLimits::default();
        let mut counters = SubstationCounters::default();
        for _ in 0..10 {
            advance_dwell(&mut counters, &limits);
        }
        assert_eq!(counters.cap_delay_count, limits.cap_delay);
        assert_eq!(counters.tap_delay_count, limits.tap_delay);
    }

    #[test]
    fn first_cycle_records_day_without_reset() {
        let config = SubstationConfig::default();
        let mut carry = config.fresh_carry();
        carry.capacitors[0].nc_trip = 3;
        let out = run_cycle(&config, &table(122.0), &carry, 7);
        let out = out.ok();
        assert_eq!(out.as_ref().map(|o| o.carry.counters.old_day), Some(Some(7)));
        assert_eq!(out.as_ref().map(|o| o.carry.capacitors[0].nc_trip), Some(3));
    }

    #[test]
    fn day_change_resets_daily_counts() {
        let config = SubstationConfig::default();
        let mut carry = config.fresh_carry();
        carry.counters.old_day = Some(1);
        carry.capacitors[1].nc_close = 4;
        carry.capacitors[1].close_ex = true;
        let out = run_cycle(&config, &table(122.0), &carry, 2).ok();
        let out = out.as_ref();
        assert_eq!(out.map(|o| o.carry.capacitors[1].nc_close), Some(0));
        assert_eq!(out.map(|o| o.carry.capacitors[1].close_ex), Some(false));
        assert_eq!(out.map(|o| o.log.contains("New day 1 -> 2")), Some(true));
    }

    #[test]
    fn low_voltage_raises_after_holdoff() {
        let config = SubstationConfig::default();
        let mut carry = config.fresh_carry();
        let mut raised_at = None;
        for cycle in 0..4 {
            let out = run_cycle(&config, &table(118.0), &carry, 0);
            assert!(out.is_ok());
            let Ok(out) = out else { return };
            if !out.decisions.is_empty() && raised_at.is_none() {
                raised_at = Some(cycle);
                assert!(out.decisions.iter().all(|d| d.action == ControlAction::Raise));
                assert_eq!(out.carry.counters.consec_tap, 0);
                assert_eq!(out.carry.counters.tap_delay_count, 0);
            }
            carry = out.carry;
        }
        assert_eq!(raised_at, Some(2));
    }

    #[test]
    fn mismatched_carry_is_fatal() {
        let config = SubstationConfig::default();
        let carry = CarryForward::fresh(2, 5);
        let err = run_cycle(&config, &table(122.0), &carry, 0).err();
        assert!(matches!(
            err,
            Some(EngineError::CarryForwardMismatch { kind: "capacitor", .. })
        ));
    }

    #[test]
    fn missing_program_status_is_logged() {
        let config = SubstationConfig::default();
        let mut t = table(122.0);
        t.remove("SUB.LTC_PROG");
        let out = run_cycle(&config, &t, &config.fresh_carry(), 0).ok();
        assert_eq!(
            out.map(|o| o.log.contains("LTC program status undefined")),
            Some(true)
        );
    }
}
