//! Capacitor bank switching decision.

use super::decision::ControlDecision;
use super::log::CycleLog;
use crate::model::{CapacitorLimits, ControlAction, SubstationSnapshot, Tokens};

/// Picks at most one bank to close or trip and applies the daily ceilings.
///
/// Banks are scanned in ascending index order and a later trigger replaces
/// an earlier one, so the highest-indexed triggering bank wins regardless of
/// whether the earlier candidate was a close or a trip.
///
/// The hold-off gate is evaluated every cycle: while `consec_cap`, the bank
/// dwell, or the tap dwell is below its threshold, `consec_cap` counts up
/// and any candidate is dropped.
pub fn decide_capacitors(
    snapshot: &mut SubstationSnapshot,
    limits: &CapacitorLimits,
    tokens: &Tokens,
    log: &mut CycleLog,
    decisions: &mut Vec<ControlDecision>,
) {
    let gt_mvr = snapshot.generators.total_mvar();
    if gt_mvr.is_none() {
        log.push("Generator MVAR unavailable, generator switching criteria disabled");
    }
    let gen_high = gt_mvr.is_some_and(|g| g > limits.close_gen_mvar);
    let gen_low = gt_mvr.is_some_and(|g| g < limits.trip_gen_mvar);

    let mut candidate = None;
    for (i, bank) in snapshot.capacitors.iter().enumerate() {
        if !bank.in_service {
            continue;
        }
        let Some(lockv) = bank.lockv else {
            continue;
        };
        let s = &bank.settings;
        let cap_bkr = bank.cap_bkr.as_deref();
        log.push(format!(
            "{i} {} {} {} {lockv:.2} < {} or gtmvr = {}",
            bank.points.cap_ctl_dev,
            bank.points.cap_ctl_id,
            cap_bkr.unwrap_or(&tokens.dashes),
            s.close_below,
            gt_mvr.map_or_else(|| tokens.dashes.clone(), |g| format!("{g:.2}")),
        ));

        if lockv < s.close_below || (gen_high && lockv < s.alt_close_below) {
            if !Tokens::is(cap_bkr, &tokens.close) {
                candidate = Some((i, ControlAction::Close));
            }
        } else if (lockv > s.trip_above || (gen_low && lockv > s.alt_trip_above))
            && !Tokens::is(cap_bkr, &tokens.trip)
        {
            candidate = Some((i, ControlAction::Trip));
        }
    }

    let c = &mut snapshot.counters;
    if c.consec_cap < limits.cap_consecutive
        || c.cap_delay_count < limits.cap_delay
        || c.tap_delay_count < limits.tap_delay
    {
        c.consec_cap += 1;
        log.push(format!(
            "Not enough CAPBANK Counts {} < {} {} < {} {} < {}",
            c.consec_cap,
            limits.cap_consecutive,
            c.cap_delay_count,
            limits.cap_delay,
            c.tap_delay_count,
            limits.tap_delay
        ));
        candidate = None;
    }

    if let Some((i, action)) = candidate {
        apply(snapshot, i, action, limits, tokens, log, decisions);
        snapshot.counters.consec_cap = 0;
    }
}

fn apply(
    snapshot: &mut SubstationSnapshot,
    index: usize,
    action: ControlAction,
    limits: &CapacitorLimits,
    tokens: &Tokens,
    log: &mut CycleLog,
    decisions: &mut Vec<ControlDecision>,
) {
    let bank = &mut snapshot.capacitors[index];
    let (count, ceiling, latched) = match action {
        ControlAction::Close => (&mut bank.nc_close, limits.max_closes_per_day, &mut bank.close_ex),
        _ => (&mut bank.nc_trip, limits.max_trips_per_day, &mut bank.trip_ex),
    };

    if *count >= ceiling {
        if !*latched {
            *latched = true;
            log.alarm(format!(
                "Exceeded MAX Control Count {} {index} {} {}",
                tokens.command(action),
                bank.points.cap_ctl_dev,
                bank.points.cap_ctl_id
            ));
        }
        return;
    }

    *count += 1;
    bank.prev_ctl = Some(action);
    snapshot.counters.cap_delay_count = 0;

    let decision = ControlDecision::capacitor(index, bank, action, tokens);
    log.control(format!(
        "CapControl {} {} {} {:.2}",
        decision.device_id,
        decision.control_point,
        decision.command,
        bank.lockv.unwrap_or_default()
    ));
    decisions.push(decision);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CapacitorSettings, SubstationConfig};

    fn snapshot_with(lockvs: &[(f64, &str)]) -> SubstationSnapshot {
        let config = SubstationConfig::default();
        let mut snapshot = SubstationSnapshot::new(&config);
        for (bank, &(lockv, bkr)) in snapshot.capacitors.iter_mut().zip(lockvs) {
            bank.in_service = true;
            bank.lockv = Some(lockv);
            bank.cap_bkr = Some(bkr.to_string());
        }
        snapshot.generators.g1_mvar = Some(10.0);
        snapshot.generators.g2_mvar = Some(10.0);
        let c = &mut snapshot.counters;
        c.consec_cap = 2;
        c.cap_delay_count = 5;
        c.tap_delay_count = 2;
        snapshot
    }

    fn run(
        snapshot: &mut SubstationSnapshot,
        limits: &CapacitorLimits,
    ) -> (Vec<ControlDecision>, CycleLog) {
        let mut log = CycleLog::new();
        let mut decisions = Vec::new();
        decide_capacitors(snapshot, limits, &Tokens::default(), &mut log, &mut decisions);
        (decisions, log)
    }

    #[test]
    fn low_lockout_closes_open_bank() {
        let mut snapshot = snapshot_with(&[(110.0, "TRIP"), (121.0, "TRIP")]);
        let (decisions, _) = run(&mut snapshot, &CapacitorLimits::default());
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].device_index, 0);
        assert_eq!(decisions[0].action, ControlAction::Close);
        assert_eq!(snapshot.capacitors[0].nc_close, 1);
        assert_eq!(snapshot.counters.cap_delay_count, 0);
        assert_eq!(snapshot.counters.consec_cap, 0);
    }

    #[test]
    fn already_closed_bank_is_not_closed_again() {
        let mut snapshot = snapshot_with(&[(110.0, "CLOSE"), (121.0, "TRIP")]);
        let (decisions, _) = run(&mut snapshot, &CapacitorLimits::default());
        assert!(decisions.is_empty());
    }

    #[test]
    fn dwell_suppresses_close() {
        let mut snapshot = snapshot_with(&[(110.0, "TRIP"), (121.0, "TRIP")]);
        snapshot.capacitors[0].settings = CapacitorSettings {
            close_below: 115.0,
            ..CapacitorSettings::default()
        };
        snapshot.counters.cap_delay_count = 2;
        let consec_before = snapshot.counters.consec_cap;
        let (decisions, log) = run(&mut snapshot, &CapacitorLimits::default());

        assert!(decisions.is_empty());
        assert_eq!(snapshot.counters.consec_cap, consec_before + 1);
        assert_eq!(snapshot.capacitors[0].nc_close, 0);
        assert_eq!(snapshot.capacitors[0].nc_trip, 0);
        assert!(log.contains("Not enough CAPBANK Counts"));
    }

    #[test]
    fn later_bank_overrides_earlier_candidate() {
        let mut snapshot = snapshot_with(&[(110.0, "TRIP"), (130.0, "CLOSE")]);
        let (decisions, _) = run(&mut snapshot, &CapacitorLimits::default());
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].device_index, 1);
        assert_eq!(decisions[0].action, ControlAction::Trip);
        assert_eq!(snapshot.capacitors[0].nc_close, 0);
    }

    #[test]
    fn high_generator_mvar_uses_alternate_close_band() {
        let mut snapshot = snapshot_with(&[(121.0, "TRIP"), (123.0, "TRIP")]);
        snapshot.generators.g1_mvar = Some(40.0);
        snapshot.generators.g2_mvar = Some(30.0);
        let (decisions, _) = run(&mut snapshot, &CapacitorLimits::default());
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].device_index, 0);
        assert_eq!(decisions[0].action, ControlAction::Close);
    }

    #[test]
    fn missing_generator_reading_disables_alternate_band() {
        let mut snapshot = snapshot_with(&[(121.0, "TRIP"), (123.0, "TRIP")]);
        snapshot.generators.g1_mvar = Some(80.0);
        snapshot.generators.g2_mvar = None;
        let (decisions, log) = run(&mut snapshot, &CapacitorLimits::default());
        assert!(decisions.is_empty());
        assert!(log.contains("Generator MVAR unavailable"));
    }

    #[test]
    fn trip_ceiling_latches_once() {
        let limits = CapacitorLimits {
            max_trips_per_day: 1,
            ..CapacitorLimits::default()
        };
        let mut snapshot = snapshot_with(&[(121.0, "CLOSE"), (130.0, "CLOSE")]);
        snapshot.capacitors[1].nc_trip = 1;

        let (decisions, log) = run(&mut snapshot, &limits);
        assert!(decisions.is_empty());
        assert!(snapshot.capacitors[1].trip_ex);
        assert_eq!(log.count_matching("Exceeded MAX Control Count"), 1);

        let c = &mut snapshot.counters;
        c.cap_delay_count = 5;
        c.consec_cap = 2;
        let (decisions, log) = run(&mut snapshot, &limits);
        assert!(decisions.is_empty());
        assert_eq!(snapshot.capacitors[1].nc_trip, 1);
        assert_eq!(log.count_matching("Exceeded MAX Control Count"), 0);
    }

    #[test]
    fn close_ceiling_latches() {
        let limits = CapacitorLimits {
            max_closes_per_day: 2,
            ..CapacitorLimits::default()
        };
        let mut snapshot = snapshot_with(&[(110.0, "TRIP"), (121.0, "TRIP")]);
        snapshot.capacitors[0].nc_close = 2;
        let (decisions, _) = run(&mut snapshot, &limits);
        assert!(decisions.is_empty());
        assert!(snapshot.capacitors[0].close_ex);
        assert_eq!(snapshot.capacitors[0].nc_close, 2);
        assert_eq!(snapshot.counters.consec_cap, 0);
    }

    #[test]
    fn out_of_service_bank_is_ignored() {
        let mut snapshot = snapshot_with(&[(110.0, "TRIP"), (121.0, "TRIP")]);
        snapshot.capacitors[0].in_service = false;
        let (decisions, _) = run(&mut snapshot, &CapacitorLimits::default());
        assert!(decisions.is_empty());
    }
}
