//! In-service evaluation and aggregate LTC statistics.
//!
//! Every check runs even after an earlier one has failed, so a single cycle
//! reports all the problems a device has.

use super::log::CycleLog;
use crate::model::{
    CapacitorBankState, LtcLimits, LtcStatus, SubstationSnapshot, Tokens, TransformerState,
};

/// Decides which transformers may be controlled and folds them into the
/// aggregate statistics.
///
/// With no transformer in service the tap hold-off counter is reset; the tap
/// decision sees `nins == 0` and does nothing. That condition is alarmed
/// once and stays quiet until a transformer returns to service.
pub fn evaluate_transformers(
    snapshot: &mut SubstationSnapshot,
    limits: &LtcLimits,
    tokens: &Tokens,
    log: &mut CycleLog,
) {
    let mut ltc = LtcStatus::default();

    for (i, tx) in snapshot.transformers.iter_mut().enumerate() {
        tx.in_service = transformer_checks(i, tx, limits, tokens, log);
        if let (true, Some(volts), Some(mvar), Some(tap)) = (tx.in_service, tx.volts, tx.mvar, tx.tap)
        {
            ltc.accumulate(i, volts, mvar, tap);
        }
    }

    ltc.finalize();
    let counters = &mut snapshot.counters;
    if ltc.nins == 0 {
        counters.consec_tap = 0;
        if !counters.no_ltc_reported {
            counters.no_ltc_reported = true;
            log.alarm("No LTC transformers in service, tap control skipped");
        }
    } else {
        counters.no_ltc_reported = false;
    }
    snapshot.ltc = ltc;
}

fn transformer_checks(
    index: usize,
    tx: &TransformerState,
    limits: &LtcLimits,
    tokens: &Tokens,
    log: &mut CycleLog,
) -> bool {
    let p = &tx.points;
    let dev = &p.device_id;
    let mut ok = true;

    match tx.loc_rem.as_deref() {
        None => {
            log.push(format!("TX {index} {dev} undefined bits set {}", p.loc_rem_id));
            ok = false;
        }
        Some(v) if v != tokens.remote => {
            log.push(format!("loc_Rem not in service {index} {dev} {} = {v}", p.loc_rem_id));
            ok = false;
        }
        Some(_) => {}
    }

    match tx.scada_sw.as_deref() {
        None => {
            log.push(format!("TX {index} {dev} undefined bits set {}", p.scada_sw_id));
            ok = false;
        }
        Some(v) if v != tokens.on => {
            log.push(format!("SCADA switch not in service {index} {dev} {} = {v}", p.scada_sw_id));
            ok = false;
        }
        Some(_) => {}
    }

    for (open, tag) in [
        (tx.high_side_open(tokens), &p.high_side_id),
        (tx.low_side_open(tokens), &p.low_side_id),
    ] {
        match open {
            None => {
                log.push(format!("TX {index} {dev} undefined bits set {tag}"));
                ok = false;
            }
            Some(true) => {
                log.push(format!("Breaker open not in service {index} {dev} {tag}"));
                ok = false;
            }
            Some(false) => {}
        }
    }

    match tx.volts {
        None => {
            log.push(format!("TX {index} {dev} undefined bits set {}", p.volts_id));
            ok = false;
        }
        Some(v) if !limits.volts_reasonable(v) => {
            log.alarm(format!(
                "Voltage unreasonable {index} {dev} {v:.2} outside [{}, {}]",
                limits.volts_extreme_low, limits.volts_extreme_high
            ));
            ok = false;
        }
        Some(_) => {}
    }

    match (tx.mw, tx.mvar) {
        (Some(mw), Some(mvar)) => {
            if mw.abs() < limits.low_signal && mvar.abs() < limits.low_signal {
                log.push(format!(
                    "Low MW and MVAR not in service {index} {dev} MW = {mw:.2} MVAR = {mvar:.2}"
                ));
                ok = false;
            }
        }
        (mw, _) => {
            let tag = if mw.is_none() { &p.mw_id } else { &p.mvar_id };
            log.push(format!("TX {index} {dev} undefined bits set {tag}"));
            ok = false;
        }
    }

    match tx.tap {
        None => {
            log.push(format!("TX {index} {dev} undefined bits set {}", p.tap_id));
            ok = false;
        }
        Some(t) if !limits.tap_reasonable(t) => {
            log.alarm(format!(
                "Tap unreasonable {index} {dev} {t} outside [{}, {}]",
                limits.tap_lowest, limits.tap_highest
            ));
            ok = false;
        }
        Some(_) => {}
    }

    ok
}

/// Decides which capacitor banks may be switched.
///
/// A bank whose operational-enable point is unavailable or not `ON` is out
/// of service without further checks. Otherwise the SCADA switch, misc
/// status, both breakers, and the lockout voltage must all pass.
pub fn evaluate_capacitors(
    snapshot: &mut SubstationSnapshot,
    limits: &LtcLimits,
    tokens: &Tokens,
    log: &mut CycleLog,
) {
    for (i, bank) in snapshot.capacitors.iter_mut().enumerate() {
        bank.in_service = match bank.op_cap.as_deref() {
            None => {
                log.push(format!(
                    "Cap Bank Control {i} {} {} undefined bits set",
                    bank.points.cap_ctl_dev, bank.points.op_cap_id
                ));
                false
            }
            Some(v) if v != tokens.on => {
                log.push(format!(
                    "op Cap Bank Control {i} {} {} = {v}",
                    bank.points.cap_ctl_dev, bank.points.op_cap_id
                ));
                false
            }
            Some(_) => capacitor_checks(i, bank, limits, tokens, log),
        };
    }
}

fn capacitor_checks(
    index: usize,
    bank: &CapacitorBankState,
    limits: &LtcLimits,
    tokens: &Tokens,
    log: &mut CycleLog,
) -> bool {
    let p = &bank.points;
    let mut ok = true;

    if !Tokens::is(bank.scada_sw.as_deref(), &tokens.on) {
        log.push(format!("CAP {index} {} SCADA switch not ON", p.cap_ctl_dev));
        ok = false;
    }

    let misc = bank.misc.as_deref();
    if Tokens::is(misc, &tokens.alarm) || Tokens::is(misc, &tokens.off) {
        log.push(format!("CAP {index} {} misc status {}", p.cap_ctl_dev, misc.unwrap_or_default()));
        ok = false;
    }

    match bank.bus_bkr.as_deref() {
        None => {
            log.push(format!("CAP I = {index} undefined bits set {}", p.bus_bkr_id));
            ok = false;
        }
        Some(v) if v != tokens.close => ok = false,
        Some(_) => {}
    }

    if bank.cap_bkr.is_none() {
        log.push(format!("CAP I = {index} undefined bits set {}", p.cap_bkr_id));
        ok = false;
    }

    match bank.lockv {
        Some(v) if limits.volts_reasonable(v) => {}
        Some(v) => {
            log.alarm(format!(
                "CAP {index} {} lockout voltage unreasonable {v:.2}",
                p.cap_ctl_dev
            ));
            ok = false;
        }
        None => {
            log.push(format!("CAP I = {index} undefined bits set {}", p.lockv_id));
            ok = false;
        }
    }

    ok
}
