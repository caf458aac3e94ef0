//! Tap-changer decision.
//!
//! Runs after the health pass and the verifier. Priority order:
//!
//! 1. hold-off: `consec_tap` counts up to `tap_consecutive` before anything fires;
//! 2. tap spread above `max_tap_spread`: no tap control this cycle;
//! 3. voltage low: raise (the lowest-MVAR unit if unbalanced, else every unit
//!    below the top tap);
//! 4. voltage high: the mirror image with lower;
//! 5. voltage fine but MVAR unbalanced: move one unit toward the band centre.

use super::decision::ControlDecision;
use super::log::CycleLog;
use crate::model::{ControlAction, LtcLimits, SubstationSnapshot, Tokens};

/// Decides raise/lower controls for the LTC transformers.
pub fn decide_taps(
    snapshot: &mut SubstationSnapshot,
    limits: &LtcLimits,
    tokens: &Tokens,
    log: &mut CycleLog,
    decisions: &mut Vec<ControlDecision>,
) {
    if snapshot.ltc.nins == 0 {
        return;
    }

    let too_far_apart = snapshot.ltc.dif_tap > limits.max_tap_spread;
    if too_far_apart {
        log.alarm(format!(
            "LTCs are too far apart must EXIT {} {}",
            snapshot.ltc.dif_tap, limits.max_tap_spread
        ));
    }

    // The hold-off keeps counting even while the spread blocks control.
    let counters = &mut snapshot.counters;
    if counters.consec_tap < limits.tap_consecutive {
        counters.consec_tap += 1;
        log.push(format!(
            "Not enough Counts yet = {} < {}",
            counters.consec_tap, limits.tap_consecutive
        ));
        return;
    }
    if too_far_apart {
        return;
    }

    let avv = snapshot.ltc.avv;
    let bal = snapshot.ltc.bal_mvr;
    let unbalanced = bal > limits.mvar_balance;
    let (mut rtx, mut ltx) = (snapshot.ltc.rtx, snapshot.ltc.ltx);

    // A candidate pinned at its end stop cannot correct the imbalance.
    if unbalanced {
        for tx in snapshot.transformers.iter().filter(|tx| tx.in_service) {
            let (Some(tap), Some(mvar)) = (tx.tap, tx.mvar) else {
                continue;
            };
            if tap >= limits.tap_highest && mvar == snapshot.ltc.min_var {
                rtx = None;
            } else if tap <= limits.tap_lowest && mvar == snapshot.ltc.max_var {
                ltx = None;
            }
        }
    }

    let mut ctx = TapContext {
        snapshot,
        tokens,
        log,
        decisions,
    };

    if avv < limits.volts_low_limit {
        let reason = format!("KV = {avv:.2}");
        if unbalanced {
            ctx.control(rtx, ControlAction::Raise, &reason);
        } else {
            for i in ctx.in_service() {
                let below_top = ctx.snapshot.transformers[i].tap_or(limits.tap_highest)
                    < limits.tap_highest;
                ctx.control(below_top.then_some(i), ControlAction::Raise, &reason);
            }
        }
    } else if avv >= limits.volts_high_limit {
        let reason = format!("KV = {avv:.2}");
        if unbalanced {
            ctx.control(ltx, ControlAction::Lower, &reason);
        } else {
            for i in ctx.in_service() {
                let above_bottom = ctx.snapshot.transformers[i].tap_or(limits.tap_lowest)
                    > limits.tap_lowest;
                ctx.control(above_bottom.then_some(i), ControlAction::Lower, &reason);
            }
        }
    } else if unbalanced {
        let reason = format!("MVR SPREAD = {bal:.2}");
        if avv > limits.band_midpoint() {
            ctx.control(ltx, ControlAction::Lower, &reason);
        } else {
            ctx.control(rtx, ControlAction::Raise, &reason);
        }
    } else {
        ctx.log.push("Sub Taps No Controls Needed this Cycle");
    }
}

struct TapContext<'a> {
    snapshot: &'a mut SubstationSnapshot,
    tokens: &'a Tokens,
    log: &'a mut CycleLog,
    decisions: &'a mut Vec<ControlDecision>,
}

impl TapContext<'_> {
    fn in_service(&self) -> Vec<usize> {
        self.snapshot
            .transformers
            .iter()
            .enumerate()
            .filter(|(_, tx)| tx.in_service)
            .map(|(i, _)| i)
            .collect()
    }

    /// Issues `action` on transformer `index`, or logs a deselection.
    fn control(&mut self, index: Option<usize>, action: ControlAction, reason: &str) {
        let Some(i) = index else {
            self.log
                .push(format!("CON TAP Control Deselected No control {action} {reason}"));
            return;
        };
        let tx = &mut self.snapshot.transformers[i];
        let decision = ControlDecision::tap(i, tx, action, self.tokens);
        self.log.control(format!(
            "Control Decision {} {} {} {reason}",
            decision.device_id, decision.control_point, decision.command
        ));
        tx.prev_ctl = Some(action);
        tx.control_done = true;
        self.snapshot.counters.tap_delay_count = 0;
        self.snapshot.counters.consec_tap = 0;
        self.decisions.push(decision);
    }
}
