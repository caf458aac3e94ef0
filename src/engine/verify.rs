//! Plausibility check on last cycle's tap controls.

use super::log::CycleLog;
use crate::model::SubstationSnapshot;

/// Smallest tap or MVAR movement accepted as a response to a control.
pub const RESPONSE_TOLERANCE: f64 = 0.2;

/// Checks that each transformer controlled last cycle actually moved.
///
/// A unit whose tap and MVAR both moved less than [`RESPONSE_TOLERANCE`]
/// counts toward `cfail`. When either reading is missing on either side the
/// check is skipped and logged. `control_done` is cleared in every case.
pub fn verify_previous_controls(snapshot: &mut SubstationSnapshot, log: &mut CycleLog) {
    let mut failures = 0;

    for (i, tx) in snapshot.transformers.iter_mut().enumerate() {
        if !tx.control_done {
            continue;
        }
        tx.control_done = false;

        let ctl = tx
            .prev_ctl
            .map(|c| c.to_string())
            .unwrap_or_else(|| "control".to_string());
        let dev = &tx.points.device_id;

        let (Some(prev_tap), Some(tap), Some(prev_mvar), Some(mvar)) =
            (tx.prev_tap, tx.tap, tx.prev_mvar, tx.mvar)
        else {
            log.push(format!("Control verification skipped {i} {dev} {ctl}: readings unavailable"));
            continue;
        };

        let tap_move = f64::from(prev_tap - tap).abs();
        let mvr_move = (prev_mvar - mvar).abs();
        if tap_move < RESPONSE_TOLERANCE && mvr_move < RESPONSE_TOLERANCE {
            failures += 1;
            log.alarm(format!(
                "Control failed {i} {dev} {} {ctl} tap {prev_tap} -> {tap} mvar {prev_mvar:.2} -> {mvar:.2}",
                tx.points.ltc_ctl_id
            ));
        }
    }

    snapshot.ltc.cfail = failures;
}
