//! Control decisions handed to the dispatcher.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{CapacitorBankState, ControlAction, Tokens, TransformerState};

/// Kind of device a decision targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Transformer,
    Capacitor,
}

/// One control the dispatcher should write.
///
/// The engine never actuates anything itself. `command` is the configured
/// token for `action`, ready to be written to `control_point`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlDecision {
    pub kind: DeviceKind,
    /// Index into the configured transformer or bank list.
    pub device_index: usize,
    pub device_id: String,
    pub control_point: String,
    pub action: ControlAction,
    pub command: String,
}

impl ControlDecision {
    /// Tap control for transformer `index`.
    pub fn tap(index: usize, tx: &TransformerState, action: ControlAction, tokens: &Tokens) -> Self {
        Self {
            kind: DeviceKind::Transformer,
            device_index: index,
            device_id: tx.points.device_id.clone(),
            control_point: tx.points.ltc_ctl_id.clone(),
            action,
            command: tokens.command(action).to_string(),
        }
    }

    /// Switching control for bank `index`.
    pub fn capacitor(
        index: usize,
        bank: &CapacitorBankState,
        action: ControlAction,
        tokens: &Tokens,
    ) -> Self {
        Self {
            kind: DeviceKind::Capacitor,
            device_index: index,
            device_id: bank.points.cap_ctl_dev.clone(),
            control_point: bank.points.cap_ctl_id.clone(),
            action,
            command: tokens.command(action).to_string(),
        }
    }
}

impl fmt::Display for ControlDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.device_id, self.control_point, self.command)
    }
}
