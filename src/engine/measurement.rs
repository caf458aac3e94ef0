//! Typed measurement table and ingestion into a cycle snapshot.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::log::CycleLog;
use crate::model::{CarryForward, SubstationConfig, SubstationSnapshot};

/// A single raw SCADA reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MeasurementValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl MeasurementValue {
    /// Types a raw text field: integer first, then float, else text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            Self::Int(i)
        } else if let Ok(f) = trimmed.parse::<f64>() {
            Self::Float(f)
        } else {
            Self::Text(trimmed.to_string())
        }
    }

    /// Numeric view; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Text(_) => None,
        }
    }

    /// Integer view; floats are accepted only when they carry no fraction.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int(i) => i32::try_from(*i).ok(),
            Self::Float(f) if f.fract() == 0.0 && f.abs() <= f64::from(i32::MAX) => {
                Some(*f as i32)
            }
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for MeasurementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for MeasurementValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for MeasurementValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for MeasurementValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MeasurementValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Flat point-tag to value mapping delivered by the measurement source.
///
/// Tags not present are "unavailable", never an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementTable {
    values: HashMap<String, MeasurementValue>,
}

impl MeasurementTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the reading for `tag`.
    pub fn insert(&mut self, tag: impl Into<String>, value: impl Into<MeasurementValue>) {
        self.values.insert(tag.into(), value.into());
    }

    /// Removes a reading, making the tag unavailable.
    pub fn remove(&mut self, tag: &str) -> Option<MeasurementValue> {
        self.values.remove(tag)
    }

    pub fn get(&self, tag: &str) -> Option<&MeasurementValue> {
        self.values.get(tag)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn float(&self, tag: &str, log: &mut CycleLog) -> Option<f64> {
        let value = self.get(tag)?;
        let typed = value.as_f64();
        if typed.is_none() {
            log.push(format!("Point {tag} = {value} is not numeric, treated as unavailable"));
        }
        typed
    }

    fn int(&self, tag: &str, log: &mut CycleLog) -> Option<i32> {
        let value = self.get(tag)?;
        let typed = value.as_i32();
        if typed.is_none() {
            log.push(format!("Point {tag} = {value} is not an integer, treated as unavailable"));
        }
        typed
    }

    fn text(&self, tag: &str, log: &mut CycleLog) -> Option<String> {
        let value = self.get(tag)?;
        let typed = value.as_text().map(str::to_string);
        if typed.is_none() {
            log.push(format!("Point {tag} = {value} is not a status, treated as unavailable"));
        }
        typed
    }
}

/// Builds the current-cycle snapshot from fresh readings and the carry-forward.
///
/// The carry-forward must already match the configured device set; see
/// [`SubstationConfig::validate_against`].
pub fn ingest(
    config: &SubstationConfig,
    table: &MeasurementTable,
    carry: &CarryForward,
    log: &mut CycleLog,
) -> SubstationSnapshot {
    let mut snapshot = SubstationSnapshot::new(config);
    snapshot.counters = carry.counters.clone();

    for (tx, prev) in snapshot.transformers.iter_mut().zip(&carry.transformers) {
        let p = &tx.points;
        tx.loc_rem = table.text(&p.loc_rem_id, log);
        tx.scada_sw = table.text(&p.scada_sw_id, log);
        tx.high_side = table.text(&p.high_side_id, log);
        tx.low_side = table.text(&p.low_side_id, log);
        tx.volts = table.float(&p.volts_id, log);
        tx.tap = table.int(&p.tap_id, log);
        tx.mw = table.float(&p.mw_id, log);
        tx.mvar = table.float(&p.mvar_id, log);

        tx.prev_tap = prev.tap;
        tx.prev_mvar = prev.mvar;
        tx.control_done = prev.control_done;
        tx.prev_ctl = prev.prev_ctl;
    }

    for (bank, prev) in snapshot.capacitors.iter_mut().zip(&carry.capacitors) {
        let p = &bank.points;
        bank.op_cap = table.text(&p.op_cap_id, log);
        bank.scada_sw = table.text(&p.scada_sw_id, log);
        bank.loc_rem = table.text(&p.loc_rem_id, log);
        bank.auto_man = table.text(&p.auto_man_id, log);
        bank.misc = table.text(&p.misc_id, log);
        bank.bus_bkr = table.text(&p.bus_bkr_id, log);
        bank.cap_bkr = table.text(&p.cap_bkr_id, log);
        bank.lockv = table.float(&p.lockv_id, log);

        bank.nc_trip = prev.nc_trip;
        bank.nc_close = prev.nc_close;
        bank.trip_ex = prev.trip_ex;
        bank.close_ex = prev.close_ex;
        bank.prev_ctl = prev.prev_ctl;
    }

    let sp = &config.points;
    snapshot.generators.g1_mw = table.float(&sp.g1_mw_id, log);
    snapshot.generators.g1_mvar = table.float(&sp.g1_mvar_id, log);
    snapshot.generators.g2_mw = table.float(&sp.g2_mw_id, log);
    snapshot.generators.g2_mvar = table.float(&sp.g2_mvar_id, log);
    snapshot.program_status = table.text(&sp.program_status_id, log);

    snapshot
}
