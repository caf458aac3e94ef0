//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use substation_vvc::engine::MeasurementTable;
use substation_vvc::model::SubstationConfig;

/// One transformer's analog readings.
#[derive(Debug, Clone, Copy)]
pub struct Unit {
    pub volts: f64,
    pub mvar: f64,
    pub tap: i64,
}

impl Unit {
    pub fn new(volts: f64, mvar: f64, tap: i64) -> Self {
        Self { volts, mvar, tap }
    }
}

/// One bank's lockout voltage and breaker state.
#[derive(Debug, Clone, Copy)]
pub struct Bank {
    pub lockv: f64,
    pub closed: bool,
}

impl Bank {
    pub fn new(lockv: f64, closed: bool) -> Self {
        Self { lockv, closed }
    }
}

/// Default two-transformer, two-bank substation.
pub fn default_substation() -> SubstationConfig {
    SubstationConfig::default()
}

/// A complete, healthy measurement table for `config`.
///
/// Transformers beyond `units` and banks beyond `banks` get no readings at
/// all. Generator MVAR totals `gen_mvar` split evenly across both units.
pub fn healthy_table(
    config: &SubstationConfig,
    units: &[Unit],
    banks: &[Bank],
    gen_mvar: f64,
) -> MeasurementTable {
    let t = &config.tokens;
    let mut table = MeasurementTable::new();

    for (p, u) in config.transformers.iter().zip(units) {
        table.insert(p.loc_rem_id.as_str(), t.remote.as_str());
        table.insert(p.scada_sw_id.as_str(), t.on.as_str());
        table.insert(p.high_side_id.as_str(), t.close.as_str());
        table.insert(p.low_side_id.as_str(), t.close.as_str());
        table.insert(p.volts_id.as_str(), u.volts);
        table.insert(p.tap_id.as_str(), u.tap);
        table.insert(p.mw_id.as_str(), 30.0);
        table.insert(p.mvar_id.as_str(), u.mvar);
    }

    for (c, b) in config.capacitors.iter().zip(banks) {
        let p = &c.points;
        table.insert(p.op_cap_id.as_str(), t.on.as_str());
        table.insert(p.scada_sw_id.as_str(), t.on.as_str());
        table.insert(p.loc_rem_id.as_str(), t.remote.as_str());
        table.insert(p.auto_man_id.as_str(), t.auto.as_str());
        table.insert(p.misc_id.as_str(), t.normal.as_str());
        table.insert(p.bus_bkr_id.as_str(), t.close.as_str());
        let bkr = if b.closed { &t.close } else { &t.trip };
        table.insert(p.cap_bkr_id.as_str(), bkr.as_str());
        table.insert(p.lockv_id.as_str(), b.lockv);
    }

    let sp = &config.points;
    table.insert(sp.g1_mw_id.as_str(), 50.0);
    table.insert(sp.g2_mw_id.as_str(), 50.0);
    table.insert(sp.g1_mvar_id.as_str(), gen_mvar / 2.0);
    table.insert(sp.g2_mvar_id.as_str(), gen_mvar / 2.0);
    table.insert(sp.program_status_id.as_str(), t.on.as_str());

    table
}

/// Two balanced units at `volts`, both banks in band and open.
pub fn balanced_table(config: &SubstationConfig, volts: f64) -> MeasurementTable {
    healthy_table(
        config,
        &[Unit::new(volts, 6.0, 2), Unit::new(volts, 5.0, 2)],
        &[Bank::new(122.0, false), Bank::new(122.0, false)],
        20.0,
    )
}
