//! Seeded substation plant: the stand-in for SCADA telemetry and actuation.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::config::PlantConfig;
use crate::engine::{ControlDecision, DeviceKind, MeasurementTable};
use crate::model::{ControlAction, SubstationConfig};

/// A simple electrical model of a substation bus with LTC transformers and
/// capacitor banks.
///
/// Bus voltage follows a daily load curve and responds to the average tap
/// and the number of closed banks. Each transformer's MVAR grows with load,
/// shifts with its tap distance from the average, and falls as banks close.
/// All analogs carry Gaussian noise from a seeded RNG, so identical seeds
/// reproduce identical telemetry.
#[derive(Debug, Clone)]
pub struct Plant {
    config: PlantConfig,
    substation: SubstationConfig,
    cycles_per_day: usize,
    taps: Vec<i32>,
    banks_closed: Vec<bool>,
    rng: StdRng,
}

impl Plant {
    /// Creates a plant for `substation` in the state given by `config`.
    ///
    /// Missing initial taps default to 0 and missing bank states to open.
    ///
    /// # Arguments
    ///
    /// * `config` - Plant electrical parameters and initial state
    /// * `substation` - Devices and point tags to publish
    /// * `cycles_per_day` - Control cycles per simulated day (clamped to >= 1)
    /// * `seed` - Random seed for reproducible noise
    pub fn new(
        config: &PlantConfig,
        substation: &SubstationConfig,
        cycles_per_day: usize,
        seed: u64,
    ) -> Self {
        let taps = (0..substation.transformers.len())
            .map(|i| config.initial_taps.get(i).copied().unwrap_or(0))
            .collect();
        let banks_closed = (0..substation.capacitors.len())
            .map(|i| config.initial_banks_closed.get(i).copied().unwrap_or(false))
            .collect();
        Self {
            config: config.clone(),
            substation: substation.clone(),
            cycles_per_day: cycles_per_day.max(1),
            taps,
            banks_closed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn taps(&self) -> &[i32] {
        &self.taps
    }

    pub fn banks_closed(&self) -> &[bool] {
        &self.banks_closed
    }

    /// Load level in [0, 1] for `cycle`, peaking mid-day.
    fn load_level(&self, cycle: usize) -> f64 {
        let day_pos = (cycle % self.cycles_per_day) as f64 / self.cycles_per_day as f64;
        let angle = 2.0 * std::f64::consts::PI * day_pos + self.config.phase_rad;
        0.5 - 0.5 * angle.cos()
    }

    fn noise(&mut self) -> f64 {
        if self.config.noise_std <= 0.0 {
            return 0.0;
        }
        // Box-Muller
        let u1: f64 = self.rng.random::<f64>().clamp(1e-9, 1.0);
        let u2: f64 = self.rng.random::<f64>();
        let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        z0 * self.config.noise_std
    }

    /// Publishes the telemetry for `cycle` as a measurement table.
    pub fn measurements(&mut self, cycle: usize) -> MeasurementTable {
        let load = self.load_level(cycle);
        let n_tx = self.taps.len().max(1) as f64;
        let avg_tap = self.taps.iter().map(|&t| f64::from(t)).sum::<f64>() / n_tx;
        let closed = self.banks_closed.iter().filter(|&&c| c).count() as f64;
        let c = self.config.clone();
        let tokens = self.substation.tokens.clone();

        let bus_kv = c.nominal_kv - c.load_drop_kv * load
            + c.kv_per_tap * avg_tap
            + c.kv_per_bank * closed;
        let load_mvar = c.peak_mvar * (0.25 + 0.75 * load);
        let bank_relief = c.mvar_per_bank * closed / n_tx;

        let mut table = MeasurementTable::new();
        for i in 0..self.taps.len() {
            let tap = self.taps[i];
            let p = self.substation.transformers[i].clone();
            let mvar = load_mvar - bank_relief
                + c.mvar_per_tap_step * (f64::from(tap) - avg_tap)
                + self.noise();
            let mw = c.peak_mw * (0.3 + 0.7 * load) + self.noise();
            let volts = bus_kv + self.noise();

            table.insert(p.loc_rem_id, tokens.remote.as_str());
            table.insert(p.scada_sw_id, tokens.on.as_str());
            table.insert(p.high_side_id, tokens.close.as_str());
            table.insert(p.low_side_id, tokens.close.as_str());
            table.insert(p.volts_id, volts);
            table.insert(p.tap_id, i64::from(tap));
            table.insert(p.mw_id, mw);
            table.insert(p.mvar_id, mvar);
        }

        for i in 0..self.banks_closed.len() {
            let p = self.substation.capacitors[i].points.clone();
            let bkr = if self.banks_closed[i] {
                &tokens.close
            } else {
                &tokens.trip
            };
            let lockv = bus_kv + self.noise();

            table.insert(p.op_cap_id, tokens.on.as_str());
            table.insert(p.scada_sw_id, tokens.on.as_str());
            table.insert(p.loc_rem_id, tokens.remote.as_str());
            table.insert(p.auto_man_id, tokens.auto.as_str());
            table.insert(p.misc_id, tokens.normal.as_str());
            table.insert(p.bus_bkr_id, tokens.close.as_str());
            table.insert(p.cap_bkr_id, bkr.as_str());
            table.insert(p.lockv_id, lockv);
        }

        let gen_mvar = c.gen_mvar + c.gen_mvar_swing * (load - 0.5);
        let sp = self.substation.points.clone();
        let g1_mvar = gen_mvar + self.noise();
        let g2_mvar = gen_mvar + self.noise();
        table.insert(sp.g1_mw_id, c.peak_mw * load);
        table.insert(sp.g2_mw_id, c.peak_mw * load);
        table.insert(sp.g1_mvar_id, g1_mvar);
        table.insert(sp.g2_mvar_id, g2_mvar);
        table.insert(sp.program_status_id, tokens.on.as_str());

        table
    }

    /// Carries out the dispatched decisions.
    ///
    /// Each tap command may be ignored with probability `ltc_fail_prob`;
    /// returns how many were.
    pub fn apply(&mut self, decisions: &[ControlDecision]) -> usize {
        let mut ignored = 0;
        for d in decisions {
            match (d.kind, d.action) {
                (DeviceKind::Transformer, action) => {
                    if self.config.ltc_fail_prob > 0.0
                        && self.rng.random::<f64>() < self.config.ltc_fail_prob
                    {
                        ignored += 1;
                        continue;
                    }
                    if let Some(tap) = self.taps.get_mut(d.device_index) {
                        match action {
                            ControlAction::Raise => *tap += 1,
                            ControlAction::Lower => *tap -= 1,
                            _ => {}
                        }
                    }
                }
                (DeviceKind::Capacitor, action) => {
                    if let Some(closed) = self.banks_closed.get_mut(d.device_index) {
                        match action {
                            ControlAction::Close => *closed = true,
                            ControlAction::Trip => *closed = false,
                            _ => {}
                        }
                    }
                }
            }
        }
        ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Tokens;

    fn plant(seed: u64) -> Plant {
        Plant::new(
            &PlantConfig::default(),
            &SubstationConfig::default(),
            24,
            seed,
        )
    }

    fn kv(table: &MeasurementTable, tag: &str) -> f64 {
        table.get(tag).and_then(|v| v.as_f64()).unwrap_or(f64::NAN)
    }

    #[test]
    fn same_seed_same_telemetry() {
        let mut a = plant(7);
        let mut b = plant(7);
        for cycle in 0..5 {
            assert_eq!(a.measurements(cycle), b.measurements(cycle));
        }
    }

    #[test]
    fn publishes_every_configured_point() {
        let mut p = plant(1);
        let table = p.measurements(0);
        // 8 per transformer, 8 per bank, 5 substation points
        assert_eq!(table.len(), 2 * 8 + 2 * 8 + 5);
        let tokens = Tokens::default();
        assert_eq!(
            table.get("CP1.CAP_BKR").and_then(|v| v.as_text()),
            Some(tokens.trip.as_str())
        );
    }

    #[test]
    fn raise_lifts_bus_voltage() {
        let config = PlantConfig {
            noise_std: 0.0,
            ..PlantConfig::default()
        };
        let sub = SubstationConfig::default();
        let mut p = Plant::new(&config, &sub, 24, 0);
        let before = kv(&p.measurements(0), "TX1.KV");

        let decisions: Vec<_> = (0..2)
            .map(|i| {
                ControlDecision::tap(
                    i,
                    &crate::model::TransformerState::new(sub.transformers[i].clone()),
                    ControlAction::Raise,
                    &sub.tokens,
                )
            })
            .collect();
        assert_eq!(p.apply(&decisions), 0);
        let after = kv(&p.measurements(0), "TX1.KV");
        assert_eq!(p.taps(), &[1, 1]);
        assert!((after - before - config.kv_per_tap).abs() < 1e-9);
    }

    #[test]
    fn certain_failure_ignores_tap_commands() {
        let config = PlantConfig {
            ltc_fail_prob: 1.0,
            ..PlantConfig::default()
        };
        let sub = SubstationConfig::default();
        let mut p = Plant::new(&config, &sub, 24, 0);
        let tx = crate::model::TransformerState::new(sub.transformers[0].clone());
        let ignored = p.apply(&[ControlDecision::tap(0, &tx, ControlAction::Lower, &sub.tokens)]);
        assert_eq!(ignored, 1);
        assert_eq!(p.taps(), &[0, 0]);
    }

    #[test]
    fn closing_a_bank_relieves_mvar() {
        let config = PlantConfig {
            noise_std: 0.0,
            ..PlantConfig::default()
        };
        let sub = SubstationConfig::default();
        let mut p = Plant::new(&config, &sub, 24, 0);
        let before = kv(&p.measurements(3), "TX1.MVAR");
        let bank = crate::model::CapacitorBankState::new(&sub.capacitors[0]);
        p.apply(&[ControlDecision::capacitor(0, &bank, ControlAction::Close, &sub.tokens)]);
        let after = kv(&p.measurements(3), "TX1.MVAR");
        assert!(p.banks_closed()[0]);
        assert!(after < before);
    }
}
