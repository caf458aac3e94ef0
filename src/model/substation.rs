//! Substation configuration and the per-cycle snapshot.

use serde::{Deserialize, Serialize};

use super::capacitor::{CapacitorBankState, CapacitorConfig, CapacitorPoints};
use super::counters::{CapacitorCarry, CarryForward, SubstationCounters, TransformerCarry};
use super::limits::{CapacitorLimits, LtcLimits};
use super::ltc::LtcStatus;
use super::tokens::Tokens;
use super::transformer::{TransformerPoints, TransformerState};
use crate::error::{EngineError, Result};

/// Substation-level point tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SubstationPoints {
    /// LTC automatic-program status point.
    pub program_status_id: String,
    pub g1_mw_id: String,
    pub g1_mvar_id: String,
    pub g2_mw_id: String,
    pub g2_mvar_id: String,
}

impl Default for SubstationPoints {
    fn default() -> Self {
        Self {
            program_status_id: "SUB.LTC_PROG".to_string(),
            g1_mw_id: "G1.MW".to_string(),
            g1_mvar_id: "G1.MVAR".to_string(),
            g2_mw_id: "G2.MW".to_string(),
            g2_mvar_id: "G2.MVAR".to_string(),
        }
    }
}

/// Static description of one substation, immutable for the run.
///
/// The transformer and bank counts (`ZNTX`, `ZNCP`) are the lengths of the
/// device lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SubstationConfig {
    pub name: String,
    pub limits: LtcLimits,
    pub capacitor_limits: CapacitorLimits,
    pub tokens: Tokens,
    pub points: SubstationPoints,
    pub transformers: Vec<TransformerPoints>,
    pub capacitors: Vec<CapacitorConfig>,
}

impl Default for SubstationConfig {
    fn default() -> Self {
        Self {
            name: "SUB1".to_string(),
            limits: LtcLimits::default(),
            capacitor_limits: CapacitorLimits::default(),
            tokens: Tokens::default(),
            points: SubstationPoints::default(),
            transformers: vec![
                TransformerPoints::for_device("TX1"),
                TransformerPoints::for_device("TX2"),
            ],
            capacitors: vec![
                CapacitorConfig {
                    points: CapacitorPoints::for_device("CP1"),
                    ..CapacitorConfig::default()
                },
                CapacitorConfig {
                    points: CapacitorPoints::for_device("CP2"),
                    ..CapacitorConfig::default()
                },
            ],
        }
    }
}

impl SubstationConfig {
    /// Checks limits and tokens, and that `carry` matches the device set.
    ///
    /// # Errors
    ///
    /// Returns the first structural problem found.
    pub fn validate_against(&self, carry: &CarryForward) -> Result<()> {
        self.limits.validate()?;
        self.tokens.validate()?;
        if carry.transformers.len() != self.transformers.len() {
            return Err(EngineError::CarryForwardMismatch {
                kind: "transformer",
                expected: self.transformers.len(),
                found: carry.transformers.len(),
            });
        }
        if carry.capacitors.len() != self.capacitors.len() {
            return Err(EngineError::CarryForwardMismatch {
                kind: "capacitor",
                expected: self.capacitors.len(),
                found: carry.capacitors.len(),
            });
        }
        Ok(())
    }

    /// Carry-forward for this substation's first cycle.
    pub fn fresh_carry(&self) -> CarryForward {
        CarryForward::fresh(self.transformers.len(), self.capacitors.len())
    }
}

/// Generator readings used as an additional bank switching criterion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratorReadings {
    pub g1_mw: Option<f64>,
    pub g1_mvar: Option<f64>,
    pub g2_mw: Option<f64>,
    pub g2_mvar: Option<f64>,
}

impl GeneratorReadings {
    /// Total generator MVAR (`GtMvr`), defined only when both readings exist.
    pub fn total_mvar(&self) -> Option<f64> {
        Some(self.g1_mvar? + self.g2_mvar?)
    }
}

/// Complete state of a substation for one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstationSnapshot {
    pub transformers: Vec<TransformerState>,
    pub capacitors: Vec<CapacitorBankState>,
    pub generators: GeneratorReadings,
    pub program_status: Option<String>,
    pub ltc: LtcStatus,
    pub counters: SubstationCounters,
}

impl SubstationSnapshot {
    /// Empty snapshot shaped for `config`.
    pub fn new(config: &SubstationConfig) -> Self {
        Self {
            transformers: config
                .transformers
                .iter()
                .cloned()
                .map(TransformerState::new)
                .collect(),
            capacitors: config
                .capacitors
                .iter()
                .map(CapacitorBankState::new)
                .collect(),
            generators: GeneratorReadings::default(),
            program_status: None,
            ltc: LtcStatus::default(),
            counters: SubstationCounters::default(),
        }
    }

    /// Extracts the values the next cycle needs.
    pub fn carry_forward(&self) -> CarryForward {
        CarryForward {
            counters: self.counters.clone(),
            transformers: self
                .transformers
                .iter()
                .map(|tx| TransformerCarry {
                    control_done: tx.control_done,
                    tap: tx.tap,
                    mvar: tx.mvar,
                    prev_ctl: tx.prev_ctl,
                })
                .collect(),
            capacitors: self
                .capacitors
                .iter()
                .map(|cp| CapacitorCarry {
                    prev_ctl: cp.prev_ctl,
                    nc_trip: cp.nc_trip,
                    nc_close: cp.nc_close,
                    trip_ex: cp.trip_ex,
                    close_ex: cp.close_ex,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_fresh_carry() {
        let config = SubstationConfig::default();
        assert!(config.validate_against(&config.fresh_carry()).is_ok());
    }

    #[test]
    fn mismatched_carry_is_rejected() {
        let config = SubstationConfig::default();
        let carry = CarryForward::fresh(3, 2);
        let err = config.validate_against(&carry).unwrap_err();
        assert_eq!(
            err,
            EngineError::CarryForwardMismatch {
                kind: "transformer",
                expected: 2,
                found: 3,
            }
        );
    }

    #[test]
    fn total_mvar_needs_both_generators() {
        let mut gens = GeneratorReadings {
            g1_mvar: Some(30.0),
            ..GeneratorReadings::default()
        };
        assert_eq!(gens.total_mvar(), None);
        gens.g2_mvar = Some(12.5);
        assert_eq!(gens.total_mvar(), Some(42.5));
    }

    #[test]
    fn carry_forward_keeps_only_persistent_fields() {
        let config = SubstationConfig::default();
        let mut snapshot = SubstationSnapshot::new(&config);
        snapshot.counters.consec_tap = 3;
        snapshot.transformers[1].tap = Some(7);
        snapshot.transformers[1].control_done = true;
        snapshot.capacitors[0].nc_trip = 2;
        snapshot.capacitors[0].trip_ex = true;

        let carry = snapshot.carry_forward();
        assert_eq!(carry.counters.consec_tap, 3);
        assert_eq!(carry.transformers[1].tap, Some(7));
        assert!(carry.transformers[1].control_done);
        assert_eq!(carry.capacitors[0].nc_trip, 2);
        assert!(carry.capacitors[0].trip_ex);
    }
}
