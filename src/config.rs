//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::model::{
    CapacitorConfig, CapacitorPoints, CapacitorSettings, LtcLimits, SubstationConfig,
    TransformerPoints,
};

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Run length and random seed.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Substation limits, tokens, and device point tags.
    #[serde(default)]
    pub substation: SubstationConfig,
    /// Simulated plant behaviour.
    #[serde(default)]
    pub plant: PlantConfig,
}

/// Run length and global parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Control cycles to run (must be > 0).
    pub cycles: usize,
    /// Control cycles per day; the daily bank counts reset on day change (must be > 0).
    pub cycles_per_day: usize,
    /// Master random seed.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            cycles: 30,
            cycles_per_day: 24,
            seed: 42,
        }
    }
}

/// Parameters of the simulated substation plant.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlantConfig {
    /// Bus voltage with all LTCs on tap 0, no banks closed, and no load (kV).
    pub nominal_kv: f64,
    /// Voltage drop at peak load (kV).
    pub load_drop_kv: f64,
    /// Phase offset of the daily load curve (radians).
    pub phase_rad: f64,
    /// Voltage change per tap step, averaged over the LTCs (kV).
    pub kv_per_tap: f64,
    /// Voltage rise per closed capacitor bank (kV).
    pub kv_per_bank: f64,
    /// Per-transformer MW at peak load.
    pub peak_mw: f64,
    /// Per-transformer MVAR at peak load.
    pub peak_mvar: f64,
    /// Circulating MVAR per tap step away from the average tap.
    pub mvar_per_tap_step: f64,
    /// MVAR supplied by each closed bank, shared across the transformers.
    pub mvar_per_bank: f64,
    /// Mean MVAR of each generator.
    pub gen_mvar: f64,
    /// Generator MVAR swing over the day.
    pub gen_mvar_swing: f64,
    /// Gaussian noise standard deviation applied to every analog.
    pub noise_std: f64,
    /// Probability that an LTC ignores a raise/lower command (0.0-1.0).
    pub ltc_fail_prob: f64,
    /// Starting tap of each transformer; length must match the transformers.
    pub initial_taps: Vec<i32>,
    /// Starting breaker state of each bank; length must match the banks.
    pub initial_banks_closed: Vec<bool>,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            nominal_kv: 124.0,
            load_drop_kv: 5.0,
            phase_rad: 0.0,
            kv_per_tap: 0.75,
            kv_per_bank: 1.2,
            peak_mw: 40.0,
            peak_mvar: 12.0,
            mvar_per_tap_step: 2.0,
            mvar_per_bank: 6.0,
            gen_mvar: 20.0,
            gen_mvar_swing: 15.0,
            noise_std: 0.05,
            ltc_fail_prob: 0.0,
            initial_taps: vec![0, 0],
            initial_banks_closed: vec![false, false],
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.cycles"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ScenarioConfig {
    /// Returns the baseline scenario: two LTCs, two banks, mild daily load.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            substation: SubstationConfig::default(),
            plant: PlantConfig::default(),
        }
    }

    /// Returns the low-voltage preset: heavy reactive load pulls the bus
    /// below the operating band so both LTCs and the banks have work to do.
    pub fn low_voltage() -> Self {
        let mut substation = SubstationConfig::default();
        for bank in &mut substation.capacitors {
            bank.settings = CapacitorSettings {
                close_below: 121.0,
                ..CapacitorSettings::default()
            };
        }
        Self {
            simulation: SimulationConfig::default(),
            substation,
            plant: PlantConfig {
                nominal_kv: 121.0,
                load_drop_kv: 6.0,
                peak_mvar: 18.0,
                gen_mvar: 35.0,
                ..PlantConfig::default()
            },
        }
    }

    /// Returns the unbalanced preset: three LTCs started on different taps
    /// so the megavar spread exceeds the balance limit.
    pub fn unbalanced() -> Self {
        let mut substation = SubstationConfig {
            limits: LtcLimits {
                mvar_balance: 4.0,
                ..LtcLimits::default()
            },
            ..SubstationConfig::default()
        };
        substation
            .transformers
            .push(TransformerPoints::for_device("TX3"));
        substation.capacitors.push(CapacitorConfig {
            points: CapacitorPoints::for_device("CP3"),
            ..CapacitorConfig::default()
        });
        Self {
            simulation: SimulationConfig::default(),
            substation,
            plant: PlantConfig {
                load_drop_kv: 2.0,
                mvar_per_tap_step: 3.0,
                initial_taps: vec![3, 0, 1],
                initial_banks_closed: vec![true, false, false],
                ..PlantConfig::default()
            },
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "low_voltage", "unbalanced"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "low_voltage" => Ok(Self::low_voltage()),
            "unbalanced" => Ok(Self::unbalanced()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if s.cycles == 0 {
            errors.push(ConfigError {
                field: "simulation.cycles".into(),
                message: "must be > 0".into(),
            });
        }
        if s.cycles_per_day == 0 {
            errors.push(ConfigError {
                field: "simulation.cycles_per_day".into(),
                message: "must be > 0".into(),
            });
        }

        let sub = &self.substation;
        if sub.transformers.is_empty() {
            errors.push(ConfigError {
                field: "substation.transformers".into(),
                message: "at least one transformer is required".into(),
            });
        }
        if let Err(e) = sub.limits.validate() {
            errors.push(ConfigError {
                field: "substation.limits".into(),
                message: e.to_string(),
            });
        }
        if let Err(e) = sub.tokens.validate() {
            errors.push(ConfigError {
                field: "substation.tokens".into(),
                message: e.to_string(),
            });
        }
        for (i, bank) in sub.capacitors.iter().enumerate() {
            let b = &bank.settings;
            if b.close_below > b.trip_above {
                errors.push(ConfigError {
                    field: format!("substation.capacitors[{i}].settings.close_below"),
                    message: "must be <= settings.trip_above".into(),
                });
            }
        }

        let p = &self.plant;
        if p.initial_taps.len() != sub.transformers.len() {
            errors.push(ConfigError {
                field: "plant.initial_taps".into(),
                message: format!(
                    "has {} entries, substation has {} transformers",
                    p.initial_taps.len(),
                    sub.transformers.len()
                ),
            });
        }
        if p.initial_banks_closed.len() != sub.capacitors.len() {
            errors.push(ConfigError {
                field: "plant.initial_banks_closed".into(),
                message: format!(
                    "has {} entries, substation has {} capacitor banks",
                    p.initial_banks_closed.len(),
                    sub.capacitors.len()
                ),
            });
        }
        if !(0.0..=1.0).contains(&p.ltc_fail_prob) {
            errors.push(ConfigError {
                field: "plant.ltc_fail_prob".into(),
                message: "must be in [0.0, 1.0]".into(),
            });
        }
        if p.noise_std < 0.0 {
            errors.push(ConfigError {
                field: "plant.noise_std".into(),
                message: "must be >= 0".into(),
            });
        }

        errors
    }
}
