//! Volt/VAR decision engine: one call to [`run_cycle`] per control period.
//!
//! Pipeline: ingestion, health evaluation, previous-control verification,
//! tap decision, capacitor decision.

pub mod capacitor;
pub mod cycle;
pub mod decision;
/// In-service checks and LTC aggregates.
pub mod health;
pub mod log;
/// Measurement table and snapshot ingestion.
pub mod measurement;
pub mod tap;
pub mod verify;

pub use cycle::{CycleOutput, run_cycle};
pub use decision::{ControlDecision, DeviceKind};
pub use log::{CycleLog, LOG_SEPARATOR};
pub use measurement::{MeasurementTable, MeasurementValue};
