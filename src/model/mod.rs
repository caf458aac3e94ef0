//! Typed snapshot model for the control cycle.

/// Capacitor bank configuration and state.
pub mod capacitor;
/// Cross-cycle counters and carry-forward.
pub mod counters;
pub mod limits;
/// Aggregate LTC statistics.
pub mod ltc;
pub mod substation;
pub mod tokens;
/// LTC transformer configuration and state.
pub mod transformer;

pub use capacitor::{CapacitorBankState, CapacitorConfig, CapacitorPoints, CapacitorSettings};
pub use counters::{CapacitorCarry, CarryForward, SubstationCounters, TransformerCarry};
pub use limits::{CapacitorLimits, LtcLimits};
pub use ltc::LtcStatus;
pub use substation::{GeneratorReadings, SubstationConfig, SubstationPoints, SubstationSnapshot};
pub use tokens::{ControlAction, Tokens};
pub use transformer::{TransformerPoints, TransformerState};
