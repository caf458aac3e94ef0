//! Substation Volt/VAR control: LTC tap and capacitor bank decisions, one
//! cycle at a time.

pub mod config;
/// Per-cycle decision pipeline.
pub mod engine;
pub mod error;
pub mod io;
/// Snapshot model: limits, devices, counters, carry-forward.
pub mod model;
/// Plant simulator, multi-cycle runner, and KPIs.
pub mod sim;
