pub mod kpi;
/// Seeded plant model standing in for SCADA.
pub mod plant;
/// Multi-cycle driver.
pub mod runner;
