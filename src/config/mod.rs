pub mod simulation;

pub use simulation::{CommissionSchedule, SimulationConfig};
