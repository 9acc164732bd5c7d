pub mod simulator;
pub mod trajectory;

pub use simulator::{simulate, BacktestEngine, BacktestResult, SimulationState};
pub use trajectory::{DrawdownPoint, PortfolioTrajectory, TrajectoryPoint};
