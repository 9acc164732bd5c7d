pub mod performance;

pub use performance::{Metrics, TRADING_PERIODS_PER_YEAR};
