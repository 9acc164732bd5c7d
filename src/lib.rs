//a Rust-based strategy backtesting and parameter search engine for continuous futures

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod report;
pub mod search;
pub mod signal;

//prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{CommissionSchedule, SimulationConfig};
    pub use crate::data::{adjust_rolls, clean, filter_by_date, load_csv, Bar};
    pub use crate::engine::{
        simulate, BacktestEngine, BacktestResult, PortfolioTrajectory, TrajectoryPoint,
    };
    pub use crate::error::EngineError;
    pub use crate::metrics::Metrics;
    pub use crate::search::{
        Objective, SearchEngine, SearchOptions, SearchReport, SearchResult, TrialFailure,
    };
    pub use crate::signal::{
        ma_cross::MaCrossStrategy, rsi_reversion::RsiReversionStrategy, Signal, SignalSource,
        StrategyKind,
    };
}
