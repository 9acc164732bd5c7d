pub mod ma_cross;
pub mod rsi_reversion;

use crate::config::SimulationConfig;
use crate::data::Bar;
use crate::error::EngineError;
use serde::{Deserialize, Serialize};

//a discrete directional instruction for one time step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Long,
    Flat,
    Short,
}

impl Signal {
    //converts to an exposure direction (+1, 0, -1)
    pub fn direction(self) -> i8 {
        match self {
            Signal::Long => 1,
            Signal::Flat => 0,
            Signal::Short => -1,
        }
    }
}

//signal source contract: maps a price series to an aligned signal series
//implementations must be deterministic for a fixed input so searches reproduce
pub trait SignalSource: Send + Sync {
    //produces one signal per bar, aligned by position
    fn generate(&self, bars: &[Bar]) -> Vec<Signal>;

    //returns the strategy name
    fn name(&self) -> &'static str;
}

//closed strategy registry
//unknown identifiers are rejected up front instead of failing a lookup later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyKind {
    MaCross,
    RsiReversion,
}

impl StrategyKind {
    //parse a strategy identifier
    pub fn parse(s: &str) -> Result<Self, EngineError> {
        match s.to_lowercase().as_str() {
            "ma" | "ma_cross" => Ok(StrategyKind::MaCross),
            "rsi" | "rsi_reversion" => Ok(StrategyKind::RsiReversion),
            other => Err(EngineError::Configuration(format!(
                "unknown strategy type: {}",
                other
            ))),
        }
    }

    //constructs the signal source for this kind, validating its parameters
    pub fn build(self, config: &SimulationConfig) -> Result<Box<dyn SignalSource>, EngineError> {
        match self {
            StrategyKind::MaCross => Ok(Box::new(ma_cross::MaCrossStrategy::new(
                config.fast_period,
                config.slow_period,
            )?)),
            StrategyKind::RsiReversion => Ok(Box::new(rsi_reversion::RsiReversionStrategy::new(
                config.rsi_period,
                config.rsi_lower,
                config.rsi_upper,
            )?)),
        }
    }
}

//helper function to calculate simple moving average
pub fn sma(prices: &[f64]) -> Option<f64> {
    if prices.is_empty() {
        return None;
    }
    Some(prices.iter().sum::<f64>() / prices.len() as f64)
}

//helper function to calculate relative strength index
pub fn rsi(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period + 1 {
        return None;
    }

    let mut gains = 0.0;
    let mut losses = 0.0;

    for pair in prices[prices.len() - period - 1..].windows(2) {
        let change = pair[1] - pair[0];
        if change > 0.0 {
            gains += change;
        } else {
            losses -= change;
        }
    }

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}
