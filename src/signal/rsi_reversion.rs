use crate::data::Bar;
use crate::error::EngineError;
use crate::signal::{rsi, Signal, SignalSource};

//rsi mean reversion strategy
//long below the lower threshold, short above the upper one, flat otherwise
#[derive(Debug, Clone)]
pub struct RsiReversionStrategy {
    period: usize,
    lower: f64,
    upper: f64,
}

impl RsiReversionStrategy {
    pub fn new(period: usize, lower: f64, upper: f64) -> Result<Self, EngineError> {
        if period == 0 {
            return Err(EngineError::Configuration(
                "rsi_period must be at least 1".to_string(),
            ));
        }
        if lower >= upper {
            return Err(EngineError::Configuration(format!(
                "rsi_lower ({}) must be below rsi_upper ({})",
                lower, upper
            )));
        }
        Ok(RsiReversionStrategy {
            period,
            lower,
            upper,
        })
    }
}

impl SignalSource for RsiReversionStrategy {
    fn generate(&self, bars: &[Bar]) -> Vec<Signal> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let mut signals = Vec::with_capacity(bars.len());

        for i in 0..closes.len() {
            let signal = match rsi(&closes[..=i], self.period) {
                Some(value) if value < self.lower => Signal::Long,
                Some(value) if value > self.upper => Signal::Short,
                _ => Signal::Flat,
            };
            signals.push(signal);
        }

        signals
    }

    fn name(&self) -> &'static str {
        "RSI Reversion"
    }
}
