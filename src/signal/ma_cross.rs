use crate::data::Bar;
use crate::error::EngineError;
use crate::signal::{sma, Signal, SignalSource};

//dual moving-average strategy
//emits long while the fast mean sits above the slow mean, short while below,
//and flat during warmup or when the means are equal
#[derive(Debug, Clone)]
pub struct MaCrossStrategy {
    fast_period: usize,
    slow_period: usize,
}

impl MaCrossStrategy {
    pub fn new(fast_period: usize, slow_period: usize) -> Result<Self, EngineError> {
        if fast_period == 0 {
            return Err(EngineError::Configuration(
                "fast_period must be at least 1".to_string(),
            ));
        }
        if slow_period <= fast_period {
            return Err(EngineError::Configuration(format!(
                "slow_period ({}) must exceed fast_period ({})",
                slow_period, fast_period
            )));
        }
        Ok(MaCrossStrategy {
            fast_period,
            slow_period,
        })
    }
}

impl SignalSource for MaCrossStrategy {
    fn generate(&self, bars: &[Bar]) -> Vec<Signal> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let mut signals = Vec::with_capacity(bars.len());

        for i in 0..closes.len() {
            if i + 1 < self.slow_period {
                signals.push(Signal::Flat);
                continue;
            }

            let fast = sma(&closes[i + 1 - self.fast_period..=i]);
            let slow = sma(&closes[i + 1 - self.slow_period..=i]);

            let signal = match (fast, slow) {
                (Some(fast), Some(slow)) if fast > slow => Signal::Long,
                (Some(fast), Some(slow)) if fast < slow => Signal::Short,
                _ => Signal::Flat,
            };
            signals.push(signal);
        }

        signals
    }

    fn name(&self) -> &'static str {
        "MA Cross"
    }
}
