use crate::config::SimulationConfig;
use crate::data::Bar;
use crate::engine::trajectory::{PortfolioTrajectory, TrajectoryPoint};
use crate::error::EngineError;
use crate::metrics::Metrics;
use crate::signal::{Signal, SignalSource};

//mutable accumulator for one simulation run
//position is signed exposure in underlying units, not contracts
#[derive(Debug, Clone, Copy)]
pub struct SimulationState {
    pub cash: f64,
    pub position: f64,
}

//runs the sequential portfolio simulation over the overlap of bars and signals
//
//the first bar only seeds state (there is no prior signal for it), so the
//trajectory holds one point per bar from index 1 onward; at most one position
//is open at a time and it is entered and exited atomically on signal
//transitions, never scaled
pub fn simulate(
    bars: &[Bar],
    signals: &[Signal],
    config: &SimulationConfig,
) -> Result<PortfolioTrajectory, EngineError> {
    config.validate()?;

    if bars.is_empty() {
        return Err(EngineError::InvalidInput("empty price series".to_string()));
    }
    if signals.is_empty() {
        return Err(EngineError::InvalidInput("empty signal series".to_string()));
    }

    let steps = bars.len().min(signals.len());

    let mut state = SimulationState {
        cash: config.initial_cash,
        position: 0.0,
    };
    let mut points = Vec::with_capacity(steps.saturating_sub(1));
    let mut prev_value = f64::NAN;

    for i in 1..steps {
        let price = bars[i].close;
        if price <= 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "non-positive close {} at {}",
                price, bars[i].timestamp
            )));
        }

        let signal = signals[i];

        if signal == Signal::Long && state.position == 0.0 {
            //commit a fixed fraction of cash to a long position
            let position_value = state.cash * config.position_ratio;
            state.position = position_value / price;
            state.cash -= position_value;
            if config.commissions.long_entry {
                state.cash -= position_value * config.commission_rate;
            }
        } else if signal == Signal::Short && state.position == 0.0 {
            //short exposure of the same fraction; proceeds are not credited
            let position_value = state.cash * config.position_ratio;
            state.position = -position_value / price;
            if config.commissions.short_entry {
                state.cash -= state.position.abs() * price * config.commission_rate;
            }
        } else if signal == Signal::Flat && state.position != 0.0 {
            //close the position fully
            if config.commissions.exit {
                state.cash -= state.position.abs() * price * config.commission_rate;
            }
            state.cash += state.position * price;
            state.position = 0.0;
        }
        //a signal repeating the current exposure direction takes no action

        let value = state.cash + state.position * price;
        points.push(TrajectoryPoint {
            timestamp: bars[i].timestamp,
            portfolio_value: value,
            returns: (value - prev_value) / prev_value,
        });
        prev_value = value;
    }

    Ok(PortfolioTrajectory { points })
}

//result of one full backtest: the trajectory and its metrics
#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub trajectory: PortfolioTrajectory,
    pub metrics: Metrics,
}

//composes signal generation, simulation, and scoring for one configuration
pub struct BacktestEngine {
    strategy: Box<dyn SignalSource>,
    config: SimulationConfig,
}

impl BacktestEngine {
    pub fn new(strategy: Box<dyn SignalSource>, config: SimulationConfig) -> Self {
        BacktestEngine { strategy, config }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    //runs the strategy against the bars and scores the trajectory
    pub fn run(&self, bars: &[Bar]) -> Result<BacktestResult, EngineError> {
        let signals = self.strategy.generate(bars);
        let trajectory = simulate(bars, &signals, &self.config)?;
        let metrics = Metrics::compute(&trajectory.returns(), self.config.risk_free_rate)?;

        Ok(BacktestResult {
            trajectory,
            metrics,
        })
    }
}
