use crate::error::EngineError;
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

//annualization constant for daily trading periods
pub const TRADING_PERIODS_PER_YEAR: f64 = 252.0;

//performance metrics derived from a return series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metrics {
    pub total_return: f64,
    pub annual_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
}

impl Metrics {
    //metric names in persisted column order
    pub const FIELDS: [&'static str; 5] = [
        "total_return",
        "annual_return",
        "volatility",
        "sharpe_ratio",
        "max_drawdown",
    ];

    //computes metrics from a return series
    //the caller strips the undefined first return before calling; an empty
    //series is an error rather than a silently nan-filled record
    pub fn compute(returns: &[f64], risk_free_rate: f64) -> Result<Self, EngineError> {
        if returns.is_empty() {
            return Err(EngineError::InsufficientData(
                "empty return series".to_string(),
            ));
        }

        let total_return = returns.iter().fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0;
        let annual_return = returns.mean() * TRADING_PERIODS_PER_YEAR;
        let volatility = returns.std_dev() * TRADING_PERIODS_PER_YEAR.sqrt();

        let period_rf = risk_free_rate / TRADING_PERIODS_PER_YEAR;
        let excess: Vec<f64> = returns.iter().map(|r| r - period_rf).collect();
        let excess_std = excess.as_slice().std_dev();

        //zero dispersion of excess returns leaves the ratio undefined
        let sharpe_ratio = if excess_std == 0.0 {
            f64::NAN
        } else {
            excess.as_slice().mean() / excess_std * TRADING_PERIODS_PER_YEAR.sqrt()
        };

        let max_drawdown = max_drawdown(returns);

        Ok(Metrics {
            total_return,
            annual_return,
            volatility,
            sharpe_ratio,
            max_drawdown,
        })
    }

    //metric values in persisted column order
    pub fn values(&self) -> [f64; 5] {
        [
            self.total_return,
            self.annual_return,
            self.volatility,
            self.sharpe_ratio,
            self.max_drawdown,
        ]
    }

    //looks a metric value up by its persisted name
    pub fn get(&self, name: &str) -> Option<f64> {
        Self::FIELDS
            .iter()
            .position(|f| *f == name)
            .map(|i| self.values()[i])
    }

    //prints metrics in a formatted table
    pub fn pretty_print_table(&self) {
        let mut table = Table::new();

        table.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));

        table.add_row(Row::new(vec![
            Cell::new("Total Return"),
            Cell::new(&format!("{:.2}%", self.total_return * 100.0)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Annual Return"),
            Cell::new(&format!("{:.2}%", self.annual_return * 100.0)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Volatility"),
            Cell::new(&format!("{:.2}%", self.volatility * 100.0)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Sharpe Ratio"),
            Cell::new(&format!("{:.4}", self.sharpe_ratio)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Max Drawdown"),
            Cell::new(&format!("{:.2}%", self.max_drawdown * 100.0)),
        ]));

        table.printstd();
    }
}

//maximum drawdown of the cumulative wealth index
//builds W[i] = prod(1+r), tracks the running peak, and returns the most
//negative proportional decline (0 means the index never fell from a peak)
fn max_drawdown(returns: &[f64]) -> f64 {
    let mut wealth = 1.0;
    let mut peak = 1.0;
    let mut worst = 0.0_f64;

    for r in returns {
        wealth *= 1.0 + r;
        if wealth > peak {
            peak = wealth;
        }
        let drawdown = (wealth - peak) / peak;
        if drawdown < worst {
            worst = drawdown;
        }
    }

    worst
}
