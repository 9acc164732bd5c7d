pub mod engine;
pub mod report;

pub use engine::{SearchEngine, SearchOptions};
pub use report::{SearchReport, SearchResult, TrialFailure};

use crate::error::EngineError;
use crate::metrics::Metrics;
use serde::{Deserialize, Serialize};

//ranking direction for an objective
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BetterIs {
    Higher,
    Lower,
}

//search objective: the metric a search ranks trials by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Objective {
    SharpeRatio,
    TotalReturn,
    AnnualReturn,
    MaxDrawdown,
}

impl Objective {
    //parse an objective identifier
    pub fn parse(s: &str) -> Result<Self, EngineError> {
        match s.to_lowercase().as_str() {
            "sharpe" | "sharpe_ratio" => Ok(Objective::SharpeRatio),
            "total_return" => Ok(Objective::TotalReturn),
            "annual_return" => Ok(Objective::AnnualReturn),
            "max_drawdown" => Ok(Objective::MaxDrawdown),
            other => Err(EngineError::Configuration(format!(
                "unknown objective: {}",
                other
            ))),
        }
    }

    //persisted metric name for this objective
    pub fn label(self) -> &'static str {
        match self {
            Objective::SharpeRatio => "sharpe_ratio",
            Objective::TotalReturn => "total_return",
            Objective::AnnualReturn => "annual_return",
            Objective::MaxDrawdown => "max_drawdown",
        }
    }

    //explicit per-objective ranking policy
    //max_drawdown ranks by the smallest numeric value, which selects the
    //most severe drawdown; the table keeps that rule visible and testable
    pub fn better_is(self) -> BetterIs {
        match self {
            Objective::MaxDrawdown => BetterIs::Lower,
            _ => BetterIs::Higher,
        }
    }

    //reads this objective's value out of a metrics record
    pub fn extract(self, metrics: &Metrics) -> f64 {
        match self {
            Objective::SharpeRatio => metrics.sharpe_ratio,
            Objective::TotalReturn => metrics.total_return,
            Objective::AnnualReturn => metrics.annual_return,
            Objective::MaxDrawdown => metrics.max_drawdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_known_objectives() {
        assert_eq!(Objective::parse("sharpe_ratio").unwrap(), Objective::SharpeRatio);
        assert_eq!(Objective::parse("MAX_DRAWDOWN").unwrap(), Objective::MaxDrawdown);
    }

    #[test]
    fn parse_rejects_unknown_objective() {
        assert!(matches!(
            Objective::parse("calmar"),
            Err(EngineError::Configuration(_))
        ));
    }

    #[test]
    fn ranking_policy_table() {
        assert_eq!(Objective::SharpeRatio.better_is(), BetterIs::Higher);
        assert_eq!(Objective::TotalReturn.better_is(), BetterIs::Higher);
        assert_eq!(Objective::AnnualReturn.better_is(), BetterIs::Higher);
        assert_eq!(Objective::MaxDrawdown.better_is(), BetterIs::Lower);
    }
}
