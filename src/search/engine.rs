use crate::config::SimulationConfig;
use crate::data::Bar;
use crate::engine::BacktestEngine;
use crate::error::EngineError;
use crate::metrics::Metrics;
use crate::search::report::{SearchReport, SearchResult, TrialFailure};
use crate::search::Objective;
use crate::signal::StrategyKind;
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::time::{Duration, Instant};

//options shared by both search modes
#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    pub objective: Objective,
    //trials starting after this much wall-clock time are soft failures
    pub deadline: Option<Duration>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            objective: Objective::SharpeRatio,
            deadline: None,
        }
    }
}

//drives repeated backtests over a parameter space
//the bar series and base configuration are shared read-only across trials;
//every trial builds its own configuration, strategy, and simulation state
pub struct SearchEngine<'a> {
    bars: &'a [Bar],
    base: SimulationConfig,
    strategy: StrategyKind,
}

impl<'a> SearchEngine<'a> {
    pub fn new(bars: &'a [Bar], base: SimulationConfig, strategy: StrategyKind) -> Self {
        SearchEngine {
            bars,
            base,
            strategy,
        }
    }

    //exhaustive search over the cartesian product of the candidate values
    //enumeration order is deterministic: declared parameter order, first
    //parameter varying slowest, each parameter's values in declared order
    pub fn grid_search(
        &self,
        grid: &IndexMap<String, Vec<f64>>,
        options: &SearchOptions,
    ) -> Result<SearchReport, EngineError> {
        let trials = enumerate_grid(grid)?;
        self.execute(trials, options)
    }

    //samples n_trials configurations, each parameter drawn uniformly from
    //its inclusive integer range; a fixed seed reproduces the draw sequence
    //and therefore the whole report
    pub fn random_search(
        &self,
        distributions: &IndexMap<String, (i64, i64)>,
        n_trials: usize,
        seed: u64,
        options: &SearchOptions,
    ) -> Result<SearchReport, EngineError> {
        let trials = sample_distributions(distributions, n_trials, seed)?;
        self.execute(trials, options)
    }

    //runs one trial: overlay parameters, build the strategy, simulate, score
    fn run_trial(&self, params: &IndexMap<String, f64>) -> Result<Metrics, EngineError> {
        let config = self.base.merged(params)?;
        let strategy = self.strategy.build(&config)?;
        let engine = BacktestEngine::new(strategy, config);
        let result = engine.run(self.bars)?;
        Ok(result.metrics)
    }

    //runs all trials, recording per-trial errors as soft failures
    //trials are independent, so they fan out across the worker pool; results
    //are collected back in enumeration order to keep tie-breaks deterministic
    fn execute(
        &self,
        trials: Vec<IndexMap<String, f64>>,
        options: &SearchOptions,
    ) -> Result<SearchReport, EngineError> {
        let attempted = trials.len();
        let started = Instant::now();

        let outcomes: Vec<Result<Metrics, String>> = trials
            .par_iter()
            .map(|params| {
                if let Some(deadline) = options.deadline {
                    if started.elapsed() > deadline {
                        return Err("search deadline exceeded".to_string());
                    }
                }
                self.run_trial(params).map_err(|e| e.to_string())
            })
            .collect();

        let mut results = Vec::new();
        let mut failures = Vec::new();

        for (params, outcome) in trials.into_iter().zip(outcomes) {
            match outcome {
                Ok(metrics) => results.push(SearchResult { params, metrics }),
                Err(reason) => failures.push(TrialFailure { params, reason }),
            }
        }

        if results.is_empty() {
            return Err(EngineError::NoViableTrial {
                attempted,
                first_cause: failures
                    .first()
                    .map(|f| f.reason.clone())
                    .unwrap_or_else(|| "no trials attempted".to_string()),
            });
        }

        Ok(SearchReport::new(options.objective, results, failures))
    }
}

//expands a parameter grid into the full cartesian product
fn enumerate_grid(
    grid: &IndexMap<String, Vec<f64>>,
) -> Result<Vec<IndexMap<String, f64>>, EngineError> {
    if grid.is_empty() {
        return Err(EngineError::Configuration(
            "parameter grid has no parameters".to_string(),
        ));
    }

    let mut combos: Vec<IndexMap<String, f64>> = vec![IndexMap::new()];

    for (name, values) in grid {
        if values.is_empty() {
            return Err(EngineError::Configuration(format!(
                "parameter {} has no candidate values",
                name
            )));
        }

        let mut expanded = Vec::with_capacity(combos.len() * values.len());
        for combo in &combos {
            for value in values {
                let mut next = combo.clone();
                next.insert(name.clone(), *value);
                expanded.push(next);
            }
        }
        combos = expanded;
    }

    Ok(combos)
}

//draws n_trials parameter sets from inclusive integer ranges
fn sample_distributions(
    distributions: &IndexMap<String, (i64, i64)>,
    n_trials: usize,
    seed: u64,
) -> Result<Vec<IndexMap<String, f64>>, EngineError> {
    if distributions.is_empty() {
        return Err(EngineError::Configuration(
            "parameter distributions are empty".to_string(),
        ));
    }
    if n_trials == 0 {
        return Err(EngineError::Configuration(
            "random search needs at least one trial".to_string(),
        ));
    }
    for (name, (low, high)) in distributions {
        if low > high {
            return Err(EngineError::Configuration(format!(
                "parameter {} has an empty range [{}, {}]",
                name, low, high
            )));
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut trials = Vec::with_capacity(n_trials);

    for _ in 0..n_trials {
        let mut params = IndexMap::new();
        for (name, (low, high)) in distributions {
            let value = rng.gen_range(*low..=*high);
            params.insert(name.clone(), value as f64);
        }
        trials.push(params);
    }

    Ok(trials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                Bar::new_unchecked(
                    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
                        + chrono::Duration::days(i as i64),
                    c,
                    c,
                    c,
                    c,
                    100.0,
                    None,
                    "TA".to_string(),
                )
            })
            .collect()
    }

    //gently trending series with enough wiggle to produce defined metrics
    fn trending_bars(n: usize) -> Vec<Bar> {
        let closes: Vec<f64> = (0..n)
            .map(|i| 100.0 + 0.3 * i as f64 + if i % 2 == 0 { 0.0 } else { 1.5 })
            .collect();
        bars_from_closes(&closes)
    }

    fn grid(entries: &[(&str, &[f64])]) -> IndexMap<String, Vec<f64>> {
        entries
            .iter()
            .map(|(name, values)| (name.to_string(), values.to_vec()))
            .collect()
    }

    #[test]
    fn grid_enumeration_is_ordered() {
        let grid = grid(&[("fast_period", &[5.0, 10.0]), ("slow_period", &[20.0, 30.0])]);
        let combos = enumerate_grid(&grid).unwrap();

        assert_eq!(combos.len(), 4);
        //first declared parameter varies slowest
        assert_eq!(combos[0]["fast_period"], 5.0);
        assert_eq!(combos[0]["slow_period"], 20.0);
        assert_eq!(combos[1]["fast_period"], 5.0);
        assert_eq!(combos[1]["slow_period"], 30.0);
        assert_eq!(combos[2]["fast_period"], 10.0);
        assert_eq!(combos[3]["slow_period"], 30.0);
    }

    #[test]
    fn grid_search_runs_every_combination() {
        let bars = trending_bars(120);
        let engine =
            SearchEngine::new(&bars, SimulationConfig::default(), StrategyKind::MaCross);
        let grid = grid(&[("fast_period", &[3.0, 6.0]), ("slow_period", &[12.0, 24.0])]);

        let report = engine
            .grid_search(&grid, &SearchOptions::default())
            .unwrap();

        assert_eq!(report.results.len(), 4);
        assert!(report.failures.is_empty());

        //best must match an independent scan over the same four rows
        let objective = Objective::SharpeRatio;
        let mut expected_best = 0;
        let mut expected_value = f64::NEG_INFINITY;
        for (i, result) in report.results.iter().enumerate() {
            let value = objective.extract(&result.metrics);
            if value.is_finite() && value > expected_value {
                expected_value = value;
                expected_best = i;
            }
        }
        assert_eq!(report.best_index(), expected_best);
    }

    #[test]
    fn degenerate_combinations_are_soft_failures() {
        let bars = trending_bars(120);
        let engine =
            SearchEngine::new(&bars, SimulationConfig::default(), StrategyKind::MaCross);
        //fast 30 against slow 20 cannot build a strategy
        let grid = grid(&[("fast_period", &[5.0, 30.0]), ("slow_period", &[20.0])]);

        let report = engine
            .grid_search(&grid, &SearchOptions::default())
            .unwrap();

        assert_eq!(report.results.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].reason.contains("slow_period"));
    }

    #[test]
    fn all_failing_trials_is_no_viable_trial() {
        let bars = trending_bars(120);
        let engine =
            SearchEngine::new(&bars, SimulationConfig::default(), StrategyKind::MaCross);
        let grid = grid(&[("fast_period", &[30.0]), ("slow_period", &[20.0])]);

        let err = engine
            .grid_search(&grid, &SearchOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::NoViableTrial { attempted: 1, .. }
        ));
    }

    #[test]
    fn unknown_parameter_fails_each_trial() {
        let bars = trending_bars(120);
        let engine =
            SearchEngine::new(&bars, SimulationConfig::default(), StrategyKind::MaCross);
        let grid = grid(&[("fats_period", &[5.0, 10.0])]);

        let err = engine
            .grid_search(&grid, &SearchOptions::default())
            .unwrap_err();
        match err {
            EngineError::NoViableTrial {
                attempted,
                first_cause,
            } => {
                assert_eq!(attempted, 2);
                assert!(first_cause.contains("unknown parameter"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn random_sampling_is_reproducible() {
        let mut distributions = IndexMap::new();
        distributions.insert("fast_period".to_string(), (3i64, 30i64));
        distributions.insert("slow_period".to_string(), (10i64, 120i64));

        let a = sample_distributions(&distributions, 25, 42).unwrap();
        let b = sample_distributions(&distributions, 25, 42).unwrap();
        assert_eq!(a, b);

        let c = sample_distributions(&distributions, 25, 43).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn random_draws_stay_in_range() {
        let mut distributions = IndexMap::new();
        distributions.insert("fast_period".to_string(), (3i64, 8i64));

        let trials = sample_distributions(&distributions, 100, 7).unwrap();
        for trial in &trials {
            let v = trial["fast_period"];
            assert!((3.0..=8.0).contains(&v));
            assert_eq!(v, v.trunc());
        }
    }

    #[test]
    fn random_search_same_seed_same_report() {
        let bars = trending_bars(150);
        let engine =
            SearchEngine::new(&bars, SimulationConfig::default(), StrategyKind::MaCross);
        let mut distributions = IndexMap::new();
        distributions.insert("fast_period".to_string(), (3i64, 10i64));
        distributions.insert("slow_period".to_string(), (12i64, 40i64));

        let options = SearchOptions::default();
        let a = engine
            .random_search(&distributions, 10, 99, &options)
            .unwrap();
        let b = engine
            .random_search(&distributions, 10, 99, &options)
            .unwrap();

        assert_eq!(a.results.len(), b.results.len());
        assert_eq!(a.best_index(), b.best_index());
        for (ra, rb) in a.results.iter().zip(b.results.iter()) {
            assert_eq!(ra.params, rb.params);
        }
    }

    #[test]
    fn expired_deadline_fails_every_trial() {
        let bars = trending_bars(120);
        let engine =
            SearchEngine::new(&bars, SimulationConfig::default(), StrategyKind::MaCross);
        let grid = grid(&[("fast_period", &[3.0, 6.0]), ("slow_period", &[12.0])]);

        let options = SearchOptions {
            deadline: Some(Duration::from_secs(0)),
            ..Default::default()
        };
        let err = engine.grid_search(&grid, &options).unwrap_err();
        match err {
            EngineError::NoViableTrial { first_cause, .. } => {
                assert!(first_cause.contains("deadline"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn zero_trials_is_a_configuration_error() {
        let mut distributions = IndexMap::new();
        distributions.insert("fast_period".to_string(), (3i64, 8i64));
        assert!(matches!(
            sample_distributions(&distributions, 0, 1),
            Err(EngineError::Configuration(_))
        ));
    }
}
