use crate::metrics::Metrics;
use crate::search::{BetterIs, Objective};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use prettytable::{Cell, Row, Table};
use std::cmp::Ordering;
use std::path::Path;

//one successfully completed trial
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub params: IndexMap<String, f64>,
    pub metrics: Metrics,
}

//one recorded soft failure
#[derive(Debug, Clone)]
pub struct TrialFailure {
    pub params: IndexMap<String, f64>,
    pub reason: String,
}

//the full outcome of a search: every surviving trial in enumeration order,
//every recorded failure, and the best trial under the objective
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub objective: Objective,
    pub results: Vec<SearchResult>,
    pub failures: Vec<TrialFailure>,
    best: usize,
}

impl SearchReport {
    //results must be non-empty; the search engine enforces that
    pub fn new(objective: Objective, results: Vec<SearchResult>, failures: Vec<TrialFailure>) -> Self {
        let best = ranked_indices(objective, &results)[0];
        SearchReport {
            objective,
            results,
            failures,
            best,
        }
    }

    pub fn best_index(&self) -> usize {
        self.best
    }

    pub fn best(&self) -> &SearchResult {
        &self.results[self.best]
    }

    //result indices ordered best-first under the objective
    pub fn ranked(&self) -> Vec<usize> {
        ranked_indices(self.objective, &self.results)
    }

    //persists the report: one header row, one row per surviving trial,
    //parameter columns in declared order followed by the metric columns
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = csv::Writer::from_path(path)
            .context(format!("Failed to create results file: {:?}", path))?;

        let param_names: Vec<&String> = self.results[0].params.keys().collect();

        let mut header: Vec<String> = param_names.iter().map(|n| n.to_string()).collect();
        header.extend(Metrics::FIELDS.iter().map(|f| f.to_string()));
        writer.write_record(&header)?;

        for result in &self.results {
            let mut row: Vec<String> = param_names
                .iter()
                .map(|name| result.params[name.as_str()].to_string())
                .collect();
            row.extend(result.metrics.values().iter().map(|v| v.to_string()));
            writer.write_record(&row)?;
        }

        writer.flush()?;
        Ok(())
    }

    //prints the best trial and the search tally
    pub fn print_summary(&self) {
        let best = self.best();

        let mut table = Table::new();
        table.add_row(Row::new(vec![Cell::new("Parameter"), Cell::new("Value")]));
        for (name, value) in &best.params {
            table.add_row(Row::new(vec![
                Cell::new(name),
                Cell::new(&format!("{}", value)),
            ]));
        }
        table.add_row(Row::new(vec![
            Cell::new("Total Return"),
            Cell::new(&format!("{:.2}%", best.metrics.total_return * 100.0)),
        ]));
        table.add_row(Row::new(vec![
            Cell::new("Annual Return"),
            Cell::new(&format!("{:.2}%", best.metrics.annual_return * 100.0)),
        ]));
        table.add_row(Row::new(vec![
            Cell::new("Volatility"),
            Cell::new(&format!("{:.2}%", best.metrics.volatility * 100.0)),
        ]));
        table.add_row(Row::new(vec![
            Cell::new("Sharpe Ratio"),
            Cell::new(&format!("{:.4}", best.metrics.sharpe_ratio)),
        ]));
        table.add_row(Row::new(vec![
            Cell::new("Max Drawdown"),
            Cell::new(&format!("{:.2}%", best.metrics.max_drawdown * 100.0)),
        ]));
        table.printstd();

        println!(
            "{} trials completed, {} failed (objective: {})",
            self.results.len(),
            self.failures.len(),
            self.objective.label()
        );
    }

    //prints the leading trials ranked under the objective
    pub fn print_top(&self, n: usize) {
        let param_names: Vec<&String> = self.results[0].params.keys().collect();

        let mut table = Table::new();
        let mut header = vec![Cell::new("#")];
        header.extend(param_names.iter().map(|name| Cell::new(name)));
        header.push(Cell::new("total_return"));
        header.push(Cell::new("sharpe_ratio"));
        header.push(Cell::new("max_drawdown"));
        table.add_row(Row::new(header));

        for (rank, &index) in self.ranked().iter().take(n).enumerate() {
            let result = &self.results[index];
            let mut row = vec![Cell::new(&format!("{}", rank + 1))];
            row.extend(
                param_names
                    .iter()
                    .map(|name| Cell::new(&format!("{}", result.params[name.as_str()]))),
            );
            row.push(Cell::new(&format!(
                "{:.2}%",
                result.metrics.total_return * 100.0
            )));
            row.push(Cell::new(&format!("{:.4}", result.metrics.sharpe_ratio)));
            row.push(Cell::new(&format!(
                "{:.2}%",
                result.metrics.max_drawdown * 100.0
            )));
            table.add_row(Row::new(row));
        }

        table.printstd();
    }
}

//orders result indices best-first: finite objective values ranked by the
//objective's direction, non-finite values last, ties kept in trial order
fn ranked_indices(objective: Objective, results: &[SearchResult]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..results.len()).collect();

    indices.sort_by(|&a, &b| {
        let va = objective.extract(&results[a].metrics);
        let vb = objective.extract(&results[b].metrics);
        match (va.is_finite(), vb.is_finite()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => Ordering::Equal,
            (true, true) => {
                let ascending = va.partial_cmp(&vb).unwrap_or(Ordering::Equal);
                match objective.better_is() {
                    BetterIs::Higher => ascending.reverse(),
                    BetterIs::Lower => ascending,
                }
            }
        }
    });

    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(total: f64, sharpe: f64, drawdown: f64) -> Metrics {
        Metrics {
            total_return: total,
            annual_return: total * 2.0,
            volatility: 0.1,
            sharpe_ratio: sharpe,
            max_drawdown: drawdown,
        }
    }

    fn result(fast: f64, metrics: Metrics) -> SearchResult {
        let mut params = IndexMap::new();
        params.insert("fast_period".to_string(), fast);
        params.insert("slow_period".to_string(), fast * 4.0);
        SearchResult { params, metrics }
    }

    #[test]
    fn best_is_argmax_for_sharpe() {
        let report = SearchReport::new(
            Objective::SharpeRatio,
            vec![
                result(5.0, metrics(0.10, 1.0, -0.05)),
                result(10.0, metrics(0.20, 2.5, -0.10)),
                result(15.0, metrics(0.15, 1.5, -0.02)),
            ],
            vec![],
        );
        assert_eq!(report.best_index(), 1);
    }

    #[test]
    fn best_is_argmin_for_max_drawdown() {
        //the smallest numeric value wins, which is the deepest drawdown
        let report = SearchReport::new(
            Objective::MaxDrawdown,
            vec![
                result(5.0, metrics(0.10, 1.0, -0.05)),
                result(10.0, metrics(0.20, 2.5, -0.30)),
                result(15.0, metrics(0.15, 1.5, -0.02)),
            ],
            vec![],
        );
        assert_eq!(report.best_index(), 1);
    }

    #[test]
    fn ties_keep_the_first_encountered_trial() {
        let report = SearchReport::new(
            Objective::SharpeRatio,
            vec![
                result(5.0, metrics(0.10, 2.0, -0.05)),
                result(10.0, metrics(0.20, 2.0, -0.10)),
            ],
            vec![],
        );
        assert_eq!(report.best_index(), 0);
    }

    #[test]
    fn non_finite_objective_values_never_win() {
        let report = SearchReport::new(
            Objective::SharpeRatio,
            vec![
                result(5.0, metrics(0.10, f64::NAN, -0.05)),
                result(10.0, metrics(0.05, 0.5, -0.10)),
            ],
            vec![],
        );
        assert_eq!(report.best_index(), 1);
    }

    #[test]
    fn all_non_finite_falls_back_to_the_first_trial() {
        let report = SearchReport::new(
            Objective::SharpeRatio,
            vec![
                result(5.0, metrics(0.10, f64::NAN, -0.05)),
                result(10.0, metrics(0.05, f64::NAN, -0.10)),
            ],
            vec![],
        );
        assert_eq!(report.best_index(), 0);
    }

    #[test]
    fn csv_has_stable_columns_and_one_row_per_trial() {
        let report = SearchReport::new(
            Objective::SharpeRatio,
            vec![
                result(5.0, metrics(0.10, 1.0, -0.05)),
                result(10.0, metrics(0.20, 2.5, -0.10)),
            ],
            vec![],
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        report.to_csv(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "fast_period,slow_period,total_return,annual_return,volatility,sharpe_ratio,max_drawdown"
        );
        assert_eq!(lines.count(), 2);
    }
}
