use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use pozole::prelude::*;
use pozole::report;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "pozole")]
#[command(about = "A Rust-based backtesting and parameter search engine for continuous futures", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    //run a single backtest
    Run {
        //path to csv data file
        #[arg(long)]
        data: PathBuf,

        //instrument code (eg ta, rb, m)
        #[arg(long)]
        instrument: String,

        //strategy type (ma_cross, rsi_reversion)
        #[arg(long, default_value = "ma_cross")]
        strategy: String,

        //start date (yyyy-mm-dd)
        #[arg(long)]
        start: Option<String>,

        //end date (yyyy-mm-dd)
        #[arg(long)]
        end: Option<String>,

        //optional base configuration json
        #[arg(long)]
        config: Option<PathBuf>,

        //initial account cash
        #[arg(long)]
        initial_cash: Option<f64>,

        //fraction of cash committed per position
        #[arg(long)]
        position_ratio: Option<f64>,

        //commission rate applied per the commission schedule
        #[arg(long)]
        commission_rate: Option<f64>,

        //annual risk-free rate for the sharpe ratio
        #[arg(long)]
        risk_free_rate: Option<f64>,

        //fast ma window
        #[arg(long)]
        fast: Option<usize>,

        //slow ma window
        #[arg(long)]
        slow: Option<usize>,

        //rsi lookback period
        #[arg(long)]
        rsi_period: Option<usize>,

        //rsi lower threshold
        #[arg(long)]
        rsi_lower: Option<f64>,

        //rsi upper threshold
        #[arg(long)]
        rsi_upper: Option<f64>,

        //skip contract-roll back-adjustment
        #[arg(long)]
        no_adjust: bool,

        //directory for report artifacts
        #[arg(long)]
        report_dir: Option<PathBuf>,
    },

    //search strategy parameters for the best configuration
    Optimize {
        //path to csv data file
        #[arg(long)]
        data: PathBuf,

        //instrument code (eg ta, rb, m)
        #[arg(long)]
        instrument: String,

        //strategy type (ma_cross, rsi_reversion)
        #[arg(long, default_value = "ma_cross")]
        strategy: String,

        //start date (yyyy-mm-dd)
        #[arg(long)]
        start: Option<String>,

        //end date (yyyy-mm-dd)
        #[arg(long)]
        end: Option<String>,

        //search method (grid or random)
        #[arg(long, default_value = "grid")]
        method: String,

        //objective metric (sharpe_ratio, total_return, annual_return, max_drawdown)
        #[arg(long, default_value = "sharpe_ratio")]
        metric: String,

        //fast ma search range
        #[arg(long, default_value = "3")]
        fast_min: i64,
        #[arg(long, default_value = "30")]
        fast_max: i64,

        //slow ma search range
        #[arg(long, default_value = "10")]
        slow_min: i64,
        #[arg(long, default_value = "120")]
        slow_max: i64,

        //rsi period search range (rsi_reversion only)
        #[arg(long, default_value = "5")]
        rsi_min: i64,
        #[arg(long, default_value = "30")]
        rsi_max: i64,

        //random search iterations
        #[arg(long, default_value = "50")]
        trials: usize,

        //random search seed
        #[arg(long, default_value = "42")]
        seed: u64,

        //wall-clock budget in seconds; later trials become soft failures
        #[arg(long)]
        deadline_secs: Option<u64>,

        //initial account cash
        #[arg(long)]
        initial_cash: Option<f64>,

        //fraction of cash committed per position
        #[arg(long)]
        position_ratio: Option<f64>,

        //commission rate applied per the commission schedule
        #[arg(long)]
        commission_rate: Option<f64>,

        //skip contract-roll back-adjustment
        #[arg(long)]
        no_adjust: bool,

        //how many leading trials to print
        #[arg(long, default_value = "10")]
        top: usize,

        //results output file
        #[arg(long, default_value = "optimization_results.csv")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            data,
            instrument,
            strategy,
            start,
            end,
            config,
            initial_cash,
            position_ratio,
            commission_rate,
            risk_free_rate,
            fast,
            slow,
            rsi_period,
            rsi_lower,
            rsi_upper,
            no_adjust,
            report_dir,
        } => {
            let mut base = match config {
                Some(path) => SimulationConfig::from_json_file(&path)
                    .context(format!("Failed to load config from {:?}", path))?,
                None => SimulationConfig::default(),
            };
            base.instrument = instrument.clone();
            apply_flag(&mut base.initial_cash, initial_cash);
            apply_flag(&mut base.position_ratio, position_ratio);
            apply_flag(&mut base.commission_rate, commission_rate);
            apply_flag(&mut base.risk_free_rate, risk_free_rate);
            apply_flag(&mut base.fast_period, fast);
            apply_flag(&mut base.slow_period, slow);
            apply_flag(&mut base.rsi_period, rsi_period);
            apply_flag(&mut base.rsi_lower, rsi_lower);
            apply_flag(&mut base.rsi_upper, rsi_upper);

            run_backtest(data, instrument, strategy, start, end, base, no_adjust, report_dir)
        }
        Commands::Optimize {
            data,
            instrument,
            strategy,
            start,
            end,
            method,
            metric,
            fast_min,
            fast_max,
            slow_min,
            slow_max,
            rsi_min,
            rsi_max,
            trials,
            seed,
            deadline_secs,
            initial_cash,
            position_ratio,
            commission_rate,
            no_adjust,
            top,
            output,
        } => {
            let mut base = SimulationConfig::default();
            base.instrument = instrument.clone();
            apply_flag(&mut base.initial_cash, initial_cash);
            apply_flag(&mut base.position_ratio, position_ratio);
            apply_flag(&mut base.commission_rate, commission_rate);

            optimize(
                data,
                instrument,
                strategy,
                start,
                end,
                method,
                metric,
                (fast_min, fast_max),
                (slow_min, slow_max),
                (rsi_min, rsi_max),
                trials,
                seed,
                deadline_secs,
                base,
                no_adjust,
                top,
                output,
            )
        }
    }
}

//overrides a config field when the flag was given
fn apply_flag<T: Copy>(field: &mut T, flag: Option<T>) {
    if let Some(value) = flag {
        *field = value;
    }
}

fn parse_date(raw: &Option<String>, label: &str) -> Result<Option<NaiveDate>> {
    match raw {
        Some(s) => {
            let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .context(format!("Failed to parse {} date '{}'", label, s))?;
            Ok(Some(date))
        }
        None => Ok(None),
    }
}

//loads, cleans, roll-adjusts, and date-filters the price series
fn load_series(
    data_path: &PathBuf,
    start: &Option<String>,
    end: &Option<String>,
    no_adjust: bool,
) -> Result<Vec<Bar>> {
    println!("Loading data from {:?}...", data_path);
    let raw = load_csv(data_path).context(format!("Failed to load data from {:?}", data_path))?;

    let mut bars = clean(raw);
    if !no_adjust {
        bars = adjust_rolls(bars);
    }

    let start = parse_date(start, "start")?;
    let end = parse_date(end, "end")?;
    let bars = filter_by_date(&bars, start, end);

    if bars.is_empty() {
        anyhow::bail!("No data left after cleaning and date filtering");
    }

    println!("Loaded {} bars", bars.len());
    println!(
        "Date range: {} to {}\n",
        bars.first().map(|b| b.timestamp).unwrap_or_default(),
        bars.last().map(|b| b.timestamp).unwrap_or_default()
    );

    Ok(bars)
}

#[allow(clippy::too_many_arguments)]
fn run_backtest(
    data_path: PathBuf,
    instrument: String,
    strategy_name: String,
    start: Option<String>,
    end: Option<String>,
    config: SimulationConfig,
    no_adjust: bool,
    report_dir: Option<PathBuf>,
) -> Result<()> {
    println!("Pozole Futures Backtesting Engine");
    println!("=================================\n");

    let bars = load_series(&data_path, &start, &end, no_adjust)?;

    let kind = StrategyKind::parse(&strategy_name)?;
    let strategy = kind.build(&config)?;

    println!("Instrument: {}", instrument);
    println!("Strategy: {}", strategy.name());
    println!("Initial cash: {:.2}", config.initial_cash);
    println!("Position ratio: {:.2}", config.position_ratio);
    println!("Commission rate: {}\n", config.commission_rate);

    println!("Running backtest...\n");
    let engine = BacktestEngine::new(strategy, config);
    let result = engine.run(&bars)?;

    println!("Backtest Results");
    println!("================\n");
    result.metrics.pretty_print_table();

    if let Some(dir) = report_dir {
        report::generate(&result.trajectory, &result.metrics, &dir)?;
        println!("\nReport saved to {:?}", dir);
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn optimize(
    data_path: PathBuf,
    instrument: String,
    strategy_name: String,
    start: Option<String>,
    end: Option<String>,
    method: String,
    metric: String,
    fast_range: (i64, i64),
    slow_range: (i64, i64),
    rsi_range: (i64, i64),
    trials: usize,
    seed: u64,
    deadline_secs: Option<u64>,
    base: SimulationConfig,
    no_adjust: bool,
    top: usize,
    output: PathBuf,
) -> Result<()> {
    println!("Pozole Parameter Search");
    println!("=======================\n");

    let bars = load_series(&data_path, &start, &end, no_adjust)?;

    let kind = StrategyKind::parse(&strategy_name)?;
    let objective = Objective::parse(&metric)?;
    let options = SearchOptions {
        objective,
        deadline: deadline_secs.map(Duration::from_secs),
    };

    let engine = SearchEngine::new(&bars, base, kind);

    println!("Instrument: {}", instrument);
    println!("Objective: {}", objective.label());

    let report = match method.as_str() {
        "grid" => {
            let grid = build_grid(kind, fast_range, slow_range, rsi_range);
            let combinations: usize = grid.values().map(|v| v.len()).product();
            println!("Method: grid search ({} combinations)\n", combinations);
            engine.grid_search(&grid, &options)?
        }
        "random" => {
            let distributions = build_distributions(kind, fast_range, slow_range, rsi_range);
            println!("Method: random search ({} trials, seed {})\n", trials, seed);
            engine.random_search(&distributions, trials, seed, &options)?
        }
        other => anyhow::bail!("Unknown search method: {} (expected grid or random)", other),
    };

    println!("Best Trial");
    println!("==========\n");
    report.print_summary();

    println!("\nTop {} trials by {}:", top, objective.label());
    report.print_top(top);

    report.to_csv(&output)?;
    println!("\nResults saved to {:?}", output);

    Ok(())
}

//candidate values for grid search, per strategy
fn build_grid(
    kind: StrategyKind,
    fast_range: (i64, i64),
    slow_range: (i64, i64),
    rsi_range: (i64, i64),
) -> IndexMap<String, Vec<f64>> {
    let span = |(low, high): (i64, i64)| (low..=high).map(|v| v as f64).collect::<Vec<f64>>();

    let mut grid = IndexMap::new();
    match kind {
        StrategyKind::MaCross => {
            grid.insert("fast_period".to_string(), span(fast_range));
            grid.insert("slow_period".to_string(), span(slow_range));
        }
        StrategyKind::RsiReversion => {
            grid.insert("rsi_period".to_string(), span(rsi_range));
        }
    }
    grid
}

//integer ranges for random search, per strategy
fn build_distributions(
    kind: StrategyKind,
    fast_range: (i64, i64),
    slow_range: (i64, i64),
    rsi_range: (i64, i64),
) -> IndexMap<String, (i64, i64)> {
    let mut distributions = IndexMap::new();
    match kind {
        StrategyKind::MaCross => {
            distributions.insert("fast_period".to_string(), fast_range);
            distributions.insert("slow_period".to_string(), slow_range);
        }
        StrategyKind::RsiReversion => {
            distributions.insert("rsi_period".to_string(), rsi_range);
        }
    }
    distributions
}
