use crate::engine::PortfolioTrajectory;
use crate::metrics::Metrics;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

//writes the equity curve as csv
pub fn write_equity_csv<P: AsRef<Path>>(trajectory: &PortfolioTrajectory, path: P) -> Result<()> {
    let mut file = std::fs::File::create(path.as_ref())
        .context(format!("Failed to create {:?}", path.as_ref()))?;
    writeln!(file, "timestamp,portfolio_value,returns")?;

    for point in &trajectory.points {
        writeln!(
            file,
            "{},{},{}",
            point.timestamp.to_rfc3339(),
            point.portfolio_value,
            point.returns
        )?;
    }

    Ok(())
}

//writes the wealth index and drawdown series as csv
pub fn write_drawdown_csv<P: AsRef<Path>>(trajectory: &PortfolioTrajectory, path: P) -> Result<()> {
    let mut file = std::fs::File::create(path.as_ref())
        .context(format!("Failed to create {:?}", path.as_ref()))?;
    writeln!(file, "timestamp,wealth,drawdown")?;

    for point in trajectory.drawdown_series() {
        writeln!(
            file,
            "{},{},{}",
            point.timestamp.to_rfc3339(),
            point.wealth,
            point.drawdown
        )?;
    }

    Ok(())
}

//writes the plain-text performance report
pub fn write_text_report<P: AsRef<Path>>(metrics: &Metrics, path: P) -> Result<()> {
    let mut file = std::fs::File::create(path.as_ref())
        .context(format!("Failed to create {:?}", path.as_ref()))?;

    writeln!(file, "{}", "=".repeat(50))?;
    writeln!(file, "Backtest Performance Report")?;
    writeln!(file, "{}", "=".repeat(50))?;
    writeln!(file)?;
    writeln!(file, "Return metrics:")?;
    writeln!(file, "  Total return: {:.2}%", metrics.total_return * 100.0)?;
    writeln!(file, "  Annual return: {:.2}%", metrics.annual_return * 100.0)?;
    writeln!(file)?;
    writeln!(file, "Risk metrics:")?;
    writeln!(file, "  Annual volatility: {:.2}%", metrics.volatility * 100.0)?;
    writeln!(file, "  Max drawdown: {:.2}%", metrics.max_drawdown * 100.0)?;
    writeln!(file)?;
    writeln!(file, "Risk-adjusted:")?;
    writeln!(file, "  Sharpe ratio: {:.4}", metrics.sharpe_ratio)?;

    Ok(())
}

//writes the full report set into a directory: equity curve, drawdown
//series, and the text summary (everything a renderer needs, no plots)
pub fn generate<P: AsRef<Path>>(
    trajectory: &PortfolioTrajectory,
    metrics: &Metrics,
    dir: P,
) -> Result<()> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).context(format!("Failed to create report dir {:?}", dir))?;

    write_equity_csv(trajectory, dir.join("equity_curve.csv"))?;
    write_drawdown_csv(trajectory, dir.join("drawdown.csv"))?;
    write_text_report(metrics, dir.join("performance_report.txt"))?;

    Ok(())
}
