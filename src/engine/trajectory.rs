use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

//one simulated step: portfolio value and its pct change from the prior step
//the first recorded step has no prior value, so its return is nan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub timestamp: DateTime<Utc>,
    pub portfolio_value: f64,
    pub returns: f64,
}

//a point in the derived drawdown series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawdownPoint {
    pub timestamp: DateTime<Utc>,
    pub wealth: f64,
    pub drawdown: f64,
}

//time-indexed output of one simulation run, one record per simulated step
#[derive(Debug, Clone, Default)]
pub struct PortfolioTrajectory {
    pub points: Vec<TrajectoryPoint>,
}

impl PortfolioTrajectory {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn final_value(&self) -> Option<f64> {
        self.points.last().map(|p| p.portfolio_value)
    }

    //the return series with the undefined first entry excluded
    pub fn returns(&self) -> Vec<f64> {
        self.points.iter().skip(1).map(|p| p.returns).collect()
    }

    //cumulative wealth index and proportional decline from its running peak,
    //one point per defined return
    pub fn drawdown_series(&self) -> Vec<DrawdownPoint> {
        let mut series = Vec::with_capacity(self.points.len().saturating_sub(1));
        let mut wealth = 1.0;
        let mut peak = 1.0;

        for point in self.points.iter().skip(1) {
            wealth *= 1.0 + point.returns;
            if wealth > peak {
                peak = wealth;
            }
            series.push(DrawdownPoint {
                timestamp: point.timestamp,
                wealth,
                drawdown: (wealth - peak) / peak,
            });
        }

        series
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn trajectory_from_values(values: &[f64]) -> PortfolioTrajectory {
        let mut points = Vec::new();
        let mut prev = f64::NAN;
        for (i, &value) in values.iter().enumerate() {
            points.push(TrajectoryPoint {
                timestamp: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
                    + chrono::Duration::days(i as i64),
                portfolio_value: value,
                returns: (value - prev) / prev,
            });
            prev = value;
        }
        PortfolioTrajectory { points }
    }

    #[test]
    fn returns_exclude_the_first_step() {
        let trajectory = trajectory_from_values(&[100.0, 110.0, 99.0]);
        let returns = trajectory.returns();

        assert_eq!(returns.len(), 2);
        assert!((returns[0] - 0.10).abs() < 1e-9);
        assert!((returns[1] + 0.10).abs() < 1e-9);
    }

    #[test]
    fn first_step_return_is_nan() {
        let trajectory = trajectory_from_values(&[100.0, 110.0]);
        assert!(trajectory.points[0].returns.is_nan());
    }

    #[test]
    fn drawdown_series_tracks_peak() {
        let trajectory = trajectory_from_values(&[100.0, 110.0, 99.0, 121.0]);
        let series = trajectory.drawdown_series();

        assert_eq!(series.len(), 3);
        //new peak after the first gain
        assert!((series[0].drawdown - 0.0).abs() < 1e-9);
        //decline from 1.1 to 0.99 relative to the 1.1 peak
        assert!((series[1].drawdown - (0.99 - 1.1) / 1.1).abs() < 1e-9);
        //recovery past the old peak clears the drawdown
        assert!((series[2].drawdown - 0.0).abs() < 1e-9);
    }
}
