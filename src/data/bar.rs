use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BarError {
    #[error("Non-positive close: {0}")]
    NonPositiveClose(f64),
    #[error("Invalid OHLC values: high ({high}) < low ({low})")]
    InvalidHighLow { high: f64, low: f64 },
    #[error("Invalid OHLC values: close ({close}) outside high-low range [{low}, {high}]")]
    InvalidClose { close: f64, high: f64, low: f64 },
    #[error("Negative volume: {0}")]
    NegativeVolume(f64),
}

//represents a single ohlcv bar of market data
//the close must be positive: the simulator sizes positions by dividing by it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub open_interest: Option<f64>,
    pub symbol: String,
}

impl Bar {
    //creates a new Bar with validation
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        open_interest: Option<f64>,
        symbol: String,
    ) -> Result<Self, BarError> {
        if close <= 0.0 {
            return Err(BarError::NonPositiveClose(close));
        }

        if high < low {
            return Err(BarError::InvalidHighLow { high, low });
        }

        if close < low || close > high {
            return Err(BarError::InvalidClose { close, high, low });
        }

        if volume < 0.0 {
            return Err(BarError::NegativeVolume(volume));
        }

        Ok(Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            open_interest,
            symbol,
        })
    }

    //creates a Bar without validation
    #[allow(clippy::too_many_arguments)]
    pub fn new_unchecked(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        open_interest: Option<f64>,
        symbol: String,
    ) -> Self {
        Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            open_interest,
            symbol,
        }
    }

    //true when every price field is finite and positive
    pub fn has_valid_prices(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|p| p.is_finite() && *p > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 2, 9, 0, 0).unwrap()
    }

    #[test]
    fn valid_bar_constructs() {
        let bar = Bar::new(ts(), 100.0, 101.0, 99.0, 100.5, 1200.0, None, "TA".to_string());
        assert!(bar.is_ok());
    }

    #[test]
    fn non_positive_close_is_rejected() {
        let bar = Bar::new(ts(), 100.0, 101.0, -1.0, 0.0, 1200.0, None, "TA".to_string());
        assert!(matches!(bar, Err(BarError::NonPositiveClose(_))));
    }

    #[test]
    fn inverted_high_low_is_rejected() {
        let bar = Bar::new(ts(), 100.0, 99.0, 101.0, 100.0, 1200.0, None, "TA".to_string());
        assert!(matches!(bar, Err(BarError::InvalidHighLow { .. })));
    }

    #[test]
    fn invalid_prices_detected() {
        let mut bar =
            Bar::new_unchecked(ts(), 100.0, 101.0, 99.0, 100.0, 0.0, None, "TA".to_string());
        assert!(bar.has_valid_prices());
        bar.low = f64::NAN;
        assert!(!bar.has_valid_prices());
    }
}
