use crate::error::EngineError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

//per-action commission schedule
//the defaults reproduce the documented behavior of the simulator: short
//entries are charged, long entries and exits are not
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionSchedule {
    pub long_entry: bool,
    pub short_entry: bool,
    pub exit: bool,
}

impl Default for CommissionSchedule {
    fn default() -> Self {
        CommissionSchedule {
            long_entry: false,
            short_entry: true,
            exit: false,
        }
    }
}

impl CommissionSchedule {
    //schedule that charges every action
    pub fn symmetric() -> Self {
        CommissionSchedule {
            long_entry: true,
            short_entry: true,
            exit: true,
        }
    }
}

//complete configuration for one simulation run
//constructed once per trial and never mutated afterwards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    //instrument code (eg ta, rb, m), used for labelling and reports
    pub instrument: String,

    //account settings
    pub initial_cash: f64,
    pub position_ratio: f64,
    pub commission_rate: f64,
    pub risk_free_rate: f64,
    pub commissions: CommissionSchedule,

    //ma crossover parameters
    pub fast_period: usize,
    pub slow_period: usize,

    //rsi reversion parameters
    pub rsi_period: usize,
    pub rsi_lower: f64,
    pub rsi_upper: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            instrument: "TA".to_string(),
            initial_cash: 1_000_000.0,
            position_ratio: 0.3,
            commission_rate: 0.0001,
            risk_free_rate: 0.03,
            commissions: CommissionSchedule::default(),
            fast_period: 5,
            slow_period: 20,
            rsi_period: 14,
            rsi_lower: 30.0,
            rsi_upper: 70.0,
        }
    }
}

impl SimulationConfig {
    //checks account settings before a run
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.initial_cash > 0.0) {
            return Err(EngineError::Configuration(format!(
                "initial_cash must be positive, got {}",
                self.initial_cash
            )));
        }
        if !(self.position_ratio > 0.0 && self.position_ratio <= 1.0) {
            return Err(EngineError::Configuration(format!(
                "position_ratio must lie in (0, 1], got {}",
                self.position_ratio
            )));
        }
        if !(self.commission_rate >= 0.0) {
            return Err(EngineError::Configuration(format!(
                "commission_rate must be non-negative, got {}",
                self.commission_rate
            )));
        }
        Ok(())
    }

    //overlays a single named parameter onto the configuration
    //unknown names are rejected so a typo in a search grid fails the trial
    //instead of silently searching nothing
    pub fn apply_param(&mut self, name: &str, value: f64) -> Result<(), EngineError> {
        match name {
            "initial_cash" => self.initial_cash = value,
            "position_ratio" => self.position_ratio = value,
            "commission_rate" => self.commission_rate = value,
            "risk_free_rate" => self.risk_free_rate = value,
            "fast_period" => self.fast_period = value as usize,
            "slow_period" => self.slow_period = value as usize,
            "rsi_period" => self.rsi_period = value as usize,
            "rsi_lower" => self.rsi_lower = value,
            "rsi_upper" => self.rsi_upper = value,
            _ => {
                return Err(EngineError::Configuration(format!(
                    "unknown parameter name: {}",
                    name
                )))
            }
        }
        Ok(())
    }

    //returns a copy with the given parameters overlaid (parameter values win)
    pub fn merged(&self, params: &IndexMap<String, f64>) -> Result<Self, EngineError> {
        let mut config = self.clone();
        for (name, value) in params {
            config.apply_param(name, *value)?;
        }
        Ok(config)
    }

    //load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: SimulationConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    //save configuration to a JSON file
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = SimulationConfig::default();
        assert_eq!(config.initial_cash, 1_000_000.0);
        assert_eq!(config.position_ratio, 0.3);
        assert_eq!(config.commission_rate, 0.0001);
        assert_eq!(config.risk_free_rate, 0.03);
        assert_eq!(config.fast_period, 5);
        assert_eq!(config.slow_period, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_schedule_is_asymmetric() {
        let schedule = CommissionSchedule::default();
        assert!(!schedule.long_entry);
        assert!(schedule.short_entry);
        assert!(!schedule.exit);
    }

    #[test]
    fn merged_overlays_in_order() {
        let base = SimulationConfig::default();
        let mut params = IndexMap::new();
        params.insert("fast_period".to_string(), 10.0);
        params.insert("slow_period".to_string(), 60.0);
        params.insert("position_ratio".to_string(), 0.5);

        let merged = base.merged(&params).unwrap();
        assert_eq!(merged.fast_period, 10);
        assert_eq!(merged.slow_period, 60);
        assert_eq!(merged.position_ratio, 0.5);
        //base untouched
        assert_eq!(base.fast_period, 5);
    }

    #[test]
    fn unknown_parameter_is_rejected() {
        let base = SimulationConfig::default();
        let mut params = IndexMap::new();
        params.insert("fats_period".to_string(), 10.0);

        let err = base.merged(&params).unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn invalid_position_ratio_fails_validation() {
        let mut config = SimulationConfig::default();
        config.position_ratio = 0.0;
        assert!(config.validate().is_err());
        config.position_ratio = 1.5;
        assert!(config.validate().is_err());
    }
}
