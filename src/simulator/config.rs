use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::input_modeling::uniform_rng::DEFAULT_SEED;
use crate::utils::errors::SimulationError;

/// Run-level settings of a `Director`.  Every field is optional in YAML or
/// JSON form; the defaults run until the agenda is exhausted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorConfig {
    /// Stop before the first activation scheduled strictly after this time.
    #[serde(default)]
    pub end_time: Option<f64>,
    /// Stop after this many hand-offs.
    #[serde(default)]
    pub max_activations: Option<usize>,
    /// Abort the run once this much wall-clock time has passed.
    #[serde(default)]
    pub wall_clock_timeout_ms: Option<u64>,
    /// Seed of the random number streams handed out by the director.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Keep the (actor, time) sequence of every dispatch in the report.
    #[serde(default)]
    pub record_dispatches: bool,
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            end_time: None,
            max_activations: None,
            wall_clock_timeout_ms: None,
            seed: DEFAULT_SEED,
            record_dispatches: false,
        }
    }
}

impl DirectorConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, SimulationError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()
    }

    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()
    }

    pub fn validate(self) -> Result<Self, SimulationError> {
        if let Some(end_time) = self.end_time {
            if !end_time.is_finite() || end_time < 0.0 {
                return Err(SimulationError::InvalidConfiguration(format![
                    "end time {} must be finite and non-negative",
                    end_time
                ]));
            }
        }
        if self.wall_clock_timeout_ms == Some(0) {
            return Err(SimulationError::InvalidConfiguration(String::from(
                "the wall-clock timeout must be positive",
            )));
        }
        Ok(self)
    }

    pub fn wall_clock_timeout(&self) -> Option<Duration> {
        self.wall_clock_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_is_the_default() {
        let config = DirectorConfig::from_yaml("{}").unwrap();
        assert_eq!(config, DirectorConfig::default());
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn fields_are_camel_case() {
        let config = DirectorConfig::from_yaml(
            "endTime: 100.0\nmaxActivations: 500\nwallClockTimeoutMs: 2000\nseed: 7\nrecordDispatches: true\n",
        )
        .unwrap();
        assert_eq!(config.end_time, Some(100.0));
        assert_eq!(config.max_activations, Some(500));
        assert_eq!(config.wall_clock_timeout(), Some(Duration::from_secs(2)));
        assert_eq!(config.seed, 7);
        assert!(config.record_dispatches);
    }

    #[test]
    fn json_is_accepted() {
        let config = DirectorConfig::from_json(r#"{"endTime": 3.5}"#).unwrap();
        assert_eq!(config.end_time, Some(3.5));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            DirectorConfig::from_yaml("endTime: -1.0"),
            Err(SimulationError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            DirectorConfig::from_json(r#"{"wallClockTimeoutMs": 0}"#),
            Err(SimulationError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            DirectorConfig::from_json("{"),
            Err(SimulationError::Serialization(_))
        ));
    }
}
