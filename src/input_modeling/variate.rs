use serde::{Deserialize, Serialize};

use super::{ContinuousRandomVariable, UniformRNG};
use crate::utils::errors::SimulationError;

/// A `VariateGenerator` produces the next duration of a stateful stream -
/// an inter-arrival time for a source, or a service time for a resource.
/// Any sampling implementation satisfying this single-method contract can
/// be plugged into a model, including plain closures.
pub trait VariateGenerator: Send {
    fn generate(&mut self) -> Result<f64, SimulationError>;
}

impl<F> VariateGenerator for F
where
    F: FnMut() -> f64 + Send,
{
    fn generate(&mut self) -> Result<f64, SimulationError> {
        Ok(self())
    }
}

/// Every variate is the same fixed value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Deterministic(pub f64);

impl VariateGenerator for Deterministic {
    fn generate(&mut self) -> Result<f64, SimulationError> {
        Ok(self.0)
    }
}

/// Variates are taken from a fixed list, restarting from the front once the
/// list is exhausted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sequence {
    values: Vec<f64>,
    #[serde(default)]
    cursor: usize,
}

impl Sequence {
    pub fn new(values: Vec<f64>) -> Result<Self, SimulationError> {
        if values.is_empty() {
            return Err(SimulationError::InvalidConfiguration(String::from(
                "a variate sequence needs at least one value",
            )));
        }
        Ok(Self { values, cursor: 0 })
    }
}

impl VariateGenerator for Sequence {
    fn generate(&mut self) -> Result<f64, SimulationError> {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor = (self.cursor + 1) % self.values.len();
        Ok(value)
    }
}

/// Variates are sampled from a continuous distribution, with a dedicated
/// random number stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stochastic {
    distribution: ContinuousRandomVariable,
    #[serde(default)]
    uniform_rng: UniformRNG,
}

impl Stochastic {
    pub fn new(distribution: ContinuousRandomVariable, uniform_rng: UniformRNG) -> Self {
        Self {
            distribution,
            uniform_rng,
        }
    }

    pub fn distribution(&self) -> &ContinuousRandomVariable {
        &self.distribution
    }
}

impl VariateGenerator for Stochastic {
    fn generate(&mut self) -> Result<f64, SimulationError> {
        self.distribution.random_variate(&mut self.uniform_rng)
    }
}
