//! Random variables underpin stochastic model behaviors.  Common continuous
//! distributions, with their common parameterizations, are wrapped in the
//! `Continuous` enum.  Sampling itself is delegated to `rand_distr`.

use rand::distributions::Distribution;
use serde::{Deserialize, Serialize};
use rand_distr::{Beta, Exp, Gamma, LogNormal, Normal, Triangular, Uniform, Weibull};

use super::UniformRNG;
use crate::utils::errors::SimulationError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Continuous {
    Beta { alpha: f64, beta: f64 },
    Exp { lambda: f64 },
    Gamma { shape: f64, scale: f64 },
    LogNormal { mu: f64, sigma: f64 },
    Normal { mean: f64, std_dev: f64 },
    Triangular { min: f64, max: f64, mode: f64 },
    /// Range is inclusive of min, exclusive of max: [min, max)
    Uniform { min: f64, max: f64 },
    Weibull { shape: f64, scale: f64 },
}

impl Continuous {
    /// The generation of random variates drives stochastic behaviors during
    /// simulation execution.  This function requires a random number
    /// stream, and produces a f64 random variate.
    pub fn random_variate(&self, uniform_rng: &mut UniformRNG) -> Result<f64, SimulationError> {
        match self {
            Continuous::Beta { alpha, beta } => {
                Ok(Beta::new(*alpha, *beta)?.sample(uniform_rng.rng()))
            }
            Continuous::Exp { lambda } => Ok(Exp::new(*lambda)?.sample(uniform_rng.rng())),
            Continuous::Gamma { shape, scale } => {
                Ok(Gamma::new(*shape, *scale)?.sample(uniform_rng.rng()))
            }
            Continuous::LogNormal { mu, sigma } => {
                Ok(LogNormal::new(*mu, *sigma)?.sample(uniform_rng.rng()))
            }
            Continuous::Normal { mean, std_dev } => {
                Ok(Normal::new(*mean, *std_dev)?.sample(uniform_rng.rng()))
            }
            Continuous::Triangular { min, max, mode } => {
                Ok(Triangular::new(*min, *max, *mode)?.sample(uniform_rng.rng()))
            }
            Continuous::Uniform { min, max } => {
                // Uniform::new panics on an empty range
                if !(min < max) {
                    return Err(SimulationError::InvalidConfiguration(format![
                        "uniform range [{}, {}) is empty",
                        min, max
                    ]));
                }
                Ok(Uniform::new(*min, *max).sample(uniform_rng.rng()))
            }
            Continuous::Weibull { shape, scale } => {
                Ok(Weibull::new(*shape, *scale)?.sample(uniform_rng.rng()))
            }
        }
    }
}
