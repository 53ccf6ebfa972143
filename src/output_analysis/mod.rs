//! The output analysis module provides the statistics collected by model
//! components during a simulation run.  Observed intervals (waiting times,
//! service times) are tallied into a streaming `Statistic`, while values
//! that change at discrete points in time (queue lengths, units in use) are
//! integrated over simulated time by a `TimeStatistic`.

use serde::{Deserialize, Serialize};

use crate::utils::errors::SimulationError;

/// A streaming sample statistic.  Points are not retained - count, sum,
/// mean, and variance are maintained incrementally (Welford's method), so a
/// statistic costs the same regardless of the run length.  The variance is
/// the population variance of the tallied points, dividing by n.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statistic {
    name: String,
    count: usize,
    sum: f64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl Default for Statistic {
    fn default() -> Self {
        Self::new("")
    }
}

impl Statistic {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            count: 0,
            sum: 0.0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record a single observation.
    pub fn tally(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// The sample mean, or zero for an empty statistic.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// The population variance, or zero for fewer than two points.
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / self.count as f64
        }
    }

    pub fn min(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.min)
        }
    }

    pub fn max(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.max)
        }
    }

    pub fn summary(&self) -> StatisticSummary {
        StatisticSummary {
            count: self.count,
            sum: self.sum,
            mean: self.mean,
            variance: self.variance(),
            min: self.min(),
            max: self.max(),
        }
    }
}

/// A serializable snapshot of a `Statistic`, for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticSummary {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub variance: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// A time-weighted statistic over a piecewise-constant value.  Each update
/// closes the interval during which the previous value held, adding
/// `value * elapsed` to the integral.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeStatistic {
    name: String,
    start_time: f64,
    last_time: f64,
    value: f64,
    integral: f64,
    max: f64,
    updates: usize,
}

impl TimeStatistic {
    pub fn new(name: &str, start_time: f64) -> Self {
        Self {
            name: name.to_string(),
            start_time,
            last_time: start_time,
            value: 0.0,
            integral: 0.0,
            max: 0.0,
            updates: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the value observed from `time` onwards.
    pub fn accumulate(&mut self, value: f64, time: f64) -> Result<(), SimulationError> {
        if time < self.last_time || !time.is_finite() {
            return Err(SimulationError::NonMonotonicTime {
                name: self.name.clone(),
                last: self.last_time,
                time,
            });
        }
        self.integral += self.value * (time - self.last_time);
        self.last_time = time;
        self.value = value;
        self.max = self.max.max(value);
        self.updates += 1;
        Ok(())
    }

    /// The value currently held.
    pub fn current(&self) -> f64 {
        self.value
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn updates(&self) -> usize {
        self.updates
    }

    /// The integral of the value from the start time to `end_time`, with
    /// the current value assumed to hold until `end_time`.
    pub fn integral_until(&self, end_time: f64) -> f64 {
        self.integral + self.value * (end_time - self.last_time).max(0.0)
    }

    /// The time-weighted mean over `[start_time, end_time]`.  With no
    /// elapsed time the current value is returned.
    pub fn mean_until(&self, end_time: f64) -> f64 {
        let elapsed = end_time - self.start_time;
        if elapsed > 0.0 {
            self.integral_until(end_time) / elapsed
        } else {
            self.value
        }
    }
}
