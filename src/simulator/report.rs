use std::fmt;

use serde::{Deserialize, Serialize};

use crate::output_analysis::StatisticSummary;
use crate::utils::errors::SimulationError;

/// Why the run loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Termination {
    /// The agenda ran empty - the normal end of a run.
    Exhausted,
    /// `Director::stop` was requested.
    Stopped,
    /// The next activation was past the configured end time.
    EndTime,
    /// The configured number of activations was reached.
    ActivationLimit,
}

/// One hand-off from the director to an actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dispatch {
    pub actor: String,
    pub time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentReport {
    pub id: u64,
    pub name: String,
    pub kind: String,
    pub status: String,
    pub duration: StatisticSummary,
    pub persistent_mean: f64,
    pub persistent_max: f64,
}

/// The end-of-run statistical report of a simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub end_time: f64,
    pub activations: usize,
    pub termination: Termination,
    pub components: Vec<ComponentReport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dispatches: Vec<Dispatch>,
}

impl Report {
    pub fn component(&self, name: &str) -> Option<&ComponentReport> {
        self.components
            .iter()
            .find(|component| component.name == name)
    }

    pub fn to_json(&self) -> Result<String, SimulationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "simulation ended at {:.4} after {} activations ({:?})",
            self.end_time, self.activations, self.termination
        )?;
        writeln!(
            f,
            "{:<20} {:<10} {:>8} {:>12} {:>12} {:>12}",
            "component", "kind", "count", "mean", "variance", "time-mean"
        )?;
        for component in &self.components {
            writeln!(
                f,
                "{:<20} {:<10} {:>8} {:>12.4} {:>12.4} {:>12.4}",
                component.name,
                component.kind,
                component.duration.count,
                component.duration.mean,
                component.duration.variance,
                component.persistent_mean
            )?;
        }
        Ok(())
    }
}
