use parking_lot::Mutex;
use tracing::trace;

use super::model_trait::{Reportable, SimComponent};
use super::{Component, ComponentRecord};
use crate::simulator::Process;
use crate::utils::errors::SimulationError;

/// The sink removes entities from the simulation for good.  Each departure
/// is tallied as a zero-duration completion, and the persistent statistic
/// is the number of departures.
#[derive(Debug)]
pub struct Sink {
    component: Component,
    departures: Mutex<usize>,
}

impl Sink {
    pub fn new(name: &str) -> Self {
        Self {
            component: Component::new(name, "completion", "departures"),
            departures: Mutex::new(0),
        }
    }

    pub fn store_records(mut self, store_records: bool) -> Self {
        self.component = self.component.store_records(store_records);
        self
    }

    pub fn departures(&self) -> usize {
        *self.departures.lock()
    }

    /// Terminate the calling entity.  The body must return right after:
    /// `return sink.leave(process);`
    pub fn leave(&self, process: &mut Process) -> Result<(), SimulationError> {
        let director = self.component.enter()?;
        let now = director.now();
        let departures = {
            let mut departures = self.departures.lock();
            *departures += 1;
            *departures
        };
        self.component.tally(0.0)?;
        self.component.accumulate(departures as f64, now)?;
        trace!(sink = %self.component.name(), actor = %process.name(), now, "departure");
        self.component.record(now, "Departure", process.name());
        self.component.emit_move(&director, process.id());
        process.yield_to_director(true)
    }
}

impl Reportable for Sink {
    fn status(&self) -> String {
        format!("{} departed", self.departures())
    }

    fn records(&self) -> Vec<ComponentRecord> {
        self.component.records()
    }
}

impl SimComponent for Sink {
    fn component(&self) -> &Component {
        &self.component
    }

    fn kind(&self) -> &'static str {
        "Sink"
    }
}
