use std::sync::OnceLock;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::identity::Identity;
use super::ComponentRecord;
use crate::output_analysis::{Statistic, TimeStatistic};
use crate::simulator::{ActorId, ComponentReport, Director, TraceEvent, WeakDirector};
use crate::utils::errors::SimulationError;

/// A fixed position of a component, consumed only by animation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

impl Location {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug)]
struct Collectors {
    duration: Statistic,
    persistent: TimeStatistic,
    records: Vec<ComponentRecord>,
}

/// The capabilities shared by every model element: an identity, a
/// write-once location, a duration statistic, a persistent (time-weighted)
/// statistic, and a write-once binding to the owning director.
///
/// Statistics may only change while the caller holds the rendezvous, so
/// every mutation is checked against the bound director.
#[derive(Debug)]
pub struct Component {
    identity: Identity,
    location: OnceLock<Location>,
    director: OnceLock<WeakDirector>,
    store_records: bool,
    collectors: Mutex<Collectors>,
}

impl Component {
    pub fn new(name: &str, duration: &str, persistent: &str) -> Self {
        Self {
            identity: Identity::named(name),
            location: OnceLock::new(),
            director: OnceLock::new(),
            store_records: false,
            collectors: Mutex::new(Collectors {
                duration: Statistic::new(duration),
                persistent: TimeStatistic::new(persistent, 0.0),
                records: Vec::new(),
            }),
        }
    }

    pub fn store_records(mut self, store_records: bool) -> Self {
        self.store_records = store_records;
        self
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn id(&self) -> u64 {
        self.identity.id()
    }

    pub fn name(&self) -> String {
        self.identity.label()
    }

    /// Components are named at construction, so renaming always fails.
    pub fn set_name(&self, name: &str) -> Result<(), SimulationError> {
        self.identity
            .set_name(name)
            .map_err(|error| self.fail(error))
    }

    pub fn set_location(&self, location: Location) -> Result<(), SimulationError> {
        self.location
            .set(location)
            .map_err(|_| self.fail(SimulationError::LocationAlreadySet { name: self.name() }))
    }

    pub fn location(&self) -> Option<Location> {
        self.location.get().copied()
    }

    /// Bind this component to its director.  A component belongs to exactly
    /// one director for its whole life.
    pub fn bind(&self, director: &Director) -> Result<(), SimulationError> {
        self.director
            .set(director.downgrade())
            .map_err(|_| self.fail(SimulationError::DirectorAlreadyBound { name: self.name() }))
    }

    pub fn is_bound(&self) -> bool {
        self.director.get().is_some()
    }

    /// Configuration and protocol errors are fatal to the run of the bound
    /// director, if it is running.
    pub(crate) fn fail(&self, error: SimulationError) -> SimulationError {
        match self.director() {
            Ok(director) => director.reject(error),
            Err(_) => error,
        }
    }

    pub fn director(&self) -> Result<Director, SimulationError> {
        self.director
            .get()
            .and_then(WeakDirector::upgrade)
            .ok_or_else(|| SimulationError::DirectorUnbound { name: self.name() })
    }

    /// The bound director, provided the caller may change simulation state.
    pub fn enter(&self) -> Result<Director, SimulationError> {
        let director = self.director()?;
        director.check_rendezvous()?;
        Ok(director)
    }

    // Unbound components are still being assembled, and may be primed freely.
    fn guard(&self) -> Result<(), SimulationError> {
        match self.director.get().and_then(WeakDirector::upgrade) {
            Some(director) => director.check_rendezvous(),
            None => Ok(()),
        }
    }

    /// Tally an observed duration.
    pub fn tally(&self, value: f64) -> Result<(), SimulationError> {
        self.guard()?;
        self.collectors.lock().duration.tally(value);
        Ok(())
    }

    /// Set the persistent value observed from `time` onwards.
    pub fn accumulate(&self, value: f64, time: f64) -> Result<(), SimulationError> {
        self.guard()?;
        let result = self.collectors.lock().persistent.accumulate(value, time);
        result.map_err(|error| self.fail(error))
    }

    pub fn record(&self, time: f64, action: &str, subject: &str) {
        if self.store_records {
            self.collectors.lock().records.push(ComponentRecord {
                time,
                action: action.to_string(),
                subject: subject.to_string(),
            });
        }
    }

    pub fn records(&self) -> Vec<ComponentRecord> {
        self.collectors.lock().records.clone()
    }

    pub fn duration(&self) -> Statistic {
        self.collectors.lock().duration.clone()
    }

    pub fn persistent(&self) -> TimeStatistic {
        self.collectors.lock().persistent.clone()
    }

    /// Tell animation that `actor` is now at this component.
    pub fn emit_move(&self, director: &Director, actor: ActorId) {
        if let Some(location) = self.location() {
            director.emit(TraceEvent::Move {
                time: director.now(),
                actor: actor.value(),
                component: self.name(),
                to: location,
            });
        }
    }

    pub fn report(&self, kind: &str, status: String, end_time: f64) -> ComponentReport {
        let collectors = self.collectors.lock();
        ComponentReport {
            id: self.id(),
            name: self.name(),
            kind: kind.to_string(),
            status,
            duration: collectors.duration.summary(),
            persistent_mean: collectors.persistent.mean_until(end_time),
            persistent_max: collectors.persistent.max(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_is_set_once() {
        let component = Component::new("teller", "service", "busy");
        assert_eq![component.location(), None];
        component.set_location(Location::new(1.0, 2.0)).unwrap();
        assert_eq![
            component.set_location(Location::new(3.0, 4.0)),
            Err(SimulationError::LocationAlreadySet {
                name: String::from("teller")
            })
        ];
        assert_eq![component.location(), Some(Location::new(1.0, 2.0))];
    }

    #[test]
    fn director_is_bound_once() {
        let component = Component::new("teller", "service", "busy");
        assert![matches!(
            component.director(),
            Err(SimulationError::DirectorUnbound { .. })
        )];
        let director = Director::default();
        component.bind(&director).unwrap();
        assert![component.director().is_ok()];
        let other = Director::default();
        assert_eq![
            component.bind(&other),
            Err(SimulationError::DirectorAlreadyBound {
                name: String::from("teller")
            })
        ];
    }

    #[test]
    fn components_keep_their_name() {
        let component = Component::new("teller", "service", "busy");
        assert_eq![
            component.set_name("clerk"),
            Err(SimulationError::NameAlreadySet { id: component.id() })
        ];
        assert_eq![component.name(), "teller"];
    }

    #[test]
    fn records_are_opt_in() {
        let silent = Component::new("line", "wait", "length");
        silent.record(1.0, "Enqueue", "job-1");
        assert![silent.records().is_empty()];

        let recording = Component::new("line", "wait", "length").store_records(true);
        recording.record(1.0, "Enqueue", "job-1");
        assert_eq![recording.records().len(), 1];
        assert_eq![recording.records()[0].action, "Enqueue"];
    }

    #[test]
    fn report_summarizes_both_statistics() {
        let component = Component::new("teller", "service", "busy");
        component.tally(3.0).unwrap();
        component.tally(5.0).unwrap();
        component.accumulate(1.0, 0.0).unwrap();
        component.accumulate(0.0, 4.0).unwrap();
        let report = component.report("Resource", String::from("Idle"), 8.0);
        assert_eq![report.duration.count, 2];
        assert_eq![report.duration.mean, 4.0];
        assert_eq![report.persistent_mean, 0.5];
        assert_eq![report.persistent_max, 1.0];
    }
}
