use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use super::model_trait::{Reportable, SimComponent};
use super::{Component, ComponentRecord};
use crate::input_modeling::VariateGenerator;
use crate::simulator::{ActorId, Body, Director, Process};
use crate::utils::errors::SimulationError;
use crate::utils::validate_delay;

type EntityFactory = Box<dyn Fn(usize) -> Body + Send + Sync>;

#[derive(Debug, Default)]
struct Arrivals {
    issued: usize,
    arrived: usize,
}

/// The source generates up to `limit` entities.  Each arrival is scheduled
/// after an inter-arrival delay drawn from the generator; the next arrival
/// is issued when the previous one is first activated, so arrivals form a
/// chain starting from `Director::start`.  Entities are named
/// `"{source}-{n}"`, and their bodies come from the factory, called with
/// the 1-based arrival number.
pub struct Source {
    component: Component,
    limit: usize,
    interarrival: Mutex<Box<dyn VariateGenerator>>,
    factory: EntityFactory,
    arrivals: Mutex<Arrivals>,
}

impl Source {
    pub fn new<G, F, B>(name: &str, limit: usize, interarrival: G, factory: F) -> Self
    where
        G: VariateGenerator + 'static,
        F: Fn(usize) -> B + Send + Sync + 'static,
        B: FnOnce(&mut Process) -> Result<(), SimulationError> + Send + 'static,
    {
        Self {
            component: Component::new(name, "inter-arrival time", "arrivals"),
            limit,
            interarrival: Mutex::new(Box::new(interarrival)),
            factory: Box::new(move |n| Box::new(factory(n)) as Body),
            arrivals: Mutex::new(Arrivals::default()),
        }
    }

    pub fn store_records(mut self, store_records: bool) -> Self {
        self.component = self.component.store_records(store_records);
        self
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Arrivals scheduled so far, including one still pending.
    pub fn issued(&self) -> usize {
        self.arrivals.lock().issued
    }

    /// Arrivals that have entered the simulation.
    pub fn arrived(&self) -> usize {
        self.arrivals.lock().arrived
    }

    /// Schedule the next arrival, unless the limit has been reached.
    pub(crate) fn issue(
        self: &Arc<Self>,
        director: &Director,
    ) -> Result<Option<ActorId>, SimulationError> {
        self.component.enter()?;
        let n = self.issued() + 1;
        if n > self.limit {
            return Ok(None);
        }
        let delay = self
            .interarrival
            .lock()
            .generate()
            .and_then(validate_delay)
            .map_err(|error| director.reject(error))?;
        self.component.tally(delay)?;
        let name = format!("{}-{}", self.component.name(), n);
        let body = (self.factory)(n);
        let actor = director.spawn_from(Some(Arc::clone(self)), name.clone(), delay, body)?;
        self.arrivals.lock().issued = n;
        trace!(source = %self.component.name(), entity = %name, delay, "issue");
        self.component.record(director.now(), "Issue", &name);
        Ok(Some(actor))
    }

    /// An issued entity has been activated for the first time.
    pub(crate) fn arrive(
        self: &Arc<Self>,
        director: &Director,
        name: &str,
    ) -> Result<(), SimulationError> {
        self.component.enter()?;
        let now = director.now();
        let arrived = {
            let mut arrivals = self.arrivals.lock();
            arrivals.arrived += 1;
            arrivals.arrived
        };
        self.component.accumulate(arrived as f64, now)?;
        self.component.record(now, "Arrival", name);
        self.issue(director)?;
        Ok(())
    }
}

impl Reportable for Source {
    fn status(&self) -> String {
        format!("Issued {}/{}", self.issued(), self.limit)
    }

    fn records(&self) -> Vec<ComponentRecord> {
        self.component.records()
    }
}

impl SimComponent for Source {
    fn component(&self) -> &Component {
        &self.component
    }

    fn kind(&self) -> &'static str {
        "Source"
    }

    /// Schedule the first arrival.
    fn initialize(self: Arc<Self>, director: &Director) -> Result<(), SimulationError> {
        self.issue(director).map(|_| ())
    }
}
