use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use super::model_trait::{Reportable, SimComponent};
use super::{Component, ComponentRecord, WaitQueue};
use crate::input_modeling::VariateGenerator;
use crate::simulator::{ActorId, Process};
use crate::utils::errors::SimulationError;
use crate::utils::validate_delay;

/// A resource has a fixed number of units, each serving one entity at a
/// time.  An entity that finds the resource busy is expected to wait in the
/// linked `WaitQueue`; `release` hands the freed unit to the head of that
/// line, preserving FIFO fairness among waiters.  Service durations are
/// drawn from the injected generator and tallied as the duration statistic,
/// while the persistent statistic is the number of units in use.
pub struct Resource {
    component: Component,
    capacity: usize,
    in_use: Mutex<usize>,
    queue: Option<Arc<WaitQueue>>,
    service_time: Mutex<Box<dyn VariateGenerator>>,
}

impl Resource {
    pub fn new<G>(name: &str, capacity: usize, service_time: G) -> Result<Self, SimulationError>
    where
        G: VariateGenerator + 'static,
    {
        if capacity == 0 {
            return Err(SimulationError::InvalidCapacity {
                name: name.to_string(),
            });
        }
        Ok(Self {
            component: Component::new(name, "service time", "units in use"),
            capacity,
            in_use: Mutex::new(0),
            queue: None,
            service_time: Mutex::new(Box::new(service_time)),
        })
    }

    pub fn with_queue(mut self, queue: Arc<WaitQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    pub fn store_records(mut self, store_records: bool) -> Self {
        self.component = self.component.store_records(store_records);
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn in_use(&self) -> usize {
        *self.in_use.lock()
    }

    pub fn is_busy(&self) -> bool {
        self.in_use() == self.capacity
    }

    pub fn queue(&self) -> Option<&Arc<WaitQueue>> {
        self.queue.as_ref()
    }

    /// Seize a unit for the calling entity and hold it for a sampled
    /// service time.  Returns the service time once the entity has been
    /// resumed.  Callers must queue first: utilizing a busy resource is a
    /// protocol violation.
    pub fn utilize(&self, process: &mut Process) -> Result<f64, SimulationError> {
        let director = self.component.enter()?;
        if self.is_busy() {
            return Err(director.reject(SimulationError::ResourceBusy {
                name: self.component.name(),
            }));
        }
        let duration = self
            .service_time
            .lock()
            .generate()
            .and_then(validate_delay)
            .map_err(|error| director.reject(error))?;
        let now = director.now();
        let in_use = {
            let mut in_use = self.in_use.lock();
            *in_use += 1;
            *in_use
        };
        self.component.tally(duration)?;
        self.component.accumulate(in_use as f64, now)?;
        trace!(resource = %self.component.name(), actor = %process.name(), now, duration, "service start");
        self.component.record(now, "Service Start", process.name());
        self.component.emit_move(&director, process.id());
        process.hold(duration)?;
        Ok(duration)
    }

    /// Return the unit held by the calling entity.  If entities are waiting
    /// in the linked queue, the head is dequeued and activated at the
    /// current time so that it retries immediately; it is returned.
    pub fn release(&self, process: &Process) -> Result<Option<ActorId>, SimulationError> {
        let director = self.component.enter()?;
        let now = director.now();
        let in_use = {
            let mut in_use = self.in_use.lock();
            if *in_use == 0 {
                None
            } else {
                *in_use -= 1;
                Some(*in_use)
            }
        };
        let in_use = match in_use {
            Some(in_use) => in_use,
            None => {
                return Err(director.reject(SimulationError::ResourceIdle {
                    name: self.component.name(),
                }))
            }
        };
        self.component.accumulate(in_use as f64, now)?;
        trace!(resource = %self.component.name(), actor = %process.name(), now, "release");
        self.component.record(now, "Release", process.name());
        match &self.queue {
            Some(queue) if !queue.is_empty() => {
                let next = queue.dequeue_next()?;
                director.reschedule(next, now)?;
                Ok(Some(next))
            }
            _ => Ok(None),
        }
    }
}

impl Reportable for Resource {
    fn status(&self) -> String {
        match self.in_use() {
            0 => String::from("Idle"),
            in_use if in_use == self.capacity => String::from("Busy"),
            in_use => format!("{}/{} in use", in_use, self.capacity),
        }
    }

    fn records(&self) -> Vec<ComponentRecord> {
        self.component.records()
    }
}

impl SimComponent for Resource {
    fn component(&self) -> &Component {
        &self.component
    }

    fn kind(&self) -> &'static str {
        "Resource"
    }
}
