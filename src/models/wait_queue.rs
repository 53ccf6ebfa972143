use std::collections::VecDeque;

use parking_lot::Mutex;
use tracing::trace;

use super::model_trait::{Reportable, SimComponent};
use super::{Component, ComponentRecord};
use crate::simulator::{ActorId, Process};
use crate::utils::errors::SimulationError;

/// A FIFO line of suspended entities.  Each entity is stamped with the time
/// it entered, and its waiting time is tallied when it is dequeued.  The
/// persistent statistic is the queue length over time.
///
/// Entities waiting in line are not on the agenda; they must be resumed by
/// another entity, typically through `Resource::release`.
#[derive(Debug)]
pub struct WaitQueue {
    component: Component,
    waiting: Mutex<VecDeque<(ActorId, f64)>>,
}

impl WaitQueue {
    pub fn new(name: &str) -> Self {
        Self {
            component: Component::new(name, "waiting time", "queue length"),
            waiting: Mutex::new(VecDeque::new()),
        }
    }

    pub fn store_records(mut self, store_records: bool) -> Self {
        self.component = self.component.store_records(store_records);
        self
    }

    pub fn len(&self) -> usize {
        self.waiting.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.lock().is_empty()
    }

    /// The waiting entities, head first.
    pub fn waiting(&self) -> Vec<ActorId> {
        self.waiting.lock().iter().map(|(actor, _)| *actor).collect()
    }

    /// Append `actor` to the line, stamped with the current time.
    pub fn enqueue(&self, actor: ActorId) -> Result<(), SimulationError> {
        let director = self.component.enter()?;
        let now = director.now();
        let length = {
            let mut waiting = self.waiting.lock();
            waiting.push_back((actor, now));
            waiting.len()
        };
        self.component.accumulate(length as f64, now)?;
        let subject = director
            .actor_name(actor)
            .unwrap_or_else(|| actor.to_string());
        trace!(queue = %self.component.name(), actor = %subject, now, length, "enqueue");
        self.component.record(now, "Enqueue", &subject);
        Ok(())
    }

    /// Remove the head of the line, tallying how long it waited.  Check
    /// `is_empty` first: dequeuing an empty line is a protocol violation.
    pub fn dequeue_next(&self) -> Result<ActorId, SimulationError> {
        let director = self.component.enter()?;
        let now = director.now();
        let (head, length) = {
            let mut waiting = self.waiting.lock();
            let head = waiting.pop_front();
            (head, waiting.len())
        };
        let (actor, entered) = match head {
            Some(head) => head,
            None => {
                return Err(director.reject(SimulationError::EmptyQueue {
                    name: self.component.name(),
                }))
            }
        };
        self.component.tally(now - entered)?;
        self.component.accumulate(length as f64, now)?;
        let subject = director
            .actor_name(actor)
            .unwrap_or_else(|| actor.to_string());
        trace!(queue = %self.component.name(), actor = %subject, waited = now - entered, "dequeue");
        self.component.record(now, "Dequeue", &subject);
        Ok(actor)
    }

    /// Enqueue the calling entity and yield without a pending activation.
    pub fn wait_in(&self, process: &mut Process) -> Result<(), SimulationError> {
        self.enqueue(process.id())?;
        self.component.emit_move(process.director(), process.id());
        process.passivate()
    }
}

impl Reportable for WaitQueue {
    fn status(&self) -> String {
        format!("{} waiting", self.len())
    }

    fn records(&self) -> Vec<ComponentRecord> {
        self.component.records()
    }
}

impl SimComponent for WaitQueue {
    fn component(&self) -> &Component {
        &self.component
    }

    fn kind(&self) -> &'static str {
        "WaitQueue"
    }
}
