//! Simulated entities (actors) are ordinary sequential procedures that
//! suspend themselves at explicit points.  Each actor body runs on its own
//! execution thread, but the hand-off protocol guarantees that only one body
//! (or the director's bookkeeping) is ever live: the director resumes an
//! actor and then blocks until the actor yields back or its body returns.

use std::fmt;
use std::sync::mpsc::{Receiver, Sender};

use serde::{Deserialize, Serialize};

use super::trace::TraceEvent;
use super::Director;
use crate::utils::errors::SimulationError;

/// The process-wide unique identifier of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub(crate) u64);

impl ActorId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of an actor.
///
/// `Fresh` actors have been created but not placed on the agenda.
/// `Scheduled` actors are on the agenda, whether or not their body has
/// started.  `Suspended` actors have yielded without a pending activation,
/// and wait for another entity to reschedule them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorState {
    Fresh,
    Scheduled,
    Active,
    Suspended,
    Terminated,
}

/// The behavior of an actor.  Returning from the body is an implicit
/// terminal yield, and an error return aborts the whole run.
pub type Body = Box<dyn FnOnce(&mut Process) -> Result<(), SimulationError> + Send + 'static>;

pub(crate) enum Handoff {
    Yielded,
    Finished(Result<(), SimulationError>),
}

/// The handle through which an actor body interacts with the simulation.
/// A `Process` is only ever handed to the body it was created for.
pub struct Process {
    id: ActorId,
    name: String,
    director: Director,
    resume: Receiver<()>,
    handoff: Sender<Handoff>,
}

impl Process {
    pub(crate) fn new(
        id: ActorId,
        name: String,
        director: Director,
        resume: Receiver<()>,
        handoff: Sender<Handoff>,
    ) -> Self {
        Self {
            id,
            name,
            director,
            resume,
            handoff,
        }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn director(&self) -> &Director {
        &self.director
    }

    /// The current simulation time.
    pub fn now(&self) -> f64 {
        self.director.now()
    }

    /// The time of the pending activation, or of the current one while the
    /// body runs without having scheduled itself again.
    pub fn activation_time(&self) -> Option<f64> {
        self.director.activation_time(self.id)
    }

    /// Place this actor on the agenda at `now + delay`, replacing any
    /// activation requested earlier.  Control is kept until the next yield.
    pub fn schedule(&mut self, delay: f64) -> Result<(), SimulationError> {
        self.director.schedule_after(self.id, delay)
    }

    /// Suspend the body at this point and return control to the director.
    ///
    /// A non-terminal yield blocks until the director resumes this actor,
    /// at the time of its latest `schedule` call or when another entity
    /// reschedules it.  A terminal yield marks the actor terminated and
    /// removes any pending activation.  The body must return right after
    /// it: any later call into the director or a component fails with
    /// `ActorTerminated` and aborts the run.
    pub fn yield_to_director(&mut self, terminal: bool) -> Result<(), SimulationError> {
        if terminal {
            return self.director.terminate(self.id);
        }
        self.director.ensure_active(self.id)?;
        self.handoff
            .send(Handoff::Yielded)
            .map_err(|_| SimulationError::Shutdown)?;
        self.resume.recv().map_err(|_| SimulationError::Shutdown)
    }

    /// Schedule after `delay` and yield.
    pub fn hold(&mut self, delay: f64) -> Result<(), SimulationError> {
        self.schedule(delay)?;
        self.yield_to_director(false)
    }

    /// Yield without a pending activation.
    pub fn passivate(&mut self) -> Result<(), SimulationError> {
        self.yield_to_director(false)
    }

    /// Create another actor, first activated after `delay`.
    pub fn spawn<F>(&self, name: &str, delay: f64, body: F) -> Result<ActorId, SimulationError>
    where
        F: FnOnce(&mut Process) -> Result<(), SimulationError> + Send + 'static,
    {
        self.director.spawn(name, delay, body)
    }

    /// Write a text line to the trace sink.
    pub fn trace(&self, text: &str) {
        self.director.emit(TraceEvent::Note {
            time: self.now(),
            subject: self.name.clone(),
            text: text.to_string(),
        });
    }

    fn finish(self, result: Result<(), SimulationError>) {
        // A closed channel means the director has already shut down.
        let _ = self.handoff.send(Handoff::Finished(result));
    }
}

/// Entry point of an actor thread: wait for the first resume, run the body,
/// and report its outcome as the final hand-off.  A panicking body drops its
/// `Process`, which the director observes as a disconnected channel.
pub(crate) fn run_actor(mut process: Process, body: Body) {
    if process.resume.recv().is_err() {
        return;
    }
    let result = body(&mut process);
    process.finish(result);
}
