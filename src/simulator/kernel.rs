use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};

use parking_lot::{Mutex, MutexGuard};

use super::agenda::Agenda;
use super::config::DirectorConfig;
use super::process::{ActorId, ActorState, Body, Handoff};
use super::report::Dispatch;
use super::trace::TraceSink;
use crate::models::{SimComponent, Source};
use crate::utils::errors::SimulationError;
use crate::utils::validate_time;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Assembling,
    Running,
    Finished,
}

/// The state shared by the director and the actor holding the rendezvous.
pub(crate) struct Kernel {
    pub(crate) config: DirectorConfig,
    pub(crate) schedule: Mutex<Schedule>,
    pub(crate) components: Mutex<Vec<Arc<dyn SimComponent>>>,
    pub(crate) trace: Arc<dyn TraceSink>,
    pub(crate) stop: AtomicBool,
    pub(crate) streams: AtomicU64,
}

impl Kernel {
    pub(crate) fn new(config: DirectorConfig, trace: Arc<dyn TraceSink>) -> Self {
        Self {
            config,
            schedule: Mutex::new(Schedule::default()),
            components: Mutex::new(Vec::new()),
            trace,
            stop: AtomicBool::new(false),
            streams: AtomicU64::new(0),
        }
    }

    /// Lock the schedule for a mutation.  While running, only the thread
    /// holding the rendezvous may do so, and an actor that has made its
    /// terminal yield no longer holds it.
    pub(crate) fn enter(&self) -> Result<MutexGuard<'_, Schedule>, SimulationError> {
        let mut schedule = self.schedule.lock();
        let phase = schedule.phase;
        let holds_rendezvous = schedule.owner == Some(thread::current().id());
        match phase {
            Phase::Assembling => Ok(schedule),
            Phase::Finished => Err(SimulationError::Shutdown),
            Phase::Running if !holds_rendezvous => {
                Err(schedule.reject(SimulationError::RendezvousViolation))
            }
            Phase::Running => match schedule.terminated_active() {
                Some(actor) => {
                    Err(schedule.reject(SimulationError::ActorTerminated { actor: actor.0 }))
                }
                None => Ok(schedule),
            },
        }
    }
}

pub(crate) struct ActorLink {
    pub(crate) resume: Sender<()>,
    pub(crate) handoff: Option<Receiver<Handoff>>,
    pub(crate) thread: Option<JoinHandle<()>>,
    pub(crate) thread_id: ThreadId,
}

pub(crate) struct ActorSlot {
    pub(crate) name: String,
    pub(crate) state: ActorState,
    pub(crate) pending: Option<(u64, f64)>,
    pub(crate) activated_at: Option<f64>,
    pub(crate) started: bool,
    pub(crate) body: Option<Body>,
    pub(crate) link: Option<ActorLink>,
    pub(crate) origin: Option<Arc<Source>>,
}

impl ActorSlot {
    pub(crate) fn new(name: String, body: Body, origin: Option<Arc<Source>>) -> Self {
        Self {
            name,
            state: ActorState::Fresh,
            pending: None,
            activated_at: None,
            started: false,
            body: Some(body),
            link: None,
            origin,
        }
    }
}

/// The next step of the run loop.
pub(crate) enum Next {
    Dispatch {
        actor: ActorId,
        name: String,
        time: f64,
        first: bool,
        origin: Option<Arc<Source>>,
    },
    Exhausted,
    EndTime,
}

pub(crate) struct Schedule {
    pub(crate) phase: Phase,
    pub(crate) clock: f64,
    pub(crate) agenda: Agenda,
    pub(crate) actors: HashMap<ActorId, ActorSlot>,
    /// Ids of terminated actors.  Only the id is kept, never the body or
    /// its thread, so that a late `reschedule` is rejected with
    /// `ActorTerminated` instead of `ActorNotFound`.  It grows by one
    /// `u64` per entity and lives as long as the director.
    pub(crate) retired: HashSet<ActorId>,
    pub(crate) owner: Option<ThreadId>,
    /// The actor holding the rendezvous, `None` between hand-offs.
    pub(crate) active: Option<ActorId>,
    pub(crate) fault: Option<SimulationError>,
    pub(crate) activations: usize,
    pub(crate) dispatches: Vec<Dispatch>,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            phase: Phase::Assembling,
            clock: 0.0,
            agenda: Agenda::default(),
            actors: HashMap::new(),
            retired: HashSet::new(),
            owner: None,
            active: None,
            fault: None,
            activations: 0,
            dispatches: Vec::new(),
        }
    }
}

impl Schedule {
    /// Record the first fatal error of a running simulation, and hand the
    /// error back to the caller.
    pub(crate) fn reject(&mut self, error: SimulationError) -> SimulationError {
        if self.phase == Phase::Running && self.fault.is_none() {
            self.fault = Some(error.clone());
        }
        error
    }

    fn slot_state(&self, actor: ActorId) -> Result<ActorState, SimulationError> {
        if self.retired.contains(&actor) {
            return Ok(ActorState::Terminated);
        }
        self.actors
            .get(&actor)
            .map(|slot| slot.state)
            .ok_or(SimulationError::ActorNotFound { actor: actor.0 })
    }

    pub(crate) fn state_of(&self, actor: ActorId) -> Option<ActorState> {
        self.slot_state(actor).ok()
    }

    /// Place an actor on the agenda at an absolute time.  Any earlier
    /// pending activation of the actor goes stale.
    pub(crate) fn place(&mut self, actor: ActorId, time: f64) -> Result<(), SimulationError> {
        let state = match self.slot_state(actor) {
            Ok(state) => state,
            Err(error) => return Err(self.reject(error)),
        };
        if state == ActorState::Terminated {
            return Err(self.reject(SimulationError::ActorTerminated { actor: actor.0 }));
        }
        if let Err(error) = validate_time(time, self.clock) {
            return Err(self.reject(error));
        }
        let seq = self.agenda.push(actor, time);
        if let Some(slot) = self.actors.get_mut(&actor) {
            slot.pending = Some((seq, time));
            if slot.state != ActorState::Active {
                slot.state = ActorState::Scheduled;
            }
        }
        Ok(())
    }

    /// Invalidate the pending activation of an actor, returning whether
    /// there was one.
    pub(crate) fn cancel(&mut self, actor: ActorId) -> Result<bool, SimulationError> {
        if let Err(error) = self.slot_state(actor) {
            return Err(self.reject(error));
        }
        Ok(match self.actors.get_mut(&actor) {
            Some(slot) => {
                let cancelled = slot.pending.take().is_some();
                if slot.state == ActorState::Scheduled {
                    slot.state = if slot.started {
                        ActorState::Suspended
                    } else {
                        ActorState::Fresh
                    };
                }
                cancelled
            }
            None => false,
        })
    }

    /// Fails unless `actor` is the one holding the rendezvous.
    fn check_active(&mut self, actor: ActorId) -> Result<(), SimulationError> {
        if self.active == Some(actor) {
            return Ok(());
        }
        let error = match self.slot_state(actor) {
            Ok(ActorState::Terminated) => SimulationError::ActorTerminated { actor: actor.0 },
            Ok(_) => SimulationError::RendezvousViolation,
            Err(error) => error,
        };
        Err(self.reject(error))
    }

    pub(crate) fn terminate(&mut self, actor: ActorId) -> Result<(), SimulationError> {
        self.check_active(actor)?;
        if let Some(slot) = self.actors.get_mut(&actor) {
            slot.state = ActorState::Terminated;
            slot.pending = None;
        }
        Ok(())
    }

    pub(crate) fn ensure_active(&mut self, actor: ActorId) -> Result<(), SimulationError> {
        self.check_active(actor)
    }

    /// The active actor, if it has already made its terminal yield.
    fn terminated_active(&self) -> Option<ActorId> {
        let actor = self.active?;
        match self.slot_state(actor) {
            Ok(ActorState::Terminated) => Some(actor),
            _ => None,
        }
    }

    fn is_current(&self, actor: ActorId, seq: u64) -> bool {
        self.actors
            .get(&actor)
            .and_then(|slot| slot.pending)
            .map(|(pending, _)| pending == seq)
            .unwrap_or(false)
    }

    /// Remove the earliest valid agenda entry, advance the clock to it, and
    /// mark its actor active.  Stale entries (cancelled or superseded) are
    /// discarded on the way.
    pub(crate) fn next(&mut self, end_time: Option<f64>, record: bool) -> Next {
        loop {
            let entry = match self.agenda.peek() {
                Some(entry) => *entry,
                None => return Next::Exhausted,
            };
            if !self.is_current(entry.actor, entry.seq) {
                self.agenda.pop();
                continue;
            }
            if let Some(end_time) = end_time {
                if entry.time > end_time {
                    self.clock = self.clock.max(end_time);
                    return Next::EndTime;
                }
            }
            self.agenda.pop();
            let slot = match self.actors.get_mut(&entry.actor) {
                Some(slot) => slot,
                None => continue,
            };
            slot.pending = None;
            slot.activated_at = Some(entry.time);
            slot.state = ActorState::Active;
            if record {
                self.dispatches.push(Dispatch {
                    actor: slot.name.clone(),
                    time: entry.time,
                });
            }
            let next = Next::Dispatch {
                actor: entry.actor,
                name: slot.name.clone(),
                time: entry.time,
                first: !slot.started,
                origin: slot.origin.clone(),
            };
            self.clock = entry.time;
            self.active = Some(entry.actor);
            self.activations += 1;
            return next;
        }
    }

    /// Settle an actor after it yielded back to the director.
    pub(crate) fn settle(&mut self, actor: ActorId) {
        if let Some(slot) = self.actors.get_mut(&actor) {
            if slot.state == ActorState::Active {
                slot.state = if slot.pending.is_some() {
                    ActorState::Scheduled
                } else {
                    ActorState::Suspended
                };
            }
        }
        self.active = None;
    }

    /// Drop a finished actor.  Only its id is kept, so that later
    /// scheduling attempts are rejected.
    pub(crate) fn retire(&mut self, actor: ActorId) -> Option<ActorSlot> {
        self.active = None;
        self.retired.insert(actor);
        self.actors.remove(&actor)
    }
}
