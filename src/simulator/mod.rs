//! The simulator module provides the mechanics to orchestrate entities and
//! components via process-interaction discrete event simulation.  The
//! `Director` owns the simulation clock and the agenda of pending
//! activations, and runs the hand-off loop: it removes the earliest
//! activation, advances the clock to it, and transfers control to that
//! actor until the actor yields or its body returns.
//!
//! Exactly one actor body, or the director's own bookkeeping, is live at any
//! instant.  The clock, the agenda, and every component statistic are only
//! mutated by the thread currently holding that rendezvous, so statistics
//! are free of races and a run is fully determined by its inputs.
//! Activations with equal times are served in the order they were
//! scheduled (FIFO).

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::Ordering;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

mod agenda;
pub mod config;
mod kernel;
pub mod process;
pub mod report;
pub mod trace;

pub use self::config::DirectorConfig;
pub use self::process::{ActorId, ActorState, Body, Process};
pub use self::report::{ComponentReport, Dispatch, Report, Termination};
pub use self::trace::{LogTrace, NullTrace, RecordingTrace, TraceEvent, TraceSink};

use self::kernel::{ActorLink, ActorSlot, Kernel, Next, Phase};
use self::process::{run_actor, Handoff};
use crate::input_modeling::{ContinuousRandomVariable, Stochastic, UniformRNG};
use crate::models::identity::next_id;
use crate::models::{SimComponent, Source};
use crate::utils::errors::SimulationError;
use crate::utils::validate_delay;

/// The `Director` is the core of procsim.  It is a cheap, cloneable handle:
/// entity bodies and components hold clones of it to reach the clock and
/// the agenda.  A director runs a single simulation, once.
#[derive(Clone)]
pub struct Director {
    kernel: Arc<Kernel>,
}

/// A non-owning director handle, held by components so that the director
/// and its components do not keep each other alive.
#[derive(Clone, Default)]
pub struct WeakDirector {
    kernel: Weak<Kernel>,
}

impl WeakDirector {
    pub fn upgrade(&self) -> Option<Director> {
        self.kernel.upgrade().map(|kernel| Director { kernel })
    }
}

impl fmt::Debug for WeakDirector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakDirector")
            .field("alive", &(self.kernel.strong_count() > 0))
            .finish()
    }
}

impl fmt::Debug for Director {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Director")
            .field("config", &self.kernel.config)
            .field("now", &self.now())
            .finish()
    }
}

impl Default for Director {
    fn default() -> Self {
        Self::new(DirectorConfig::default())
    }
}

impl Director {
    pub fn new(config: DirectorConfig) -> Self {
        Self::with_trace(config, Arc::new(NullTrace))
    }

    /// Create a director that writes animation and trace events to `trace`.
    pub fn with_trace(config: DirectorConfig, trace: Arc<dyn TraceSink>) -> Self {
        Self {
            kernel: Arc::new(Kernel::new(config, trace)),
        }
    }

    pub fn config(&self) -> &DirectorConfig {
        &self.kernel.config
    }

    pub fn downgrade(&self) -> WeakDirector {
        WeakDirector {
            kernel: Arc::downgrade(&self.kernel),
        }
    }

    /// The current simulation time.
    pub fn now(&self) -> f64 {
        self.kernel.schedule.lock().clock
    }

    pub fn is_running(&self) -> bool {
        self.kernel.schedule.lock().phase == Phase::Running
    }

    /// Register a single component, binding it to this director.
    pub fn add_component<C: SimComponent + 'static>(
        &self,
        component: Arc<C>,
    ) -> Result<(), SimulationError> {
        let component: Arc<dyn SimComponent> = component;
        self.add_components(vec![component])
    }

    /// Register the components that make up the model, binding each of
    /// them to this director.  Registration is only possible before
    /// `start`, and is all or nothing: if any component is already bound,
    /// none of them is registered.
    pub fn add_components(
        &self,
        components: Vec<Arc<dyn SimComponent>>,
    ) -> Result<(), SimulationError> {
        {
            let mut schedule = self.kernel.schedule.lock();
            if schedule.phase != Phase::Assembling {
                return Err(schedule.reject(SimulationError::ComponentsAfterStart));
            }
        }
        let mut seen = HashSet::new();
        for component in &components {
            let core = component.component();
            if core.is_bound() || !seen.insert(core.id()) {
                return Err(core.fail(SimulationError::DirectorAlreadyBound { name: core.name() }));
            }
        }
        for component in &components {
            component.component().bind(self)?;
        }
        self.kernel.components.lock().extend(components);
        Ok(())
    }

    pub fn components(&self) -> Vec<Arc<dyn SimComponent>> {
        self.kernel.components.lock().clone()
    }

    /// Create an actor whose first activation is `delay` after the current
    /// time.  Before `start` this seeds the first wave of entities; during a
    /// run only the active entity (or the director) may spawn.
    pub fn spawn<F>(&self, name: &str, delay: f64, body: F) -> Result<ActorId, SimulationError>
    where
        F: FnOnce(&mut Process) -> Result<(), SimulationError> + Send + 'static,
    {
        self.spawn_from(None, name.to_string(), delay, Box::new(body))
    }

    pub(crate) fn spawn_from(
        &self,
        origin: Option<Arc<Source>>,
        name: String,
        delay: f64,
        body: Body,
    ) -> Result<ActorId, SimulationError> {
        let mut schedule = self.kernel.enter()?;
        let delay = match validate_delay(delay) {
            Ok(delay) => delay,
            Err(error) => return Err(schedule.reject(error)),
        };
        let actor = ActorId(next_id());
        schedule
            .actors
            .insert(actor, ActorSlot::new(name, body, origin));
        let time = schedule.clock + delay;
        schedule.place(actor, time)?;
        Ok(actor)
    }

    /// Place an actor on the agenda at the absolute time `time`, replacing
    /// any pending activation.  Times before the current clock are rejected,
    /// as are actors that have terminated.
    pub fn reschedule(&self, actor: ActorId, time: f64) -> Result<(), SimulationError> {
        self.kernel.enter()?.place(actor, time)
    }

    pub(crate) fn schedule_after(&self, actor: ActorId, delay: f64) -> Result<(), SimulationError> {
        let mut schedule = self.kernel.enter()?;
        let delay = match validate_delay(delay) {
            Ok(delay) => delay,
            Err(error) => return Err(schedule.reject(error)),
        };
        let time = schedule.clock + delay;
        schedule.place(actor, time)
    }

    /// Withdraw the pending activation of an actor, if it has one.  The
    /// agenda entry is left in place and skipped when it reaches the front.
    pub fn cancel(&self, actor: ActorId) -> Result<bool, SimulationError> {
        self.kernel.enter()?.cancel(actor)
    }

    /// Request the run loop to stop after the current hand-off.
    pub fn stop(&self) {
        self.kernel.stop.store(true, Ordering::SeqCst);
    }

    pub fn actor_state(&self, actor: ActorId) -> Option<ActorState> {
        self.kernel.schedule.lock().state_of(actor)
    }

    pub fn actor_name(&self, actor: ActorId) -> Option<String> {
        self.kernel
            .schedule
            .lock()
            .actors
            .get(&actor)
            .map(|slot| slot.name.clone())
    }

    pub(crate) fn activation_time(&self, actor: ActorId) -> Option<f64> {
        self.kernel
            .schedule
            .lock()
            .actors
            .get(&actor)
            .and_then(|slot| slot.pending.map(|(_, time)| time).or(slot.activated_at))
    }

    pub(crate) fn terminate(&self, actor: ActorId) -> Result<(), SimulationError> {
        self.kernel.enter()?.terminate(actor)
    }

    pub(crate) fn ensure_active(&self, actor: ActorId) -> Result<(), SimulationError> {
        self.kernel.enter()?.ensure_active(actor)
    }

    /// Fails unless the calling thread may currently change the simulation
    /// state.  Components call this before every mutation.
    pub fn check_rendezvous(&self) -> Result<(), SimulationError> {
        self.kernel.enter().map(|_| ())
    }

    /// Record `error` as the fault of the running simulation, which aborts
    /// the run after the current hand-off.  The error is handed back.
    pub fn reject(&self, error: SimulationError) -> SimulationError {
        self.kernel.schedule.lock().reject(error)
    }

    /// A random variate stream over `distribution`.  Each call draws an
    /// independent stream, seeded from the configured seed, so a model
    /// built in the same order reproduces exactly.
    pub fn stochastic(&self, distribution: ContinuousRandomVariable) -> Stochastic {
        let stream = self.kernel.streams.fetch_add(1, Ordering::Relaxed);
        Stochastic::new(
            distribution,
            UniformRNG::seeded(self.kernel.config.seed.wrapping_add(stream)),
        )
    }

    pub(crate) fn emit(&self, event: TraceEvent) {
        self.kernel.trace.emit(event);
    }

    /// Run the simulation.  Every registered component is initialized
    /// (sources schedule their first arrival), then activations are handed
    /// off in time order until the agenda is exhausted or another
    /// termination condition is met.  Any configuration or protocol error
    /// aborts the run and is returned.
    pub fn start(&self) -> Result<Report, SimulationError> {
        self.kernel.config.clone().validate()?;
        {
            let mut schedule = self.kernel.schedule.lock();
            if schedule.phase != Phase::Assembling {
                return Err(SimulationError::AlreadyStarted);
            }
            schedule.phase = Phase::Running;
            schedule.owner = Some(thread::current().id());
        }
        info!(
            components = self.kernel.components.lock().len(),
            "starting simulation"
        );
        let outcome = self.run();
        let parked = self.shutdown();
        match outcome {
            Ok(termination) => {
                if parked > 0 {
                    warn!(parked, "simulation ended with suspended actors");
                }
                let report = self.report(termination);
                info!("{}", report);
                Ok(report)
            }
            Err(error) => {
                warn!(%error, "simulation aborted");
                Err(error)
            }
        }
    }

    fn run(&self) -> Result<Termination, SimulationError> {
        let config = &self.kernel.config;
        let deadline = config
            .wall_clock_timeout()
            .map(|timeout| (timeout, Instant::now() + timeout));
        for component in self.components() {
            component.initialize(self)?;
        }
        loop {
            if let Some(fault) = self.kernel.schedule.lock().fault.take() {
                return Err(fault);
            }
            if self.kernel.stop.load(Ordering::SeqCst) {
                return Ok(Termination::Stopped);
            }
            if let Some((timeout, at)) = deadline {
                if Instant::now() >= at {
                    return Err(self.reject(SimulationError::WallClockTimeout(timeout)));
                }
            }
            let next = {
                let mut schedule = self.kernel.schedule.lock();
                if let Some(max_activations) = config.max_activations {
                    if schedule.activations >= max_activations {
                        return Ok(Termination::ActivationLimit);
                    }
                }
                schedule.next(config.end_time, config.record_dispatches)
            };
            match next {
                Next::Exhausted => return Ok(Termination::Exhausted),
                Next::EndTime => return Ok(Termination::EndTime),
                Next::Dispatch {
                    actor,
                    name,
                    time,
                    first,
                    origin,
                } => {
                    debug!(actor = %name, id = actor.0, time, first, "dispatching");
                    self.dispatch(actor, &name, first, origin, deadline)?;
                }
            }
        }
    }

    /// Hand control to `actor` and block until it hands control back.
    fn dispatch(
        &self,
        actor: ActorId,
        name: &str,
        first: bool,
        origin: Option<Arc<Source>>,
        deadline: Option<(Duration, Instant)>,
    ) -> Result<(), SimulationError> {
        if first {
            if let Some(source) = origin {
                source.arrive(self, name)?;
            }
            self.emit(TraceEvent::Create {
                time: self.now(),
                actor: actor.0,
                name: name.to_string(),
            });
            self.launch(actor, name)?;
        }
        let (resume, handoff) = {
            let mut schedule = self.kernel.schedule.lock();
            let link = schedule
                .actors
                .get_mut(&actor)
                .and_then(|slot| slot.link.as_mut())
                .and_then(|link| {
                    link.handoff
                        .take()
                        .map(|handoff| (link.resume.clone(), handoff, link.thread_id))
                });
            let (resume, handoff, thread_id) = match link {
                Some(link) => link,
                None => {
                    return Err(schedule.reject(SimulationError::ActorNotFound { actor: actor.0 }))
                }
            };
            schedule.owner = Some(thread_id);
            (resume, handoff)
        };
        let outcome = match resume.send(()) {
            Err(_) => Err(RecvTimeoutError::Disconnected),
            Ok(()) => match deadline {
                Some((_, at)) => handoff.recv_timeout(at.saturating_duration_since(Instant::now())),
                None => handoff.recv().map_err(|_| RecvTimeoutError::Disconnected),
            },
        };
        let mut schedule = self.kernel.schedule.lock();
        schedule.owner = Some(thread::current().id());
        match outcome {
            Ok(Handoff::Yielded) => {
                if let Some(link) = schedule
                    .actors
                    .get_mut(&actor)
                    .and_then(|slot| slot.link.as_mut())
                {
                    link.handoff = Some(handoff);
                }
                schedule.settle(actor);
                Ok(())
            }
            Ok(Handoff::Finished(result)) => {
                let slot = schedule.retire(actor);
                let time = schedule.clock;
                drop(schedule);
                if let Some(thread) = slot
                    .and_then(|slot| slot.link)
                    .and_then(|link| link.thread)
                {
                    // The actor has sent its last hand-off and is exiting.
                    let _ = thread.join();
                }
                self.emit(TraceEvent::Destroy {
                    time,
                    actor: actor.0,
                });
                result.map_err(|error| self.reject(error))
            }
            Err(RecvTimeoutError::Timeout) => {
                let timeout = deadline
                    .map(|(timeout, _)| timeout)
                    .unwrap_or_default();
                Err(schedule.reject(SimulationError::WallClockTimeout(timeout)))
            }
            Err(RecvTimeoutError::Disconnected) => {
                schedule.retire(actor);
                Err(schedule.reject(SimulationError::ActorPanicked {
                    name: name.to_string(),
                }))
            }
        }
    }

    /// Start the execution thread of an actor.  The thread parks until its
    /// first resume.
    fn launch(&self, actor: ActorId, name: &str) -> Result<(), SimulationError> {
        let body = {
            let mut schedule = self.kernel.schedule.lock();
            match schedule
                .actors
                .get_mut(&actor)
                .and_then(|slot| slot.body.take())
            {
                Some(body) => body,
                None => {
                    return Err(schedule.reject(SimulationError::ActorNotFound { actor: actor.0 }))
                }
            }
        };
        let (resume_tx, resume_rx) = mpsc::channel();
        let (handoff_tx, handoff_rx) = mpsc::channel();
        let process = Process::new(
            actor,
            name.to_string(),
            self.clone(),
            resume_rx,
            handoff_tx,
        );
        let thread = thread::Builder::new()
            .name(format!("actor {}", name))
            .spawn(move || run_actor(process, body))
            .map_err(|error| {
                self.reject(SimulationError::ThreadSpawn {
                    name: name.to_string(),
                    reason: error.to_string(),
                })
            })?;
        let thread_id = thread.thread().id();
        let mut schedule = self.kernel.schedule.lock();
        if let Some(slot) = schedule.actors.get_mut(&actor) {
            slot.started = true;
            slot.link = Some(ActorLink {
                resume: resume_tx,
                handoff: Some(handoff_rx),
                thread: Some(thread),
                thread_id,
            });
        }
        Ok(())
    }

    /// End the run.  Actors still parked are released: their pending yield
    /// fails with `Shutdown`, and their threads are detached.  Returns how
    /// many actors were parked.
    fn shutdown(&self) -> usize {
        let slots: Vec<ActorSlot> = {
            let mut schedule = self.kernel.schedule.lock();
            schedule.phase = Phase::Finished;
            schedule.owner = None;
            schedule.active = None;
            schedule.agenda.clear();
            schedule.actors.drain().map(|(_, slot)| slot).collect()
        };
        slots.iter().filter(|slot| slot.link.is_some()).count()
    }

    fn report(&self, termination: Termination) -> Report {
        let (end_time, activations, dispatches) = {
            let mut schedule = self.kernel.schedule.lock();
            (
                schedule.clock,
                schedule.activations,
                std::mem::take(&mut schedule.dispatches),
            )
        };
        let components = self
            .components()
            .iter()
            .map(|component| {
                component
                    .component()
                    .report(component.kind(), component.status(), end_time)
            })
            .collect();
        Report {
            end_time,
            activations,
            termination,
            components,
            dispatches,
        }
    }
}
