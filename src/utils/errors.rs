use std::time::Duration;

use thiserror::Error;

/// `SimulationError` enumerates all possible errors returned by procsim
///
/// Configuration errors and protocol violations are fatal to a running
/// simulation: the director records the first one as the run's fault and
/// aborts with it, even when the entity body that triggered it chose to
/// ignore the returned error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// Represents a second attempt to set a component location
    #[error("The location of component {name} has already been set")]
    LocationAlreadySet { name: String },

    /// Represents a second attempt to name a model element
    #[error("Model element {id} has already been named")]
    NameAlreadySet { id: u64 },

    /// Represents a second attempt to bind a component to a director
    #[error("Component {name} is already bound to a director")]
    DirectorAlreadyBound { name: String },

    /// Represents a component operation that needs a director, before
    /// registration
    #[error("Component {name} is not bound to a director")]
    DirectorUnbound { name: String },

    /// Represents a component registration after the simulation start
    #[error("Components cannot be registered after the simulation has started")]
    ComponentsAfterStart,

    /// Represents a second start of the same director
    #[error("The simulation has already been started")]
    AlreadyStarted,

    /// Represents a resource configured without any units
    #[error("Resource {name} must have a capacity of at least one unit")]
    InvalidCapacity { name: String },

    /// Represents an invalid director configuration
    #[error("Invalid simulation configuration: {0}")]
    InvalidConfiguration(String),

    /// Represents a resource utilization attempted while every unit is in use
    #[error("Resource {name} was utilized while busy")]
    ResourceBusy { name: String },

    /// Represents a resource release with no units in use
    #[error("Resource {name} was released with no units in use")]
    ResourceIdle { name: String },

    /// Represents a dequeue operation on an empty wait queue
    #[error("Wait queue {name} is empty")]
    EmptyQueue { name: String },

    /// Represents an activation scheduled before the current clock
    #[error("Cannot schedule an activation at time {time}, before the current time {clock}")]
    ScheduledInPast { time: f64, clock: f64 },

    /// Represents a negative or non-finite delay
    #[error("Delays must be finite and non-negative, but {delay} was requested")]
    InvalidDelay { delay: f64 },

    /// Represents a time statistic update that moves backwards in time
    #[error("Time statistic {name} cannot move from time {last} back to {time}")]
    NonMonotonicTime { name: String, last: f64, time: f64 },

    /// Represents an operation on an actor that has already terminated
    #[error("Actor {actor} has terminated and can no longer be scheduled")]
    ActorTerminated { actor: u64 },

    /// Represents an operation on an actor unknown to the director
    #[error("Actor {actor} cannot be found in the simulation")]
    ActorNotFound { actor: u64 },

    /// Represents a kernel mutation from a thread that does not hold the
    /// rendezvous
    #[error("Only the active entity or the director may change the simulation state")]
    RendezvousViolation,

    /// Represents an entity body that panicked
    #[error("The body of actor {name} panicked")]
    ActorPanicked { name: String },

    /// Represents an operation attempted after the simulation has finished
    #[error("The simulation has shut down")]
    Shutdown,

    /// Represents a run that exceeded its wall-clock budget
    #[error("The simulation exceeded its wall-clock timeout of {0:?}")]
    WallClockTimeout(Duration),

    /// Represents a failure to create the execution thread of an actor
    #[error("Failed to spawn the thread of actor {name}: {reason}")]
    ThreadSpawn { name: String, reason: String },

    /// Represents a failed serialization or deserialization
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Transparent Beta distribution errors
    #[error(transparent)]
    BetaError(#[from] rand_distr::BetaError),

    /// Transparent Exponential distribution errors
    #[error(transparent)]
    ExpError(#[from] rand_distr::ExpError),

    /// Transparent Gamma distribution errors
    #[error(transparent)]
    GammaError(#[from] rand_distr::GammaError),

    /// Transparent Normal distribution errors
    #[error(transparent)]
    NormalError(#[from] rand_distr::NormalError),

    /// Transparent Triangular distribution errors
    #[error(transparent)]
    TriangularError(#[from] rand_distr::TriangularError),

    /// Transparent Weibull distribution errors
    #[error(transparent)]
    WeibullError(#[from] rand_distr::WeibullError),
}

impl From<serde_json::Error> for SimulationError {
    fn from(error: serde_json::Error) -> Self {
        SimulationError::Serialization(error.to_string())
    }
}

impl From<serde_yaml::Error> for SimulationError {
    fn from(error: serde_yaml::Error) -> Self {
        SimulationError::Serialization(error.to_string())
    }
}
