//! The input modeling module provides a foundation for configurable model
//! behaviors, whether that is deterministic or stochastic.  Durations
//! (inter-arrival times and service times) are drawn from a
//! `VariateGenerator`, the single-method collaborator consumed by sources and
//! resources.  Fixed values and fixed sequences are available for
//! deterministic experiments, and `Stochastic` wraps the common continuous
//! distributions with an independent random number stream.

pub mod random_variable;
pub mod uniform_rng;
pub mod variate;

pub use random_variable::Continuous as ContinuousRandomVariable;
pub use uniform_rng::UniformRNG;
pub use variate::{Deterministic, Sequence, Stochastic, VariateGenerator};
