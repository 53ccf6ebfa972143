//! # Overview
//! "Procsim" provides a process-interaction discrete event simulation
//! kernel.  Entities are written as ordinary sequential procedures that
//! suspend themselves at explicit points (`hold`, `passivate`, waiting in
//! line), while a `Director` advances the simulated clock and guarantees
//! that exactly one entity body is executing at any instant.
//!
//! This repository contains:
//!
//! * Simulator engine, with the director run loop, the entity hand-off
//! protocol, and a time-ordered agenda with a FIFO tie break.
//! * Pre-built components, for quickly building queueing models from
//! sources, waiting lines, finite-capacity resources, and sinks.
//! * Input modeling, for deterministic or stochastic durations.
//! * Output analysis, with sample and time-weighted statistics and an
//! end-of-run report.
//!
//! ```
//! use std::sync::Arc;
//!
//! use procsim::input_modeling::Deterministic;
//! use procsim::models::{Resource, Sink, Source};
//! use procsim::simulator::Director;
//!
//! let director = Director::default();
//! let teller = Arc::new(Resource::new("teller", 1, Deterministic(3.0)).unwrap());
//! let exit = Arc::new(Sink::new("exit"));
//! let (resource, sink) = (teller.clone(), exit.clone());
//! let arrivals = Arc::new(Source::new("customer", 3, Deterministic(5.0), move |_| {
//!     let (resource, sink) = (resource.clone(), sink.clone());
//!     move |process: &mut procsim::simulator::Process| {
//!         resource.utilize(process)?;
//!         resource.release(process)?;
//!         sink.leave(process)
//!     }
//! }));
//! director.add_component(arrivals).unwrap();
//! director.add_component(teller).unwrap();
//! director.add_component(exit.clone()).unwrap();
//! let report = director.start().unwrap();
//! assert_eq!(report.end_time, 18.0);
//! assert_eq!(exit.departures(), 3);
//! ```
pub mod input_modeling;
pub mod models;
pub mod output_analysis;
pub mod simulator;
pub mod utils;
