//! The models module provides the stationary elements that entities pass
//! through - waiting lines, finite-capacity resources, entity sources, and
//! sinks.  They are the minimal vocabulary for queueing behavior, and are
//! built from the shared `Component` core plus the scheduling primitives of
//! `Process`.  Custom components implement `SimComponent`.

use serde::{Deserialize, Serialize};

pub mod component;
pub mod identity;
pub mod model_trait;
pub mod resource;
pub mod sink;
pub mod source;
pub mod wait_queue;

pub use self::component::{Component, Location};
pub use self::identity::Identity;
pub use self::model_trait::{Reportable, SimComponent};
pub use self::resource::Resource;
pub use self::sink::Sink;
pub use self::source::Source;
pub use self::wait_queue::WaitQueue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub time: f64,
    pub action: String,
    pub subject: String,
}
