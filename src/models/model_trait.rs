use std::sync::Arc;

use super::{Component, ComponentRecord};
use crate::simulator::Director;
use crate::utils::errors::SimulationError;

/// The additional status and record-keeping methods of `Reportable` provide
/// improved simulation reasoning, reporting, and debugging, but do not
/// impact simulation execution or results.
pub trait Reportable {
    fn status(&self) -> String;
    fn records(&self) -> Vec<ComponentRecord>;
}

/// A `SimComponent` is a stationary model element that entities interact
/// with.  It exposes its shared `Component` core, which the director binds
/// at registration and reads for the end-of-run report.
pub trait SimComponent: Reportable + Send + Sync {
    fn component(&self) -> &Component;

    fn kind(&self) -> &'static str;

    /// Called once by `Director::start`, before the first hand-off.
    fn initialize(self: Arc<Self>, _director: &Director) -> Result<(), SimulationError> {
        Ok(())
    }
}
