use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use crate::utils::errors::SimulationError;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Issue the next process-wide unique id.  Ids are shared by components and
/// actors, and are never reused.
pub fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// A unique id plus a name that can be set exactly once.
#[derive(Debug)]
pub struct Identity {
    id: u64,
    name: OnceLock<String>,
}

impl Default for Identity {
    fn default() -> Self {
        Self::new()
    }
}

impl Identity {
    pub fn new() -> Self {
        Self {
            id: next_id(),
            name: OnceLock::new(),
        }
    }

    pub fn named(name: &str) -> Self {
        let identity = Self::new();
        let _ = identity.name.set(name.to_string());
        identity
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.get().map(String::as_str)
    }

    pub fn set_name(&self, name: &str) -> Result<(), SimulationError> {
        self.name
            .set(name.to_string())
            .map_err(|_| SimulationError::NameAlreadySet { id: self.id })
    }

    /// The name, or `#id` for an element that was never named.
    pub fn label(&self) -> String {
        match self.name() {
            Some(name) => name.to_string(),
            None => format!("#{}", self.id),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
