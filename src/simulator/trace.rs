//! The trace sink is the write-only channel towards animation and trace
//! consumers.  The kernel emits timestamped create, move, and destroy
//! commands for entities, plus free-form text lines.  Nothing written here
//! feeds back into scheduling.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::models::Location;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum TraceEvent {
    Create {
        time: f64,
        actor: u64,
        name: String,
    },
    Move {
        time: f64,
        actor: u64,
        component: String,
        to: Location,
    },
    Destroy {
        time: f64,
        actor: u64,
    },
    Note {
        time: f64,
        subject: String,
        text: String,
    },
}

pub trait TraceSink: Send + Sync {
    fn emit(&self, event: TraceEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTrace;

impl TraceSink for NullTrace {
    fn emit(&self, _event: TraceEvent) {}
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingTrace {
    events: Mutex<Vec<TraceEvent>>,
}

impl RecordingTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().clone()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&*self.events.lock())
    }
}

impl TraceSink for RecordingTrace {
    fn emit(&self, event: TraceEvent) {
        self.events.lock().push(event);
    }
}

/// Forwards every event to `tracing`, at trace level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTrace;

impl TraceSink for LogTrace {
    fn emit(&self, event: TraceEvent) {
        match event {
            TraceEvent::Create { time, actor, name } => {
                tracing::trace!(time, actor, %name, "create");
            }
            TraceEvent::Move {
                time,
                actor,
                component,
                to,
            } => {
                tracing::trace!(time, actor, %component, x = to.x, y = to.y, "move");
            }
            TraceEvent::Destroy { time, actor } => {
                tracing::trace!(time, actor, "destroy");
            }
            TraceEvent::Note {
                time,
                subject,
                text,
            } => {
                tracing::trace!(time, %subject, "{}", text);
            }
        }
    }
}
