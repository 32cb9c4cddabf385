//! View-facing notifications
//!
//! The engine reports every transition twice: as a typed callback and as a
//! [`StageEvent`] through [`RoundListener::on_stage`]. A view can implement
//! whichever it needs.

use std::sync::Arc;

use kp_stage::{StageEvent, StageTrace};
use parking_lot::Mutex;

use crate::classify::Classification;
use crate::resolver::Resolution;
use crate::spin::SpinResult;

/// Receives engine notifications. Every method defaults to a no-op.
pub trait RoundListener: Send {
    /// All three reels of a spin stopped and the settle phase elapsed
    fn on_spin_settled(&mut self, _spin: &SpinResult) {}

    /// Round finished and was resolved
    fn on_round_complete(&mut self, _classification: &Classification, _resolution: Resolution) {}

    /// Streak summary is on screen
    fn on_session_terminated(&mut self, _final_continue_count: u32) {}

    /// Raw stage stream
    fn on_stage(&mut self, _event: &StageEvent) {}
}

/// Listener that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullListener;

impl RoundListener for NullListener {}

/// Appends every stage event to a shared [`StageTrace`]
///
/// Clones share the same trace, so one clone can be handed to the engine and
/// another kept by a view thread.
#[derive(Debug, Clone)]
pub struct TraceRecorder {
    trace: Arc<Mutex<StageTrace>>,
}

impl TraceRecorder {
    pub fn new(trace_id: impl Into<String>) -> Self {
        Self {
            trace: Arc::new(Mutex::new(StageTrace::new(trace_id))),
        }
    }

    /// Shared handle to the underlying trace
    pub fn handle(&self) -> Arc<Mutex<StageTrace>> {
        Arc::clone(&self.trace)
    }

    /// Copy of the trace as recorded so far
    pub fn snapshot(&self) -> StageTrace {
        self.trace.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.trace.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.trace.lock().is_empty()
    }

    /// Stage type names in order
    pub fn type_names(&self) -> Vec<&'static str> {
        self.trace.lock().events.iter().map(|e| e.type_name()).collect()
    }
}

impl RoundListener for TraceRecorder {
    fn on_stage(&mut self, event: &StageEvent) {
        self.trace.lock().push(event.clone());
    }
}
