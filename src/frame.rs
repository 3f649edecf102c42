//! Frame: one in-progress activation record of the host VM.
//!
//! Frames are owned by the host VM. This layer borrows them for the duration
//! of one evaluation, holding a strong [`FrameRef`] only while instrumentation
//! code runs.

use std::sync::{Arc, Mutex};

use crate::callback::{TraceEvent, TraceFn};
use crate::error::VmException;
use crate::ids::FrameId;
use crate::value::Value;

/// Shared strong handle to a frame.
pub type FrameRef = Arc<Frame>;

#[derive(Default)]
struct FrameState {
    stack: Vec<Value>,
    trace: Option<TraceFn>,
    trace_instructions: bool,
}

/// An activation record: source identifier, value stack, and an attachable
/// trace hook slot.
///
/// The source identifier is matched against the skip set by plain string
/// equality; the host is responsible for supplying pre-normalized keys.
pub struct Frame {
    id: FrameId,
    source: Arc<str>,
    state: Mutex<FrameState>,
}

impl Frame {
    /// Create a frame with an initial value stack.
    pub fn new(source: impl Into<Arc<str>>, stack: Vec<Value>) -> FrameRef {
        Arc::new(Frame {
            id: FrameId::fresh(),
            source: source.into(),
            state: Mutex::new(FrameState {
                stack,
                trace: None,
                trace_instructions: false,
            }),
        })
    }

    pub fn id(&self) -> FrameId {
        self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Push a value onto the value stack. Called by the host evaluator.
    pub fn push(&self, value: Value) {
        let mut state = self.state.lock().expect("frame state lock poisoned");
        state.stack.push(value);
    }

    /// Pop the top of the value stack. Called by the host evaluator.
    pub fn pop(&self) -> Option<Value> {
        let mut state = self.state.lock().expect("frame state lock poisoned");
        state.stack.pop()
    }

    /// Current depth of the value stack.
    pub fn depth(&self) -> usize {
        let state = self.state.lock().expect("frame state lock poisoned");
        state.stack.len()
    }

    /// Run a closure against the live value stack under the frame lock.
    pub(crate) fn with_stack<R>(&self, f: impl FnOnce(&[Value]) -> R) -> R {
        let state = self.state.lock().expect("frame state lock poisoned");
        f(&state.stack)
    }

    /// Attach a trace hook and enable per-instruction trace events.
    pub(crate) fn attach_trace(&self, trace: TraceFn) {
        let mut state = self.state.lock().expect("frame state lock poisoned");
        state.trace = Some(trace);
        state.trace_instructions = true;
    }

    /// Detach the trace hook and disable per-instruction trace events.
    pub(crate) fn detach_trace(&self) {
        let mut state = self.state.lock().expect("frame state lock poisoned");
        state.trace = None;
        state.trace_instructions = false;
    }

    /// Whether a trace hook is currently attached.
    pub fn trace_attached(&self) -> bool {
        let state = self.state.lock().expect("frame state lock poisoned");
        state.trace.is_some()
    }

    /// Report a trace event to the attached hook, if any.
    ///
    /// The host's default evaluator calls this once per instruction while a
    /// hook is attached. A raised error propagates to the evaluator.
    pub fn emit_trace(&self, event: TraceEvent, arg: &Value) -> Result<(), VmException> {
        let hook = {
            let state = self.state.lock().expect("frame state lock poisoned");
            if !state.trace_instructions {
                return Ok(());
            }
            state.trace.clone()
        };
        // The lock is released before the hook runs; trace hooks may touch
        // the frame's stack.
        match hook {
            Some(hook) => hook(self, event, arg),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("depth", &self.depth())
            .finish()
    }
}
