//! Host-VM collaborator contracts: the evaluator signature, the per-thread
//! context handle, and the process-wide evaluator slot.

use std::sync::{Arc, RwLock};

use crate::error::VmException;
use crate::frame::FrameRef;
use crate::ids::ContextId;
use crate::value::Value;

/// The evaluator signature the host VM consults once per frame:
/// `(threadContext, frame, throwFlag) -> result`.
///
/// The default evaluator executes a frame's instructions to completion and
/// may raise. This layer invokes it; it never reimplements it.
pub type EvalFn =
    Arc<dyn Fn(&ThreadContext, &FrameRef, bool) -> Result<Value, VmException> + Send + Sync>;

/// Opaque handle for one interpreter thread of the host VM.
///
/// The interception layer forwards it to the evaluator unchanged.
#[derive(Debug, Clone, Copy)]
pub struct ThreadContext {
    id: ContextId,
}

impl ThreadContext {
    pub fn new() -> Self {
        ThreadContext {
            id: ContextId::fresh(),
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }
}

impl Default for ThreadContext {
    fn default() -> Self {
        Self::new()
    }
}

/// The single indirection point the host VM invokes per frame.
///
/// Holds whatever evaluator is currently active: the host's default
/// evaluator, this layer's dispatcher, or a later third-party override.
pub struct EvaluatorSlot {
    current: RwLock<EvalFn>,
}

impl EvaluatorSlot {
    pub fn new(initial: EvalFn) -> Arc<Self> {
        Arc::new(EvaluatorSlot {
            current: RwLock::new(initial),
        })
    }

    /// The evaluator currently stored in the slot.
    pub fn current(&self) -> EvalFn {
        let current = self.current.read().expect("evaluator slot lock poisoned");
        Arc::clone(&current)
    }

    /// Store a new evaluator into the slot.
    ///
    /// Public so that the host VM (or a layered tool) can override the slot;
    /// the registry's restore path tolerates such overrides.
    pub fn store(&self, eval: EvalFn) {
        let mut current = self.current.write().expect("evaluator slot lock poisoned");
        *current = eval;
    }

    /// Whether the slot currently holds exactly `eval` (pointer identity).
    pub(crate) fn holds(&self, eval: &EvalFn) -> bool {
        let current = self.current.read().expect("evaluator slot lock poisoned");
        same_eval_fn(&current, eval)
    }

    /// Evaluate one frame through whatever evaluator the slot holds. This is
    /// the host VM's per-frame entry point.
    pub fn evaluate(
        &self,
        ctx: &ThreadContext,
        frame: &FrameRef,
        throw_flag: bool,
    ) -> Result<Value, VmException> {
        let eval = self.current();
        eval(ctx, frame, throw_flag)
    }
}

/// Identity comparison of evaluator handles by data pointer.
pub(crate) fn same_eval_fn(a: &EvalFn, b: &EvalFn) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;

    fn stub_eval(result: i64) -> EvalFn {
        Arc::new(move |_ctx, _frame, _throw| Ok(Value::Int(result)))
    }

    #[test]
    fn test_slot_consults_stored_evaluator() {
        let slot = EvaluatorSlot::new(stub_eval(1));
        let ctx = ThreadContext::new();
        let frame = Frame::new("main.src", vec![]);
        assert_eq!(slot.evaluate(&ctx, &frame, false).unwrap(), Value::Int(1));

        slot.store(stub_eval(2));
        assert_eq!(slot.evaluate(&ctx, &frame, false).unwrap(), Value::Int(2));
    }

    #[test]
    fn test_holds_is_pointer_identity() {
        let first = stub_eval(1);
        let slot = EvaluatorSlot::new(Arc::clone(&first));
        assert!(slot.holds(&first));
        // A behaviorally identical but distinct evaluator is not the same.
        assert!(!slot.holds(&stub_eval(1)));
    }
}
