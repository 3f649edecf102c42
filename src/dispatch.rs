//! Per-frame dispatch: pass-through or instrumented evaluation.

use std::sync::Arc;

use log::trace;

use crate::error::VmException;
use crate::evaluator::{EvalFn, ThreadContext};
use crate::frame::FrameRef;
use crate::registry::Registry;
use crate::value::Value;

/// Build the evaluator stored into the slot while any thread holds a triple.
///
/// The closure holds the registry weakly so the slot never keeps the registry
/// alive through its own dispatcher; should the registry be gone, frames fall
/// back to the default evaluator.
pub(crate) fn make_dispatcher(registry: &Arc<Registry>) -> EvalFn {
    let weak = Arc::downgrade(registry);
    let default_eval = Arc::clone(&registry.default_eval);
    Arc::new(move |ctx, frame, throw_flag| match weak.upgrade() {
        Some(registry) => registry.dispatch(ctx, frame, throw_flag),
        None => default_eval(ctx, frame, throw_flag),
    })
}

impl Registry {
    /// Decide pass-through vs. instrumented execution for one frame.
    ///
    /// Decided fresh on every call: the calling thread's triple first, then
    /// the skip set. The skip set is only consulted under a present triple.
    pub(crate) fn dispatch(
        &self,
        ctx: &ThreadContext,
        frame: &FrameRef,
        throw_flag: bool,
    ) -> Result<Value, VmException> {
        let Some(callback) = self.current() else {
            return (self.default_eval)(ctx, frame, throw_flag);
        };
        if self.skip.contains(frame.source()) {
            trace!(
                "frame {} ({}) in skip set; pass-through",
                frame.id().raw(),
                frame.source()
            );
            return (self.default_eval)(ctx, frame, throw_flag);
        }
        trace!(
            "frame {} ({}) intercepted",
            frame.id().raw(),
            frame.source()
        );
        self.instrumented_eval(ctx, frame, throw_flag, callback)
    }
}
