//! Instrumented evaluation of one intercepted frame.
//!
//! Runs the hook triad around the default evaluator: preprocess, traced
//! evaluation, postprocess. The thread's triple is cleared on entry so any
//! nested frame evaluation triggered from hook code takes the pass-through
//! path, and it is restored on every exit path by a scope guard.

use crate::callback::Callback;
use crate::error::VmException;
use crate::evaluator::ThreadContext;
use crate::frame::{Frame, FrameRef};
use crate::registry::Registry;
use crate::value::Value;

/// Puts the thread's triple back when the instrumented call leaves scope,
/// whether it returns, propagates an error, or unwinds from a panic.
struct RestoreCallback<'a> {
    registry: &'a Registry,
    callback: Option<Callback>,
}

impl Drop for RestoreCallback<'_> {
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            self.registry.restore_thread_callback(callback);
        }
    }
}

/// Detaches the trace hook when dropped.
struct DetachTrace<'a> {
    frame: &'a Frame,
}

impl Drop for DetachTrace<'_> {
    fn drop(&mut self) {
        self.frame.detach_trace();
    }
}

impl Registry {
    pub(crate) fn instrumented_eval(
        &self,
        ctx: &ThreadContext,
        frame: &FrameRef,
        throw_flag: bool,
        callback: Callback,
    ) -> Result<Value, VmException> {
        // Reentrancy guard: nested evaluations on this thread see an absent
        // triple until the guard restores it.
        self.take_thread_callback();
        let _restore = RestoreCallback {
            registry: self,
            callback: Some(callback.clone()),
        };

        // Strong reference held for exactly the duration of this call.
        let frame = FrameRef::clone(frame);

        (callback.pre)(&frame)?;

        frame.attach_trace(callback.trace.clone());
        let detach = DetachTrace { frame: &frame };
        let result = (self.default_eval)(ctx, &frame, throw_flag);
        // Detach unconditionally, before the postprocess hook runs.
        drop(detach);

        let post_result = (callback.post)(&frame);
        match result {
            // The evaluator's error wins; a postprocess error after a failed
            // evaluation is discarded.
            Err(raised) => Err(raised),
            Ok(value) => post_result.map(|()| value),
        }
    }
}
