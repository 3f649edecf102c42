//! The hook triple installed per thread: preprocess, postprocess, trace.

use std::fmt;
use std::sync::Arc;

use crate::error::{HookError, VmException};
use crate::frame::Frame;
use crate::value::Value;

/// A preprocess or postprocess hook. Return values are discarded; a raised
/// error propagates through the instrumented evaluation.
pub type HookFn = Arc<dyn Fn(&Frame) -> Result<(), VmException> + Send + Sync>;

/// A trace hook. The host VM invokes it once per traced instruction while it
/// is attached to a frame; this layer only attaches and detaches it.
pub type TraceFn =
    Arc<dyn Fn(&Frame, TraceEvent, &Value) -> Result<(), VmException> + Send + Sync>;

/// Event kinds the host VM reports to an attached trace hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    Instruction,
    Call,
    Return,
    Exception,
}

/// A complete hook triple. Always all three hooks; partial registrations are
/// rejected at the [`CallbackParts`] boundary.
///
/// Cloning shares the underlying hooks, so the triple survives the
/// clear/restore cycle of an instrumented evaluation.
#[derive(Clone)]
pub struct Callback {
    pub pre: HookFn,
    pub post: HookFn,
    pub trace: TraceFn,
}

impl Callback {
    pub fn new(pre: HookFn, post: HookFn, trace: TraceFn) -> Self {
        Callback { pre, post, trace }
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback").finish_non_exhaustive()
    }
}

/// The raw shape of a registration as submitted by an embedding, before
/// validation.
#[derive(Default, Clone)]
pub struct CallbackParts {
    pub pre: Option<HookFn>,
    pub post: Option<HookFn>,
    pub trace: Option<TraceFn>,
}

impl CallbackParts {
    pub fn new(pre: HookFn, post: HookFn, trace: TraceFn) -> Self {
        CallbackParts {
            pre: Some(pre),
            post: Some(post),
            trace: Some(trace),
        }
    }

    /// Validate into a complete triple. Partial shapes are rejected with no
    /// side effect, so a failed registration never mutates registry state.
    pub fn into_callback(self) -> Result<Callback, HookError> {
        match (self.pre, self.post, self.trace) {
            (Some(pre), Some(post), Some(trace)) => Ok(Callback { pre, post, trace }),
            (pre, post, trace) => {
                let mut missing = Vec::new();
                if pre.is_none() {
                    missing.push("preprocess");
                }
                if post.is_none() {
                    missing.push("postprocess");
                }
                if trace.is_none() {
                    missing.push("trace");
                }
                Err(HookError::invalid_callback(format!(
                    "registration must supply all three hooks; missing: {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

impl From<Callback> for CallbackParts {
    fn from(callback: Callback) -> Self {
        CallbackParts {
            pre: Some(callback.pre),
            post: Some(callback.post),
            trace: Some(callback.trace),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_hook() -> HookFn {
        Arc::new(|_frame| Ok(()))
    }

    fn noop_trace() -> TraceFn {
        Arc::new(|_frame, _event, _arg| Ok(()))
    }

    #[test]
    fn test_complete_parts_validate() {
        let parts = CallbackParts::new(noop_hook(), noop_hook(), noop_trace());
        assert!(parts.into_callback().is_ok());
    }

    #[test]
    fn test_partial_parts_rejected() {
        let parts = CallbackParts {
            pre: Some(noop_hook()),
            post: None,
            trace: Some(noop_trace()),
        };
        let err = parts.into_callback().unwrap_err();
        assert!(err.to_string().contains("postprocess"));
    }

    #[test]
    fn test_empty_parts_name_all_hooks() {
        let err = CallbackParts::default().into_callback().unwrap_err();
        let text = err.to_string();
        assert!(text.contains("preprocess"));
        assert!(text.contains("postprocess"));
        assert!(text.contains("trace"));
    }
}
