//! framehook: frame-evaluation interception for embedded bytecode VMs.
//!
//! The host VM consults a single [`EvaluatorSlot`] once per frame. While any
//! thread has a hook triple installed, the slot holds this crate's
//! dispatcher, which routes each frame either straight to the default
//! evaluator (pass-through) or through the triple: preprocess, traced
//! evaluation, postprocess.
//!
//! # Architecture
//!
//! - **Per-thread registration**: each interpreter thread installs its own
//!   triple; threads never observe each other's hooks.
//! - **One critical section**: the consumer count and the evaluator-slot swap
//!   transition together under the registry's transitions mutex.
//! - **Scope-guard cleanup**: the reentrancy clear/restore and the trace
//!   attach/detach are unwind-safe; a raise inside any hook or the evaluator
//!   leaves the thread with its triple intact.

pub mod callback;
mod dispatch;
pub mod error;
pub mod evaluator;
pub mod frame;
pub mod ids;
mod instrumented;
pub mod registry;
pub mod skip;
mod stack;
pub mod value;


// Re-exports for convenience
pub use callback::{Callback, CallbackParts, HookFn, TraceEvent, TraceFn};
pub use error::{HookError, VmException};
pub use evaluator::{EvalFn, EvaluatorSlot, ThreadContext};
pub use frame::{Frame, FrameRef};
pub use ids::{ContextId, FrameId};
pub use registry::Registry;
pub use skip::SkipSet;
pub use value::Value;
