//! Callback registry: per-thread hook triples, the active-consumer count, and
//! ownership of the evaluator slot transition.
//!
//! All process-scoped mutable state of the interception layer lives in one
//! [`Registry`] with process-scoped lifetime; nothing here is a bare global.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};
use std::thread::{self, ThreadId};

use log::debug;

use crate::callback::{Callback, CallbackParts};
use crate::dispatch::make_dispatcher;
use crate::error::HookError;
use crate::evaluator::{EvalFn, EvaluatorSlot};
use crate::skip::SkipSet;

/// State covered by the install/uninstall critical section: the consumer
/// count and the evaluator-slot bookkeeping transition together.
struct Transitions {
    active_consumers: usize,
    saved_evaluator: Option<EvalFn>,
    installed_dispatcher: Option<EvalFn>,
}

/// The interception layer's registry.
///
/// Per-thread callback slots are keyed by the calling thread's identity and
/// are never visible to another thread. The evaluator slot and the consumer
/// count are process-wide; their transitions happen under one mutex.
pub struct Registry {
    pub(crate) default_eval: EvalFn,
    pub(crate) slot: Arc<EvaluatorSlot>,
    pub(crate) skip: SkipSet,
    callbacks: RwLock<HashMap<ThreadId, Callback>>,
    transitions: Mutex<Transitions>,
}

impl Registry {
    /// Create a registry bound to the host VM's evaluator slot and default
    /// evaluator.
    ///
    /// The slot is left untouched until the first registration installs the
    /// dispatcher.
    pub fn new(slot: Arc<EvaluatorSlot>, default_eval: EvalFn) -> Arc<Self> {
        Arc::new(Registry {
            default_eval,
            slot,
            skip: SkipSet::new(),
            callbacks: RwLock::new(HashMap::new()),
            transitions: Mutex::new(Transitions {
                active_consumers: 0,
                saved_evaluator: None,
                installed_dispatcher: None,
            }),
        })
    }

    /// Install, replace, or remove the calling thread's hook triple.
    ///
    /// `None` uninstalls; `Some(parts)` must carry all three hooks or the
    /// call fails with [`HookError::InvalidCallback`] and no state change.
    /// Returns the previously installed triple, if any.
    pub fn install(
        self: &Arc<Self>,
        parts: Option<CallbackParts>,
    ) -> Result<Option<Callback>, HookError> {
        // Validate before touching any state.
        let new_callback = parts.map(CallbackParts::into_callback).transpose()?;
        let installing = new_callback.is_some();
        let thread = thread::current().id();

        let mut transitions = self
            .transitions
            .lock()
            .expect("transitions lock poisoned");
        let previous = {
            let mut callbacks = self.callbacks.write().expect("callback map lock poisoned");
            match new_callback {
                Some(callback) => callbacks.insert(thread, callback),
                None => callbacks.remove(&thread),
            }
        };

        match (previous.is_some(), installing) {
            (false, true) => {
                transitions.active_consumers += 1;
                debug!(
                    "callback installed on {:?}; active consumers: {}",
                    thread, transitions.active_consumers
                );
                if transitions.active_consumers == 1 {
                    self.activate(&mut transitions);
                }
            }
            (true, false) => {
                transitions.active_consumers -= 1;
                debug!(
                    "callback removed on {:?}; active consumers: {}",
                    thread, transitions.active_consumers
                );
                if transitions.active_consumers == 0 {
                    self.deactivate(&mut transitions);
                }
            }
            _ => {}
        }

        Ok(previous)
    }

    /// The calling thread's currently installed triple, if any.
    pub fn current(&self) -> Option<Callback> {
        let callbacks = self.callbacks.read().expect("callback map lock poisoned");
        callbacks.get(&thread::current().id()).cloned()
    }

    /// Replace the skip set wholesale.
    pub fn set_skip(&self, sources: HashSet<String>) {
        self.skip.replace(sources);
    }

    /// Number of threads currently holding an installed triple.
    pub fn active_consumers(&self) -> usize {
        let transitions = self
            .transitions
            .lock()
            .expect("transitions lock poisoned");
        transitions.active_consumers
    }

    /// 0 -> 1 edge: save the slot's evaluator and install the dispatcher.
    fn activate(self: &Arc<Self>, transitions: &mut Transitions) {
        let dispatcher = make_dispatcher(self);
        transitions.saved_evaluator = Some(self.slot.current());
        self.slot.store(Arc::clone(&dispatcher));
        transitions.installed_dispatcher = Some(dispatcher);
        debug!("dispatcher installed into evaluator slot");
    }

    /// 1 -> 0 edge: restore the saved evaluator, unless a later override
    /// replaced the dispatcher in the meantime.
    fn deactivate(&self, transitions: &mut Transitions) {
        let installed = transitions.installed_dispatcher.take();
        let saved = transitions.saved_evaluator.take();
        if let (Some(installed), Some(saved)) = (installed, saved) {
            if self.slot.holds(&installed) {
                self.slot.store(saved);
                debug!("saved evaluator restored into evaluator slot");
            } else {
                debug!("evaluator slot overridden since install; leaving it in place");
            }
        }
    }

    /// Clear the calling thread's triple for the reentrancy guard.
    ///
    /// Bypasses the consumer count and the slot: the thread is still an
    /// active consumer while its own instrumented evaluation runs.
    pub(crate) fn take_thread_callback(&self) -> Option<Callback> {
        let mut callbacks = self.callbacks.write().expect("callback map lock poisoned");
        callbacks.remove(&thread::current().id())
    }

    /// Undo [`Registry::take_thread_callback`] on every exit path.
    pub(crate) fn restore_thread_callback(&self, callback: Callback) {
        let mut callbacks = self.callbacks.write().expect("callback map lock poisoned");
        callbacks.insert(thread::current().id(), callback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::{HookFn, TraceFn};
    use crate::value::Value;

    fn noop_parts() -> CallbackParts {
        let pre: HookFn = Arc::new(|_| Ok(()));
        let post: HookFn = Arc::new(|_| Ok(()));
        let trace: TraceFn = Arc::new(|_, _, _| Ok(()));
        CallbackParts::new(pre, post, trace)
    }

    fn test_registry() -> Arc<Registry> {
        let default_eval: EvalFn = Arc::new(|_, _, _| Ok(Value::None));
        let slot = EvaluatorSlot::new(Arc::clone(&default_eval));
        Registry::new(slot, default_eval)
    }

    #[test]
    fn test_install_and_uninstall_edges() {
        let registry = test_registry();
        assert_eq!(registry.active_consumers(), 0);

        let previous = registry.install(Some(noop_parts())).unwrap();
        assert!(previous.is_none());
        assert_eq!(registry.active_consumers(), 1);
        assert!(registry.current().is_some());

        let previous = registry.install(None).unwrap();
        assert!(previous.is_some());
        assert_eq!(registry.active_consumers(), 0);
        assert!(registry.current().is_none());
    }

    #[test]
    fn test_uninstall_when_absent_is_noop() {
        let registry = test_registry();
        let previous = registry.install(None).unwrap();
        assert!(previous.is_none());
        assert_eq!(registry.active_consumers(), 0);
    }

    #[test]
    fn test_replace_keeps_consumer_count() {
        let registry = test_registry();
        registry.install(Some(noop_parts())).unwrap();
        let previous = registry.install(Some(noop_parts())).unwrap();
        assert!(previous.is_some());
        assert_eq!(registry.active_consumers(), 1);
        registry.install(None).unwrap();
    }

    #[test]
    fn test_invalid_registration_has_no_side_effect() {
        let registry = test_registry();
        let partial = CallbackParts {
            pre: Some(Arc::new(|_| Ok(()))),
            post: None,
            trace: None,
        };
        assert!(registry.install(Some(partial)).is_err());
        assert_eq!(registry.active_consumers(), 0);
        assert!(registry.current().is_none());
        // The slot was never touched.
        assert!(registry.slot.holds(&registry.default_eval));
    }

    #[test]
    fn test_slot_transitions_on_edges() {
        let registry = test_registry();
        assert!(registry.slot.holds(&registry.default_eval));

        registry.install(Some(noop_parts())).unwrap();
        assert!(!registry.slot.holds(&registry.default_eval));

        registry.install(None).unwrap();
        assert!(registry.slot.holds(&registry.default_eval));
    }
}
