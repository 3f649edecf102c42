//! Core identifier types for the interception layer.
//!
//! All IDs are lightweight Copy types using newtype pattern for type safety.

use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a frame (activation record).
///
/// Stamped on every frame the host VM hands to this layer so dispatch
/// decisions can be logged against a stable handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FrameId(pub u64);

/// Unique identifier for a VM thread context.
///
/// Each interpreter thread of the host VM carries one context for the
/// lifetime of that thread.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ContextId(pub u64);

// Global counters for ID generation
static FRAME_ID_COUNTER: AtomicU64 = AtomicU64::new(1);
static CONTEXT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

impl FrameId {
    /// Create a fresh unique FrameId.
    pub fn fresh() -> Self {
        FrameId(FRAME_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw value.
    pub fn raw(&self) -> u64 {
        self.0
    }

    pub fn from_raw(value: u64) -> Self {
        FrameId(value)
    }
}

impl ContextId {
    /// Create a fresh unique ContextId.
    pub fn fresh() -> Self {
        ContextId(CONTEXT_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw value.
    pub fn raw(&self) -> u64 {
        self.0
    }

    pub fn from_raw(value: u64) -> Self {
        ContextId(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_id_fresh_is_unique() {
        let f1 = FrameId::fresh();
        let f2 = FrameId::fresh();
        assert_ne!(f1, f2);
    }

    #[test]
    fn test_context_id_fresh_is_unique() {
        let c1 = ContextId::fresh();
        let c2 = ContextId::fresh();
        assert_ne!(c1, c2);
    }

    #[test]
    fn test_id_raw_roundtrip() {
        assert_eq!(FrameId::from_raw(42).raw(), 42);
        assert_eq!(ContextId::from_raw(7).raw(), 7);
    }
}
