//! Error types for the interception layer.

/// Errors raised by this layer's own API surface.
///
/// Anything raised by a hook or the default evaluator is not a `HookError`;
/// those propagate verbatim as [`VmException`].
#[derive(Debug, Clone)]
pub enum HookError {
    /// A registration was neither absent nor a complete hook triple.
    InvalidCallback { message: String },
    /// A stack peek addressed a slot past the live stack depth.
    StackOutOfRange { index: usize, depth: usize },
}

impl std::fmt::Display for HookError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HookError::InvalidCallback { message } => {
                write!(f, "invalid callback: {}", message)
            }
            HookError::StackOutOfRange { index, depth } => {
                write!(
                    f,
                    "stack index {} out of range for stack of depth {}",
                    index, depth
                )
            }
        }
    }
}

impl std::error::Error for HookError {}

impl HookError {
    pub fn invalid_callback(message: impl Into<String>) -> Self {
        HookError::InvalidCallback {
            message: message.into(),
        }
    }

    pub fn stack_out_of_range(index: usize, depth: usize) -> Self {
        HookError::StackOutOfRange { index, depth }
    }
}

/// An error value raised by host-VM code: a hook, the trace hook, or the
/// default evaluator.
///
/// This layer never constructs or unwraps these on its own behalf; they pass
/// through unchanged after cleanup has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmException {
    message: String,
}

impl VmException {
    pub fn new(message: impl Into<String>) -> Self {
        VmException {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for VmException {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "vm exception: {}", self.message)
    }
}

impl std::error::Error for VmException {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HookError::invalid_callback("missing post hook");
        assert!(err.to_string().contains("invalid callback"));

        let err = HookError::stack_out_of_range(3, 2);
        assert!(err.to_string().contains("index 3"));
        assert!(err.to_string().contains("depth 2"));
    }

    #[test]
    fn test_vm_exception_passthrough_equality() {
        let a = VmException::new("boom");
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(a.message(), "boom");
    }
}
