//! Read-only inspection of a frame's value stack from the top.

use crate::error::HookError;
use crate::frame::Frame;
use crate::value::Value;

impl Frame {
    /// Return a copy of the value at `index` slots below the top of this
    /// frame's value stack (0 = topmost).
    ///
    /// Fails with [`HookError::StackOutOfRange`] when `index` is at or past
    /// the live stack depth.
    pub fn peek_from_top(&self, index: usize) -> Result<Value, HookError> {
        self.with_stack(|stack| {
            let depth = stack.len();
            if index >= depth {
                return Err(HookError::stack_out_of_range(index, depth));
            }
            Ok(stack[depth - 1 - index].clone())
        })
    }
}
