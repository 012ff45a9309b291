//! Operand stack

use crate::error::{EvmError, EvmResult};
use crate::word::Word;

/// Operand stack of 256-bit words.
///
/// Unbounded unless a limit is configured. Internally the top of the stack
/// is the last element of the vector.
#[derive(Clone, Debug, Default)]
pub struct Stack {
    data: Vec<Word>,
    limit: Option<usize>,
}

impl Stack {
    /// Create a new empty, unbounded stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stack that overflows past `limit` items
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            data: Vec::new(),
            limit,
        }
    }

    /// Push a value onto the stack
    pub fn push(&mut self, value: Word) -> EvmResult<()> {
        if let Some(limit) = self.limit {
            if self.data.len() >= limit {
                return Err(EvmError::StackOverflow(limit));
            }
        }
        self.data.push(value);
        Ok(())
    }

    /// Pop a value from the stack
    pub fn pop(&mut self) -> EvmResult<Word> {
        self.data.pop().ok_or(EvmError::StackUnderflow)
    }

    /// Pop `N` values, top of stack first.
    ///
    /// Nothing is removed when fewer than `N` items are present.
    pub fn pop_n<const N: usize>(&mut self) -> EvmResult<[Word; N]> {
        if self.data.len() < N {
            return Err(EvmError::StackUnderflow);
        }
        let mut out = [[0u8; 32]; N];
        for slot in out.iter_mut() {
            *slot = self.pop()?;
        }
        Ok(out)
    }

    /// Peek at a specific depth (0 = top)
    pub fn peek_at(&self, depth: usize) -> EvmResult<&Word> {
        if depth >= self.data.len() {
            return Err(EvmError::StackUnderflow);
        }
        Ok(&self.data[self.data.len() - 1 - depth])
    }

    /// Swap top with item at depth (1 = swap with second item)
    pub fn swap(&mut self, depth: usize) -> EvmResult<()> {
        let len = self.data.len();
        if depth == 0 || depth >= len {
            return Err(EvmError::StackUnderflow);
        }
        self.data.swap(len - 1, len - 1 - depth);
        Ok(())
    }

    /// Duplicate item at depth to top (1 = dup top)
    pub fn dup(&mut self, depth: usize) -> EvmResult<()> {
        if depth == 0 || depth > self.data.len() {
            return Err(EvmError::StackUnderflow);
        }
        let value = *self.peek_at(depth - 1)?;
        self.push(value)
    }

    /// Get current stack size
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if stack is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consume the stack, most recent push first
    pub fn into_vec(self) -> Vec<Word> {
        let mut data = self.data;
        data.reverse();
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::word::{from_u64, to_u64};

    #[test]
    fn test_stack_push_pop() {
        let mut stack = Stack::new();
        stack.push(from_u64(42)).unwrap();
        stack.push(from_u64(100)).unwrap();

        assert_eq!(stack.len(), 2);
        assert_eq!(to_u64(&stack.pop().unwrap()), Some(100));
        assert_eq!(to_u64(&stack.pop().unwrap()), Some(42));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_stack_underflow() {
        let mut stack = Stack::new();
        assert!(matches!(stack.pop(), Err(EvmError::StackUnderflow)));
    }

    #[test]
    fn test_stack_unbounded_by_default() {
        let mut stack = Stack::new();
        for i in 0..2000 {
            stack.push(from_u64(i)).unwrap();
        }
        assert_eq!(stack.len(), 2000);
    }

    #[test]
    fn test_stack_limit() {
        let mut stack = Stack::with_limit(Some(2));
        stack.push(from_u64(1)).unwrap();
        stack.dup(1).unwrap();
        assert_eq!(stack.push(from_u64(3)), Err(EvmError::StackOverflow(2)));
        assert_eq!(stack.dup(1), Err(EvmError::StackOverflow(2)));
    }

    #[test]
    fn test_pop_n_order_and_atomicity() {
        let mut stack = Stack::new();
        stack.push(from_u64(1)).unwrap();
        stack.push(from_u64(2)).unwrap();

        assert_eq!(stack.pop_n::<3>(), Err(EvmError::StackUnderflow));
        assert_eq!(stack.len(), 2);

        let [a, b] = stack.pop_n::<2>().unwrap();
        assert_eq!(to_u64(&a), Some(2));
        assert_eq!(to_u64(&b), Some(1));
    }

    #[test]
    fn test_stack_dup() {
        let mut stack = Stack::new();
        stack.push(from_u64(1)).unwrap();
        stack.push(from_u64(2)).unwrap();
        stack.dup(2).unwrap();
        assert_eq!(to_u64(stack.peek_at(0).unwrap()), Some(1));
        assert_eq!(stack.len(), 3);
        assert_eq!(stack.dup(4), Err(EvmError::StackUnderflow));
    }

    #[test]
    fn test_stack_swap() {
        let mut stack = Stack::new();
        stack.push(from_u64(1)).unwrap();
        stack.push(from_u64(2)).unwrap();
        stack.push(from_u64(3)).unwrap();
        stack.swap(2).unwrap();
        assert_eq!(to_u64(stack.peek_at(0).unwrap()), Some(1));
        assert_eq!(to_u64(stack.peek_at(2).unwrap()), Some(3));
        assert_eq!(stack.swap(3), Err(EvmError::StackUnderflow));
    }

    #[test]
    fn test_swap_on_empty_stack() {
        let mut stack = Stack::new();
        assert_eq!(stack.swap(1), Err(EvmError::StackUnderflow));
    }

    #[test]
    fn test_into_vec_top_first() {
        let mut stack = Stack::new();
        stack.push(from_u64(1)).unwrap();
        stack.push(from_u64(2)).unwrap();
        let items = stack.into_vec();
        assert_eq!(items, vec![from_u64(2), from_u64(1)]);
    }
}
