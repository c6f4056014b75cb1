//! Per-pointer LIFO storage
//!
//! This module provides the value storage carried by every instruction
//! pointer:
//! - [`Stack`]: a LIFO stack of cells where popping an empty stack yields 0
//!   (the language-mandated sentinel, not an error)
//! - [`StackStack`]: an ordered sequence of stacks with exactly one always
//!   present; the top stack ("TOSS") serves ordinary stack instructions,
//!   the one beneath ("SOSS") is reachable through the block instructions

use super::cell::Cell;

/// A LIFO stack of cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stack {
    cells: Vec<Cell>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, v: Cell) {
        self.cells.push(v);
    }

    /// Pop the top cell.  An empty stack yields 0.
    pub fn pop(&mut self) -> Cell {
        self.cells.pop().unwrap_or(0)
    }

    /// Read the k-th cell from the top without popping (0 = top).
    /// Out-of-range reads yield 0.
    pub fn peek_n(&self, k: usize) -> Cell {
        if k < self.cells.len() {
            self.cells[self.cells.len() - 1 - k]
        } else {
            0
        }
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn as_slice(&self) -> &[Cell] {
        &self.cells
    }

    /// Remove and return the top `n` cells, preserving their order.
    /// Takes the whole stack if it holds fewer than `n`.
    pub fn take_top(&mut self, n: usize) -> Vec<Cell> {
        let split = self.cells.len().saturating_sub(n);
        self.cells.split_off(split)
    }

    /// Append cells on top, preserving their order.
    pub fn push_all(&mut self, cells: Vec<Cell>) {
        self.cells.extend(cells);
    }
}

/// An ordered sequence of stacks; the last element is the top of the stack
/// stack.  The invariant that at least one stack is always present is upheld
/// here: [`StackStack::pop_stack`] refuses to remove the last one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackStack {
    stacks: Vec<Stack>,
}

impl StackStack {
    pub fn new() -> Self {
        StackStack {
            stacks: vec![Stack::new()],
        }
    }

    /// The top stack (TOSS).
    pub fn toss(&self) -> &Stack {
        self.stacks.last().expect("stack stack is never empty")
    }

    pub fn toss_mut(&mut self) -> &mut Stack {
        self.stacks.last_mut().expect("stack stack is never empty")
    }

    /// The stack beneath the top (SOSS), if any.
    pub fn soss_mut(&mut self) -> Option<&mut Stack> {
        let n = self.stacks.len();
        if n > 1 {
            self.stacks.get_mut(n - 2)
        } else {
            None
        }
    }

    /// Push a fresh empty stack on top.
    pub fn push_stack(&mut self) {
        self.stacks.push(Stack::new());
    }

    /// Remove and return the top stack.  Returns `None` (and removes
    /// nothing) when only one stack remains.
    pub fn pop_stack(&mut self) -> Option<Stack> {
        if self.stacks.len() > 1 {
            self.stacks.pop()
        } else {
            None
        }
    }

    pub fn depth(&self) -> usize {
        self.stacks.len()
    }

    /// All stacks, bottom first (for sysinfo).
    pub fn stacks(&self) -> &[Stack] {
        &self.stacks
    }
}

impl Default for StackStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_empty_yields_zero() {
        let mut stack = Stack::new();
        assert_eq!(stack.pop(), 0);
        stack.push(7);
        assert_eq!(stack.pop(), 7);
        // Any number of extra pops keeps yielding 0
        for _ in 0..10 {
            assert_eq!(stack.pop(), 0);
        }
        assert!(stack.is_empty());
    }

    #[test]
    fn test_peek_n() {
        let mut stack = Stack::new();
        stack.push(1);
        stack.push(2);
        stack.push(3);
        assert_eq!(stack.peek_n(0), 3);
        assert_eq!(stack.peek_n(2), 1);
        assert_eq!(stack.peek_n(3), 0);
    }

    #[test]
    fn test_take_top_preserves_order() {
        let mut stack = Stack::new();
        for v in [1, 2, 3, 4] {
            stack.push(v);
        }
        assert_eq!(stack.take_top(3), vec![2, 3, 4]);
        assert_eq!(stack.len(), 1);
        // Asking for more than is there takes everything
        assert_eq!(stack.take_top(5), vec![1]);
    }

    #[test]
    fn test_stack_stack_keeps_one() {
        let mut ss = StackStack::new();
        assert_eq!(ss.depth(), 1);
        assert!(ss.pop_stack().is_none());
        assert!(ss.soss_mut().is_none());

        ss.toss_mut().push(5);
        ss.push_stack();
        assert_eq!(ss.toss_mut().pop(), 0);
        assert_eq!(ss.soss_mut().unwrap().pop(), 5);
        assert!(ss.pop_stack().is_some());
        assert_eq!(ss.depth(), 1);
    }
}
