//! Instruction pointer state
//!
//! An [`InstructionPointer`] is everything one thread of execution owns:
//! position and delta in Funge-space, the storage offset applied by `g`/`p`,
//! string mode, and a private stack of stacks.  Pointers share the space but
//! never share stacks; forking deep-clones the whole stack stack.
//!
//! The block instructions (`{`, `}`, `u`) live here because they only touch
//! pointer-local state.

use crate::memory::cell::Cell;
use crate::memory::space::Vector;
use crate::memory::stack::StackStack;

/// One thread of execution.
#[derive(Debug, Clone)]
pub struct InstructionPointer {
    /// Unique id, as reported by the sysinfo instruction.
    pub id: Cell,
    pub position: Vector,
    pub delta: Vector,
    /// Offset added to `g`/`p` coordinates; set by `{`.
    pub storage_offset: Vector,
    pub string_mode: bool,
    /// Whether the scheduler should move the pointer before the next tick.
    /// Cleared by instructions that position the pointer themselves.
    pub(crate) must_advance: bool,
    pub stacks: StackStack,
}

impl InstructionPointer {
    /// A pointer at the origin, heading east, with one empty stack.
    pub fn new(id: Cell) -> Self {
        InstructionPointer {
            id,
            position: Vector::ORIGIN,
            delta: Vector::EAST,
            storage_offset: Vector::ORIGIN,
            string_mode: false,
            must_advance: false,
            stacks: StackStack::new(),
        }
    }

    pub fn push(&mut self, v: Cell) {
        self.stacks.toss_mut().push(v);
    }

    pub fn pop(&mut self) -> Cell {
        self.stacks.toss_mut().pop()
    }

    /// Pop a vector: y first, then x.
    pub fn pop_vector(&mut self) -> Vector {
        let y = self.pop();
        let x = self.pop();
        Vector { x, y }
    }

    /// Push a vector: x first, then y.
    pub fn push_vector(&mut self, v: Vector) {
        self.push(v.x);
        self.push(v.y);
    }

    /// Reverse the delta.
    pub fn reflect(&mut self) {
        self.delta = -self.delta;
    }

    /// `{`: push a new stack, moving `n` cells from the old top stack onto
    /// it (order preserved).  A negative `n` instead pushes `|n|` zeros onto
    /// the old top stack.  The storage offset is saved on the old stack and
    /// repointed to the cell past this instruction.
    pub fn begin_block(&mut self, n: Cell) {
        let toss = self.stacks.toss_mut();
        let take = (n.max(0) as usize).min(toss.len());
        let pad_new = (n.max(0) as usize).saturating_sub(take);
        let pad_old = (-n).max(0) as usize;

        let moved = toss.take_top(take);
        for _ in 0..pad_old {
            toss.push(0);
        }
        let offset = self.storage_offset;
        self.push_vector(offset);
        self.stacks.push_stack();
        let toss = self.stacks.toss_mut();
        for _ in 0..pad_new {
            toss.push(0);
        }
        toss.push_all(moved);
        self.storage_offset = self.position + self.delta;
    }

    /// `}`: pop the top stack, restore the storage offset from the stack
    /// beneath, and move `n` cells down (order preserved, zero-padded).  A
    /// negative `n` instead pops `|n|` cells from the stack beneath.
    ///
    /// The caller must have checked that more than one stack exists; with a
    /// single stack `}` reflects without popping anything.
    pub fn end_block(&mut self, n: Cell) {
        let mut old = match self.stacks.pop_stack() {
            Some(s) => s,
            None => return,
        };
        self.storage_offset = self.pop_vector();
        if n < 0 {
            for _ in 0..(-n) as usize {
                self.pop();
            }
        } else {
            let take = (n as usize).min(old.len());
            let moved = old.take_top(take);
            let toss = self.stacks.toss_mut();
            for _ in 0..(n as usize - take) {
                toss.push(0);
            }
            toss.push_all(moved);
        }
    }

    /// `u`: transfer `n` cells between the top two stacks, one pop/push at a
    /// time (so the order reverses).  Positive `n` moves from the stack
    /// beneath to the top; negative moves the other way.
    ///
    /// As with [`Self::end_block`], the caller must have checked the depth.
    pub fn transfer(&mut self, n: Cell) {
        if n > 0 {
            for _ in 0..n as usize {
                let v = match self.stacks.soss_mut() {
                    Some(s) => s.pop(),
                    None => return,
                };
                self.push(v);
            }
        } else {
            for _ in 0..(-n) as usize {
                let v = self.pop();
                match self.stacks.soss_mut() {
                    Some(s) => s.push(v),
                    None => return,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_push_pop_order() {
        let mut ip = InstructionPointer::new(0);
        ip.push_vector(Vector { x: 3, y: 7 });
        assert_eq!(ip.pop(), 7); // y on top
        ip.push(7);
        assert_eq!(ip.pop_vector(), Vector { x: 3, y: 7 });
    }

    #[test]
    fn test_begin_block_moves_cells() {
        let mut ip = InstructionPointer::new(0);
        ip.position = Vector { x: 4, y: 0 };
        for v in [1, 2, 3] {
            ip.push(v);
        }
        ip.begin_block(2);
        assert_eq!(ip.stacks.depth(), 2);
        // New top stack holds the moved cells in order
        assert_eq!(ip.stacks.toss().as_slice(), &[2, 3]);
        assert_eq!(ip.storage_offset, Vector { x: 5, y: 0 });
        // Old stack: remaining cell, then the saved (zero) offset
        assert_eq!(ip.stacks.soss_mut().unwrap().as_slice(), &[1, 0, 0]);
    }

    #[test]
    fn test_begin_block_negative_pads_old() {
        let mut ip = InstructionPointer::new(0);
        ip.begin_block(-2);
        assert!(ip.stacks.toss().is_empty());
        // Two pad zeros plus the saved offset
        assert_eq!(ip.stacks.soss_mut().unwrap().as_slice(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_end_block_restores_offset() {
        let mut ip = InstructionPointer::new(0);
        ip.position = Vector { x: 2, y: 3 };
        ip.storage_offset = Vector { x: 1, y: 1 };
        ip.begin_block(0);
        ip.push(9);
        ip.end_block(1);
        assert_eq!(ip.stacks.depth(), 1);
        assert_eq!(ip.storage_offset, Vector { x: 1, y: 1 });
        assert_eq!(ip.pop(), 9);
    }

    #[test]
    fn test_end_block_negative_discards() {
        let mut ip = InstructionPointer::new(0);
        for v in [1, 2, 3] {
            ip.push(v);
        }
        ip.begin_block(0);
        ip.end_block(-2);
        assert_eq!(ip.stacks.depth(), 1);
        assert_eq!(ip.pop(), 1);
        assert_eq!(ip.pop(), 0);
    }

    #[test]
    fn test_transfer_reverses_order() {
        let mut ip = InstructionPointer::new(0);
        for v in [1, 2, 3] {
            ip.push(v);
        }
        ip.stacks.push_stack();
        ip.transfer(2);
        assert_eq!(ip.stacks.toss().as_slice(), &[3, 2]);
        ip.transfer(-2);
        // Reversed back on return
        assert!(ip.stacks.toss().is_empty());
        assert_eq!(ip.stacks.soss_mut().unwrap().as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_fork_clone_is_independent() {
        let mut parent = InstructionPointer::new(0);
        parent.push(5);
        let mut child = parent.clone();
        child.id = 1;
        child.pop();
        child.push(6);
        assert_eq!(parent.pop(), 5);
    }
}
