//! Befunge-98 execution engine
//!
//! This module implements program execution on top of the [`crate::memory`]
//! model:
//! - [`ip`]: the per-pointer state (position, delta, storage offset, stacks)
//! - [`dispatch`]: one-instruction execution, mapping a cell value to its
//!   effect on the pointer, the space, and the host streams
//! - [`engine`]: the [`engine::Interpreter`] itself, with source loading and
//!   the deterministic round-robin scheduler for concurrent pointers
//! - [`errors`]: load and runtime error types

pub mod dispatch;
pub mod engine;
pub mod errors;
pub mod ip;
