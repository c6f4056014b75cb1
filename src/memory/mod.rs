//! Memory model for the Befunge-98 interpreter
//!
//! This module provides the core memory abstractions:
//! - [`cell`]: the [`cell::Cell`] scalar stored at every coordinate
//! - [`space`]: sparse 2D Funge-space with a cached bounding box and the
//!   Lahey-space wraparound rule
//! - [`stack`]: per-pointer LIFO storage, organized as a stack of stacks
//!
//! # Addressing
//!
//! Funge-space is addressable at arbitrary (possibly negative) integer
//! coordinates.  Only non-space cells are stored; reading a coordinate that
//! was never written yields the space cell and never fails.  The bounding box
//! of everything written so far is the sole input to the wraparound rule, so
//! a `put` that grows the box immediately changes how pointers wrap.

pub mod cell;
pub mod space;
pub mod stack;
