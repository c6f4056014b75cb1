//! Error types for loading and execution
//!
//! This module defines [`LoadError`] for failures while placing source text
//! into Funge-space, and [`RuntimeError`] for the (rare) fatal conditions
//! during execution.  Almost nothing in Befunge-98 is an error at runtime:
//! bad instructions reflect, empty stacks pop 0, and I/O failures halt only
//! the issuing pointer.

use crate::memory::cell::Cell;
use crate::memory::space::Vector;
use std::fmt;

/// Errors while loading source text into Funge-space
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// Source bytes are not valid UTF-8 (Unicode cell mode only)
    InvalidUtf8 { valid_up_to: usize },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::InvalidUtf8 { valid_up_to } => {
                write!(
                    f,
                    "Source is not valid UTF-8 (valid up to byte {})",
                    valid_up_to
                )
            }
        }
    }
}

impl std::error::Error for LoadError {}

/// Fatal runtime errors that abort the whole run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// A pointer cycled through marker instructions without ever reaching
    /// an executable one (e.g. a program consisting only of `;;`)
    NoProgress { ip: Cell, position: Vector },
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::NoProgress { ip, position } => {
                write!(
                    f,
                    "Pointer {} makes no progress at ({}, {})",
                    ip, position.x, position.y
                )
            }
        }
    }
}

impl std::error::Error for RuntimeError {}
