//! # Introduction
//!
//! befrust is the core of a Befunge-98 interpreter: a sparse two-dimensional
//! program memory ("Funge-space"), any number of concurrently executing
//! instruction pointers each carrying a stack of stacks, and a deterministic
//! round-robin scheduler.  The host embeds it through an owned
//! [`interpreter::engine::Interpreter`] value and a set of synchronous I/O
//! callbacks; there is no global state, so several interpreters can coexist.
//!
//! ## Execution pipeline
//!
//! ```text
//! Source bytes → Funge-space → Scheduler → Dispatch → Host I/O
//! ```
//!
//! 1. [`memory`] — the program memory model: [`memory::cell::Cell`] values in
//!    a sparse [`memory::space::FungeSpace`] with a cached bounding box, and
//!    the per-pointer [`memory::stack::StackStack`].
//! 2. [`interpreter`] — the execution engine: instruction pointers, the full
//!    Befunge-98 dispatch table, and the tick scheduler.
//! 3. [`io`] — the host seam: [`io::HostIo`] callbacks for standard output,
//!    input and error output, plus a scripted implementation for tests.
//!
//! ## Language coverage
//!
//! The full Befunge-98 instruction set: arithmetic, logic, stack and
//! stack-stack manipulation, movement and flow control (including `;`, `#`,
//! `j` and `k`), string mode, relative space access (`g`/`p` under a storage
//! offset), concurrency (`t`), sysinfo (`y`) and program exit (`q`).
//! File, shell and fingerprint instructions reflect: those are host
//! capabilities the core does not carry.

pub mod interpreter;
pub mod io;
pub mod memory;
