//! The interpreter and its scheduler
//!
//! [`Interpreter`] owns the Funge-space, the live instruction pointers and
//! the host I/O adapter.  [`Interpreter::run`] drives execution in rounds:
//! each pass gives every pointer one tick, in list order, so concurrent
//! programs behave identically on every run.
//!
//! Within a tick, zero-cost instructions (blank cells and `;` sections) are
//! resolved immediately and the next real instruction executes in the same
//! tick.  A pointer that only ever crosses zero-cost cells would spin
//! forever; the engine detects the cycle and aborts with
//! [`RuntimeError::NoProgress`].

use std::str;

use crate::io::{CellMode, HostIo, IoAdapter};
use crate::memory::cell::Cell;
use crate::memory::space::{FungeSpace, Vector};

use super::dispatch::{self, Action};
use super::errors::{LoadError, RuntimeError};
use super::ip::InstructionPointer;

/// A Befunge-98 interpreter bound to one host.
pub struct Interpreter {
    space: FungeSpace,
    ips: Vec<InstructionPointer>,
    next_ip_id: Cell,
    io: IoAdapter,
}

impl Interpreter {
    /// A fresh interpreter with an empty space and a single pointer at the
    /// origin, heading east.
    pub fn new(mode: CellMode, host: Box<dyn HostIo>) -> Self {
        Interpreter {
            space: FungeSpace::new(),
            ips: vec![InstructionPointer::new(0)],
            next_ip_id: 1,
            io: IoAdapter::new(mode, host),
        }
    }

    /// Place source text into the space at the origin.  In Unicode cell mode
    /// the source must be valid UTF-8; in byte mode every byte is a cell.
    pub fn load_source(&mut self, src: &[u8]) -> Result<(), LoadError> {
        match self.io.mode() {
            CellMode::Unicode => {
                let text = str::from_utf8(src).map_err(|e| LoadError::InvalidUtf8 {
                    valid_up_to: e.valid_up_to(),
                })?;
                self.space.load(text, Vector::ORIGIN);
            }
            CellMode::Byte => self.space.load_bytes(src, Vector::ORIGIN),
        }
        Ok(())
    }

    pub fn space(&self) -> &FungeSpace {
        &self.space
    }

    pub fn space_mut(&mut self) -> &mut FungeSpace {
        &mut self.space
    }

    /// The live pointers, in scheduling order.
    pub fn ips(&self) -> &[InstructionPointer] {
        &self.ips
    }

    pub fn cell_mode(&self) -> CellMode {
        self.io.mode()
    }

    /// Run until every pointer has halted or one executes `q`.  Returns the
    /// program's exit code: 0 on normal completion, or the value popped by
    /// `q`.
    pub fn run(&mut self) -> Result<i32, RuntimeError> {
        loop {
            if self.ips.is_empty() {
                return Ok(0);
            }

            let mut stopped: Vec<usize> = Vec::new();
            let mut spawned: Vec<(usize, InstructionPointer)> = Vec::new();

            for idx in 0..self.ips.len() {
                match self.tick(idx, &mut spawned)? {
                    TickResult::Running => {}
                    TickResult::Halted => stopped.push(idx),
                    TickResult::Quit(code) => return Ok(code as i32),
                }
            }

            if !stopped.is_empty() || !spawned.is_empty() {
                self.apply_changes(&stopped, spawned);
            }
        }
    }

    /// One tick for one pointer: advance if due, then execute instructions
    /// until one of them costs a tick.
    fn tick(
        &mut self,
        idx: usize,
        spawned: &mut Vec<(usize, InstructionPointer)>,
    ) -> Result<TickResult, RuntimeError> {
        // Positions of zero-cost instructions seen this tick; revisiting one
        // means the pointer can never reach a real instruction.
        let mut trail: Vec<Vector> = Vec::new();
        loop {
            let ip = &mut self.ips[idx];
            if ip.must_advance {
                match self.space.step(ip.position, ip.delta) {
                    Some((pos, _)) => {
                        ip.position = pos;
                        ip.must_advance = false;
                    }
                    // Nowhere to go at all: the pointer's line is empty
                    None => return Ok(TickResult::Halted),
                }
            }

            let raw = self.space.get(self.ips[idx].position);
            match dispatch::execute(raw, &mut self.ips[idx], &mut self.space, &mut self.io) {
                Action::Continue => {
                    self.ips[idx].must_advance = true;
                    return Ok(TickResult::Running);
                }
                Action::Skip => {
                    let ip = &mut self.ips[idx];
                    ip.must_advance = true;
                    if trail.contains(&ip.position) {
                        return Err(RuntimeError::NoProgress {
                            ip: ip.id,
                            position: ip.position,
                        });
                    }
                    trail.push(ip.position);
                }
                Action::Stop => return Ok(TickResult::Halted),
                Action::Quit(code) => return Ok(TickResult::Quit(code)),
                Action::Fork(n) => {
                    self.ips[idx].must_advance = true;
                    for _ in 0..n {
                        if let Some(child) = self.fork_child(idx) {
                            spawned.push((idx, child));
                        }
                    }
                    return Ok(TickResult::Running);
                }
            }
        }
    }

    /// Clone a child off the pointer at `idx`: reversed delta, own id, moved
    /// one step so it does not re-execute the fork.  A child with nowhere to
    /// go is never born.
    fn fork_child(&mut self, idx: usize) -> Option<InstructionPointer> {
        let parent = &self.ips[idx];
        let mut child = parent.clone();
        child.delta = -parent.delta;
        let (pos, _) = self.space.step(child.position, child.delta)?;
        child.position = pos;
        child.must_advance = false;
        child.id = self.next_ip_id;
        self.next_ip_id += 1;
        Some(child)
    }

    /// Rebuild the pointer list after a pass: drop halted pointers and slot
    /// each child in right after its parent.  Children keep their place even
    /// when the parent halted in the same pass.
    fn apply_changes(&mut self, stopped: &[usize], spawned: Vec<(usize, InstructionPointer)>) {
        let old = std::mem::take(&mut self.ips);
        let mut children = spawned.into_iter().peekable();
        for (idx, ip) in old.into_iter().enumerate() {
            if !stopped.contains(&idx) {
                self.ips.push(ip);
            }
            while children.peek().is_some_and(|(parent, _)| *parent == idx) {
                if let Some((_, child)) = children.next() {
                    self.ips.push(child);
                }
            }
        }
    }
}

enum TickResult {
    Running,
    Halted,
    Quit(Cell),
}
