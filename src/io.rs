//! Host I/O seam
//!
//! The interpreter core never touches stdin/stdout itself; every I/O
//! instruction is forwarded synchronously through a host-supplied [`HostIo`]
//! implementation:
//! - [`CallbackIo`]: adapts three plain callbacks returning signed counts
//!   (the classic embedding contract: negative = failure, 0 = end-of-input)
//! - [`ScriptedIo`]: records output and replays scripted input, for tests
//!
//! [`IoAdapter`] sits between dispatch and the host: it applies the cell
//! mode (byte vs Unicode) to character I/O, formats numeric output, and
//! collapses the host's byte-level results into per-instruction outcomes.
//! A failing callback halts only the issuing instruction pointer; end of
//! input is a value (-1), not a failure.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;
use std::str;

use crate::memory::cell::{self, Cell};

/// How cells map to bytes at the load and I/O boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellMode {
    /// One byte per cell; character output emits the low byte.
    Byte,
    /// Cells hold Unicode scalar values; sources and character I/O are UTF-8.
    Unicode,
}

/// Synchronous host callbacks for the three standard streams.
///
/// `Ok(0)` from [`HostIo::read_input`] signals end-of-input.  Any `Err`
/// terminates the issuing instruction pointer only; sibling pointers keep
/// running.
pub trait HostIo {
    /// Standard output.  Returns the number of bytes accepted.
    fn write_output(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Standard input.  Returns the number of bytes read, `Ok(0)` at
    /// end-of-input.
    fn read_input(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Error/diagnostic output (e.g. unknown-instruction warnings).
    fn write_error(&mut self, buf: &[u8]) -> io::Result<usize>;
}

/// Output callback: receives a byte span, returns a signed count
/// (negative = write failure).
pub type WriteCallback = Box<dyn FnMut(&[u8]) -> isize>;

/// Input callback: fills a buffer, returns bytes read, 0 for end-of-input,
/// negative for failure.
pub type ReadCallback = Box<dyn FnMut(&mut [u8]) -> isize>;

/// [`HostIo`] over three plain callbacks.
pub struct CallbackIo {
    out: WriteCallback,
    inp: ReadCallback,
    err: WriteCallback,
}

impl CallbackIo {
    pub fn new(out: WriteCallback, inp: ReadCallback, err: WriteCallback) -> Self {
        CallbackIo { out, inp, err }
    }
}

fn count_to_result(n: isize) -> io::Result<usize> {
    if n < 0 {
        Err(io::Error::new(io::ErrorKind::Other, "host callback failed"))
    } else {
        Ok(n as usize)
    }
}

impl HostIo for CallbackIo {
    fn write_output(&mut self, buf: &[u8]) -> io::Result<usize> {
        count_to_result((self.out)(buf))
    }

    fn read_input(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        count_to_result((self.inp)(buf))
    }

    fn write_error(&mut self, buf: &[u8]) -> io::Result<usize> {
        count_to_result((self.err)(buf))
    }
}

#[derive(Default)]
struct ScriptedBuffers {
    input: VecDeque<u8>,
    output: Vec<u8>,
    errors: Vec<u8>,
}

/// A scripted host for tests: input is replayed from a fixed buffer, output
/// and errors are captured.  Cloning shares the buffers, so a test can keep
/// a handle while the interpreter owns the other.
#[derive(Clone, Default)]
pub struct ScriptedIo {
    buffers: Rc<RefCell<ScriptedBuffers>>,
}

impl ScriptedIo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(input: &[u8]) -> Self {
        let io = Self::new();
        io.buffers.borrow_mut().input.extend(input);
        io
    }

    pub fn output(&self) -> Vec<u8> {
        self.buffers.borrow().output.clone()
    }

    pub fn output_string(&self) -> String {
        String::from_utf8_lossy(&self.buffers.borrow().output).into_owned()
    }

    pub fn errors_string(&self) -> String {
        String::from_utf8_lossy(&self.buffers.borrow().errors).into_owned()
    }
}

impl HostIo for ScriptedIo {
    fn write_output(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffers.borrow_mut().output.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn read_input(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut buffers = self.buffers.borrow_mut();
        let mut n = 0;
        while n < buf.len() {
            match buffers.input.pop_front() {
                Some(b) => {
                    buf[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }

    fn write_error(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffers.borrow_mut().errors.extend_from_slice(buf);
        Ok(buf.len())
    }
}

/// Result of one input instruction, as seen by dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReadOutcome {
    /// A value was read.
    Value(Cell),
    /// End-of-input: the instruction pushes -1.
    Eof,
    /// Undecodable or unparseable input: the instruction reflects.
    Invalid,
    /// The host callback failed: the issuing pointer halts.
    Failed,
}

/// Mode-aware bridge between instruction dispatch and the host callbacks.
pub struct IoAdapter {
    mode: CellMode,
    host: Box<dyn HostIo>,
}

impl IoAdapter {
    pub fn new(mode: CellMode, host: Box<dyn HostIo>) -> Self {
        IoAdapter { mode, host }
    }

    pub fn mode(&self) -> CellMode {
        self.mode
    }

    /// Write a cell as a decimal number followed by a single space (`.`).
    /// Returns false on host failure.
    pub(crate) fn write_number(&mut self, v: Cell) -> bool {
        self.write_all(format!("{} ", v).as_bytes())
    }

    /// Write a cell as a character (`,`).  Returns false on host failure.
    pub(crate) fn write_char(&mut self, v: Cell) -> bool {
        match self.mode {
            CellMode::Byte => self.write_all(&[(v & 0xff) as u8]),
            CellMode::Unicode => {
                let mut buf = [0u8; 4];
                let s = cell::to_char_lossy(v).encode_utf8(&mut buf);
                let bytes = s.as_bytes().to_owned();
                self.write_all(&bytes)
            }
        }
    }

    /// Best-effort diagnostic line on the error stream.
    pub(crate) fn warn(&mut self, msg: &str) {
        let mut line = msg.to_owned();
        line.push('\n');
        let mut buf = line.as_bytes();
        while !buf.is_empty() {
            match self.host.write_error(buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => buf = &buf[n..],
            }
        }
    }

    /// Read one character as a cell (`~`): a byte in byte mode, one UTF-8
    /// scalar in Unicode mode.
    pub(crate) fn read_cell(&mut self) -> ReadOutcome {
        match self.mode {
            CellMode::Byte => match self.read_byte() {
                Ok(Some(b)) => ReadOutcome::Value(b as Cell),
                Ok(None) => ReadOutcome::Eof,
                Err(_) => ReadOutcome::Failed,
            },
            CellMode::Unicode => {
                let mut buf = Vec::with_capacity(4);
                loop {
                    match self.read_byte() {
                        Ok(Some(b)) => buf.push(b),
                        Ok(None) => {
                            return if buf.is_empty() {
                                ReadOutcome::Eof
                            } else {
                                ReadOutcome::Invalid
                            };
                        }
                        Err(_) => return ReadOutcome::Failed,
                    }
                    match str::from_utf8(&buf) {
                        Ok(s) => {
                            let c = s.chars().next().expect("non-empty decode");
                            return ReadOutcome::Value(c as Cell);
                        }
                        // None: the prefix is valid but incomplete
                        Err(e) if e.error_len().is_none() => continue,
                        Err(_) => return ReadOutcome::Invalid,
                    }
                }
            }
        }
    }

    /// Read a line and parse it as a decimal number (`&`).
    pub(crate) fn read_number(&mut self) -> ReadOutcome {
        let mut line = Vec::new();
        loop {
            match self.read_byte() {
                Ok(Some(b'\n')) => break,
                Ok(Some(b)) => line.push(b),
                Ok(None) => {
                    if line.is_empty() {
                        return ReadOutcome::Eof;
                    }
                    break;
                }
                Err(_) => return ReadOutcome::Failed,
            }
        }
        match str::from_utf8(&line).ok().and_then(|s| s.trim().parse::<Cell>().ok()) {
            Some(v) => ReadOutcome::Value(v),
            None => ReadOutcome::Invalid,
        }
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match self.host.read_input(&mut buf)? {
            0 => Ok(None),
            _ => Ok(Some(buf[0])),
        }
    }

    fn write_all(&mut self, mut buf: &[u8]) -> bool {
        while !buf.is_empty() {
            match self.host.write_output(buf) {
                Ok(0) | Err(_) => return false,
                Ok(n) => buf = &buf[n.min(buf.len())..],
            }
        }
        true
    }
}
