//! Instruction dispatch
//!
//! [`execute`] runs a single instruction against one pointer, the shared
//! space and the host streams, and reports the scheduling consequence as an
//! [`Action`].  The table covers the full Befunge-98 core set; anything
//! outside it (fingerprints, file and system instructions) reflects.
//!
//! Error policy follows the language, not the host: undefined instructions
//! reflect with a diagnostic on the error stream, arithmetic by zero yields
//! zero, and only a failing host stream stops a pointer.

use rand::Rng;

use crate::io::{IoAdapter, ReadOutcome};
use crate::memory::cell::{self, Cell, SPACE};
use crate::memory::space::{FungeSpace, Vector};

use super::ip::InstructionPointer;

/// What the scheduler should do after one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    /// Advance and carry on next tick.
    Continue,
    /// The instruction took zero ticks; advance and execute again now.
    Skip,
    /// This pointer is done.
    Stop,
    /// Split off this many child pointers.
    Fork(u32),
    /// Stop the whole program with this exit code.
    Quit(Cell),
}

/// Execute the instruction `raw` for one pointer.
pub(crate) fn execute(
    raw: Cell,
    ip: &mut InstructionPointer,
    space: &mut FungeSpace,
    io: &mut IoAdapter,
) -> Action {
    if ip.string_mode {
        return execute_string_mode(raw, ip, space);
    }

    let c = match cell::to_char(raw) {
        Some(c) => c,
        None => return unknown(raw, ip, io),
    };

    match c {
        ' ' => Action::Skip,
        'z' => Action::Continue,
        '@' => Action::Stop,
        't' => Action::Fork(1),
        'q' => Action::Quit(ip.pop()),

        '0'..='9' => {
            ip.push(raw - '0' as Cell);
            Action::Continue
        }
        'a'..='f' => {
            ip.push(raw - 'a' as Cell + 10);
            Action::Continue
        }

        '"' => {
            ip.string_mode = true;
            Action::Continue
        }
        // Fetch/store the next cell in the path, space or not, and hop
        // over it.
        '\'' => {
            let loc = ip.position + ip.delta;
            ip.push(space.get(loc));
            ip.position = loc;
            Action::Continue
        }
        's' => {
            let loc = ip.position + ip.delta;
            let v = ip.pop();
            space.put(loc, v);
            ip.position = loc;
            Action::Continue
        }

        '+' | '-' | '*' | '/' | '%' => {
            let b = ip.pop();
            let a = ip.pop();
            ip.push(match c {
                '+' => a.wrapping_add(b),
                '-' => a.wrapping_sub(b),
                '*' => a.wrapping_mul(b),
                '/' if b == 0 => 0,
                '/' => a.wrapping_div(b),
                '%' if b == 0 => 0,
                _ => a.wrapping_rem(b),
            });
            Action::Continue
        }
        '`' => {
            let b = ip.pop();
            let a = ip.pop();
            ip.push((a > b) as Cell);
            Action::Continue
        }
        '!' => {
            let v = ip.pop();
            ip.push((v == 0) as Cell);
            Action::Continue
        }

        ':' => {
            let v = ip.pop();
            ip.push(v);
            ip.push(v);
            Action::Continue
        }
        '\\' => {
            let b = ip.pop();
            let a = ip.pop();
            ip.push(b);
            ip.push(a);
            Action::Continue
        }
        '$' => {
            ip.pop();
            Action::Continue
        }
        'n' => {
            ip.stacks.toss_mut().clear();
            Action::Continue
        }

        '>' => set_delta(ip, Vector::EAST),
        '<' => set_delta(ip, Vector::WEST),
        '^' => set_delta(ip, Vector::NORTH),
        'v' => set_delta(ip, Vector::SOUTH),
        '?' => {
            let dirs = [Vector::EAST, Vector::WEST, Vector::NORTH, Vector::SOUTH];
            set_delta(ip, dirs[rand::thread_rng().gen_range(0..4)])
        }
        'r' => {
            ip.reflect();
            Action::Continue
        }
        '[' => {
            ip.delta = ip.delta.turned_left();
            Action::Continue
        }
        ']' => {
            ip.delta = ip.delta.turned_right();
            Action::Continue
        }
        'x' => {
            ip.delta = ip.pop_vector();
            Action::Continue
        }
        '_' => {
            let v = ip.pop();
            set_delta(ip, if v == 0 { Vector::EAST } else { Vector::WEST })
        }
        '|' => {
            let v = ip.pop();
            set_delta(ip, if v == 0 { Vector::SOUTH } else { Vector::NORTH })
        }
        'w' => {
            let b = ip.pop();
            let a = ip.pop();
            if a < b {
                ip.delta = ip.delta.turned_left();
            } else if a > b {
                ip.delta = ip.delta.turned_right();
            }
            Action::Continue
        }

        '#' => {
            // Hop over the next cell; movement afterwards skips spaces as
            // usual.
            ip.position = ip.position + ip.delta;
            Action::Continue
        }
        'j' => {
            let n = ip.pop();
            ip.position = ip.position + ip.delta * n;
            Action::Continue
        }
        ';' => {
            // Takes zero ticks: slide to the matching marker and re-dispatch.
            let mut pos = ip.position;
            loop {
                match space.step(pos, ip.delta) {
                    Some((next, v)) => {
                        pos = next;
                        if v == ';' as Cell {
                            break;
                        }
                    }
                    None => return Action::Stop,
                }
            }
            ip.position = pos;
            Action::Skip
        }

        'g' => {
            let v = ip.pop_vector();
            ip.push(space.get(v + ip.storage_offset));
            Action::Continue
        }
        'p' => {
            let v = ip.pop_vector();
            let value = ip.pop();
            space.put(v + ip.storage_offset, value);
            Action::Continue
        }

        '.' => {
            let v = ip.pop();
            if io.write_number(v) {
                Action::Continue
            } else {
                Action::Stop
            }
        }
        ',' => {
            let v = ip.pop();
            if io.write_char(v) {
                Action::Continue
            } else {
                Action::Stop
            }
        }
        '~' => read_result(ip, io.read_cell()),
        '&' => read_result(ip, io.read_number()),

        '{' => {
            let n = ip.pop();
            ip.begin_block(n);
            Action::Continue
        }
        '}' => {
            if ip.stacks.depth() > 1 {
                let n = ip.pop();
                ip.end_block(n);
            } else {
                ip.reflect();
            }
            Action::Continue
        }
        'u' => {
            if ip.stacks.depth() > 1 {
                let n = ip.pop();
                ip.transfer(n);
            } else {
                ip.reflect();
            }
            Action::Continue
        }

        'y' => {
            let n = ip.pop();
            let cells = sysinfo(ip, space);
            if n <= 0 {
                for &v in cells.iter().rev() {
                    ip.push(v);
                }
            } else if (n as usize) <= cells.len() {
                ip.push(cells[n as usize - 1]);
            } else {
                // Picks reach through the info into the pointer's own stack;
                // past both, nothing is pushed
                let k = n as usize - cells.len() - 1;
                if k < ip.stacks.toss().len() {
                    let v = ip.stacks.toss().peek_n(k);
                    ip.push(v);
                }
            }
            Action::Continue
        }

        'k' => iterate(ip, space, io),

        // Recognized but unsupported: file, system and fingerprint
        // instructions reflect silently.
        '(' | ')' | 'i' | 'o' | '=' => {
            ip.reflect();
            Action::Continue
        }

        _ => unknown(raw, ip, io),
    }
}

fn set_delta(ip: &mut InstructionPointer, delta: Vector) -> Action {
    ip.delta = delta;
    Action::Continue
}

fn unknown(raw: Cell, ip: &mut InstructionPointer, io: &mut IoAdapter) -> Action {
    ip.reflect();
    match cell::to_char(raw) {
        Some(c) => io.warn(&format!("Unknown instruction: '{}' ({})", c, raw)),
        None => io.warn(&format!("Unknown instruction: {}", raw)),
    }
    Action::Continue
}

fn read_result(ip: &mut InstructionPointer, outcome: ReadOutcome) -> Action {
    match outcome {
        ReadOutcome::Value(v) => {
            ip.push(v);
            Action::Continue
        }
        ReadOutcome::Eof => {
            ip.push(-1);
            Action::Continue
        }
        ReadOutcome::Invalid => {
            ip.reflect();
            Action::Continue
        }
        ReadOutcome::Failed => Action::Stop,
    }
}

/// String mode: every cell is pushed literally until the closing quote.
///
/// Movement between instructions has already skipped any run of blank cells,
/// so a blank cell just behind the current one means a run was crossed; it
/// collapses to a single pushed space.
fn execute_string_mode(raw: Cell, ip: &mut InstructionPointer, space: &FungeSpace) -> Action {
    if ip.delta != Vector::ORIGIN && space.get(ip.position - ip.delta) == SPACE {
        ip.push(SPACE);
    }
    if raw == '"' as Cell {
        ip.string_mode = false;
    } else {
        ip.push(raw);
    }
    Action::Continue
}

/// `k`: locate the next instruction in the path (crossing `;` sections) and
/// execute it `n` extra times in place.  The pointer does not hop over the
/// target, so the normal flow runs it once more afterwards; `0k` instead
/// slides onto the target so the following advance passes it by.
fn iterate(ip: &mut InstructionPointer, space: &mut FungeSpace, io: &mut IoAdapter) -> Action {
    let n = ip.pop();
    if n < 0 {
        ip.reflect();
        return Action::Continue;
    }

    let mut scan = ip.position;
    let (target_pos, target) = loop {
        match space.step(scan, ip.delta) {
            Some((pos, v)) if v == ';' as Cell => {
                scan = pos;
                loop {
                    match space.step(scan, ip.delta) {
                        Some((next, v)) => {
                            scan = next;
                            if v == ';' as Cell {
                                break;
                            }
                        }
                        None => return Action::Stop,
                    }
                }
            }
            Some(found) => break found,
            None => return Action::Stop,
        }
    };

    if n == 0 {
        ip.position = target_pos;
        return Action::Continue;
    }

    let mut forks = 0u32;
    for _ in 0..n {
        match execute(target, ip, space, io) {
            Action::Continue | Action::Skip => {}
            Action::Fork(k) => forks += k,
            action @ (Action::Stop | Action::Quit(_)) => return action,
        }
    }
    if forks > 0 {
        Action::Fork(forks)
    } else {
        Action::Continue
    }
}

/// The 20 sysinfo sections, top of stack first.
fn sysinfo(ip: &InstructionPointer, space: &FungeSpace) -> Vec<Cell> {
    let version = env!("CARGO_PKG_VERSION_MAJOR").parse::<Cell>().unwrap_or(0) * 1_000_000
        + env!("CARGO_PKG_VERSION_MINOR").parse::<Cell>().unwrap_or(0) * 1_000
        + env!("CARGO_PKG_VERSION_PATCH").parse::<Cell>().unwrap_or(0);
    let (least, greatest) = match space.bounds() {
        Some(b) => (b.min, b.max - b.min),
        None => (Vector::ORIGIN, Vector::ORIGIN),
    };

    let mut cells = vec![
        0x01,                              // flags: concurrent execution only
        std::mem::size_of::<Cell>() as Cell,
        0x4246_5253,                       // handprint "BFRS"
        version,
        0,                                 // no operating paradigm
        std::path::MAIN_SEPARATOR as Cell,
        2,                                 // rank
        ip.id,
        0,                                 // team
        ip.position.y,
        ip.position.x,
        ip.delta.y,
        ip.delta.x,
        ip.storage_offset.y,
        ip.storage_offset.x,
        least.y,
        least.x,
        greatest.y,
        greatest.x,
        0, // date unavailable
        0, // time unavailable
        ip.stacks.depth() as Cell,
    ];
    // Stack sizes, top stack first
    for stack in ip.stacks.stacks().iter().rev() {
        cells.push(stack.len() as Cell);
    }
    // Empty argument and environment lists
    cells.extend([0, 0, 0, 0]);
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{CellMode, IoAdapter, ScriptedIo};

    fn fixture() -> (InstructionPointer, FungeSpace, IoAdapter, ScriptedIo) {
        let script = ScriptedIo::new();
        let io = IoAdapter::new(CellMode::Unicode, Box::new(script.clone()));
        (InstructionPointer::new(0), FungeSpace::new(), io, script)
    }

    fn run(c: char, ip: &mut InstructionPointer, space: &mut FungeSpace, io: &mut IoAdapter) -> Action {
        execute(c as Cell, ip, space, io)
    }

    #[test]
    fn test_division_by_zero_yields_zero() {
        let (mut ip, mut space, mut io, _) = fixture();
        ip.push(5);
        ip.push(0);
        run('/', &mut ip, &mut space, &mut io);
        assert_eq!(ip.pop(), 0);
        ip.push(5);
        ip.push(0);
        run('%', &mut ip, &mut space, &mut io);
        assert_eq!(ip.pop(), 0);
    }

    #[test]
    fn test_turns_and_compare() {
        let (mut ip, mut space, mut io, _) = fixture();
        run('[', &mut ip, &mut space, &mut io);
        assert_eq!(ip.delta, Vector::NORTH);
        run(']', &mut ip, &mut space, &mut io);
        assert_eq!(ip.delta, Vector::EAST);

        ip.push(1);
        ip.push(2); // a < b: left
        run('w', &mut ip, &mut space, &mut io);
        assert_eq!(ip.delta, Vector::NORTH);
        ip.delta = Vector::EAST;
        ip.push(2);
        ip.push(2); // equal: straight
        run('w', &mut ip, &mut space, &mut io);
        assert_eq!(ip.delta, Vector::EAST);
    }

    #[test]
    fn test_storage_offset_applies_to_g_and_p() {
        let (mut ip, mut space, mut io, _) = fixture();
        ip.storage_offset = Vector::new(10, 20);
        ip.push('Q' as Cell);
        ip.push(1); // x
        ip.push(2); // y
        run('p', &mut ip, &mut space, &mut io);
        assert_eq!(space.get(Vector::new(11, 22)), 'Q' as Cell);

        ip.push(1);
        ip.push(2);
        run('g', &mut ip, &mut space, &mut io);
        assert_eq!(ip.pop(), 'Q' as Cell);
    }

    #[test]
    fn test_unknown_reflects_and_warns() {
        let (mut ip, mut space, mut io, script) = fixture();
        let action = run('N', &mut ip, &mut space, &mut io);
        assert_eq!(action, Action::Continue);
        assert_eq!(ip.delta, Vector::WEST);
        assert!(script.errors_string().contains("Unknown instruction"));
    }

    #[test]
    fn test_block_end_reflects_on_single_stack() {
        let (mut ip, mut space, mut io, _) = fixture();
        ip.push(3);
        run('}', &mut ip, &mut space, &mut io);
        assert_eq!(ip.delta, Vector::WEST);
        // The count stays put when the instruction reflects
        assert_eq!(ip.pop(), 3);
    }

    #[test]
    fn test_sysinfo_single_pick() {
        let (mut ip, mut space, mut io, _) = fixture();
        space.put(Vector::new(2, 1), '@' as Cell);
        ip.push(2); // cell size
        run('y', &mut ip, &mut space, &mut io);
        assert_eq!(ip.pop(), std::mem::size_of::<Cell>() as Cell);
        assert!(ip.stacks.toss().is_empty());

        // A pick past the info reads the pointer's own stack
        ip.push(99);
        let info_len = sysinfo(&ip, &space).len() as Cell;
        ip.push(info_len + 1);
        run('y', &mut ip, &mut space, &mut io);
        assert_eq!(ip.pop(), 99);

        // Past the info and the stack alike, the pick pushes nothing
        ip.push(info_len + 50);
        run('y', &mut ip, &mut space, &mut io);
        assert_eq!(ip.stacks.toss().as_slice(), &[99]);
    }

    #[test]
    fn test_sysinfo_full_dump_order() {
        let (mut ip, mut space, mut io, _) = fixture();
        space.put(Vector::new(4, 3), '@' as Cell);
        space.put(Vector::new(-1, 0), '#' as Cell);
        ip.push(0);
        run('y', &mut ip, &mut space, &mut io);
        assert_eq!(ip.pop(), 0x01); // flags on top
        assert_eq!(ip.pop(), std::mem::size_of::<Cell>() as Cell);
        assert_eq!(ip.pop(), 0x4246_5253);
    }

    #[test]
    fn test_string_mode_collapses_blank_runs() {
        let (mut ip, mut space, mut io, _) = fixture();
        space.load("\"a   b\"", Vector::ORIGIN);
        ip.string_mode = true;
        ip.position = Vector::new(1, 0);
        run('a', &mut ip, &mut space, &mut io);
        ip.position = Vector::new(5, 0);
        run('b', &mut ip, &mut space, &mut io);
        ip.position = Vector::new(6, 0);
        run('"', &mut ip, &mut space, &mut io);
        assert!(!ip.string_mode);
        assert_eq!(ip.stacks.toss().as_slice(), &['a' as Cell, SPACE, 'b' as Cell]);
    }
}
