//! Sparse two-dimensional Funge-space
//!
//! This module provides:
//! - [`Vector`]: a 2D integer coordinate, used for positions, deltas and
//!   storage offsets alike
//! - [`Bounds`]: the bounding box of everything written so far
//! - [`FungeSpace`]: the sparse cell map with the Lahey-space movement rule
//!
//! # Wraparound ("Lahey-space")
//!
//! An instruction pointer travels along the integer line `from + n * delta`.
//! [`FungeSpace::step`] returns the nearest in-bounds, non-space point ahead
//! of `from` on that line; when nothing lies ahead, the pointer re-enters
//! from the opposite edge of the bounding box, i.e. at the line's smallest
//! in-bounds `n`.  The result is a pure function of the stored cells, so it
//! is valid immediately after any `put` that changes the box.

use rustc_hash::FxHashMap;
use std::ops::{Add, Mul, Neg, Sub};

use super::cell::{Cell, SPACE};

/// A 2D coordinate or movement delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Vector {
    pub x: i64,
    pub y: i64,
}

impl Vector {
    pub const ORIGIN: Vector = Vector { x: 0, y: 0 };
    pub const EAST: Vector = Vector { x: 1, y: 0 };
    pub const WEST: Vector = Vector { x: -1, y: 0 };
    pub const SOUTH: Vector = Vector { x: 0, y: 1 };
    pub const NORTH: Vector = Vector { x: 0, y: -1 };

    pub fn new(x: i64, y: i64) -> Self {
        Vector { x, y }
    }

    /// Rotate 90° counterclockwise (`[` in screen coordinates, y down).
    pub fn turned_left(self) -> Self {
        Vector::new(self.y, -self.x)
    }

    /// Rotate 90° clockwise (`]` in screen coordinates, y down).
    pub fn turned_right(self) -> Self {
        Vector::new(-self.y, self.x)
    }
}

impl Add for Vector {
    type Output = Vector;
    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x.wrapping_add(rhs.x), self.y.wrapping_add(rhs.y))
    }
}

impl Sub for Vector {
    type Output = Vector;
    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.x.wrapping_sub(rhs.x), self.y.wrapping_sub(rhs.y))
    }
}

impl Mul<i64> for Vector {
    type Output = Vector;
    fn mul(self, rhs: i64) -> Vector {
        Vector::new(self.x.wrapping_mul(rhs), self.y.wrapping_mul(rhs))
    }
}

impl Neg for Vector {
    type Output = Vector;
    fn neg(self) -> Vector {
        Vector::new(-self.x, -self.y)
    }
}

/// Inclusive bounding box of all non-space cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: Vector,
    pub max: Vector,
}

impl Bounds {
    pub fn contains(&self, p: Vector) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Sparse Funge-space: only non-space cells are stored.
#[derive(Debug, Clone, Default)]
pub struct FungeSpace {
    cells: FxHashMap<Vector, Cell>,
    bounds: Option<Bounds>,
}

impl FungeSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a cell.  Unwritten coordinates yield [`SPACE`]; this never fails.
    pub fn get(&self, pos: Vector) -> Cell {
        self.cells.get(&pos).copied().unwrap_or(SPACE)
    }

    /// Write a cell, growing the bounding box if needed.  Writing the space
    /// value erases the entry (and may shrink the box).
    pub fn put(&mut self, pos: Vector, v: Cell) {
        if v == SPACE {
            if self.cells.remove(&pos).is_some() {
                // Only a boundary cell can change the box
                let on_edge = self.bounds.is_some_and(|b| {
                    pos.x == b.min.x || pos.x == b.max.x || pos.y == b.min.y || pos.y == b.max.y
                });
                if on_edge {
                    self.bounds = Self::compute_bounds(&self.cells);
                }
            }
        } else {
            self.cells.insert(pos, v);
            self.bounds = Some(match self.bounds {
                None => Bounds { min: pos, max: pos },
                Some(b) => Bounds {
                    min: Vector::new(b.min.x.min(pos.x), b.min.y.min(pos.y)),
                    max: Vector::new(b.max.x.max(pos.x), b.max.y.max(pos.y)),
                },
            });
        }
    }

    /// The bounding box of all non-space cells, or `None` if the space is
    /// empty.
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Number of non-space cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Load program text: row-major from `origin`, one row per line, spaces
    /// not stored.  Handles `\n` and `\r\n` line endings.
    pub fn load(&mut self, src: &str, origin: Vector) {
        for (y, line) in src.lines().enumerate() {
            for (x, c) in line.chars().enumerate() {
                if c != ' ' {
                    self.put(origin + Vector::new(x as i64, y as i64), c as Cell);
                }
            }
        }
    }

    /// Load raw bytes, one cell per byte (byte cell mode).
    pub fn load_bytes(&mut self, src: &[u8], origin: Vector) {
        for (y, line) in src.split(|&b| b == b'\n').enumerate() {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            for (x, &b) in line.iter().enumerate() {
                if b != b' ' {
                    self.put(origin + Vector::new(x as i64, y as i64), b as Cell);
                }
            }
        }
    }

    /// Move from `from` along `delta` to the next non-space cell, wrapping
    /// Lahey-style at the bounding box.  Returns `None` when the line through
    /// `from` holds no non-space cell at all (the pointer has nowhere to go).
    ///
    /// A zero delta returns the current cell, or `None` if it is space.
    pub fn step(&self, from: Vector, delta: Vector) -> Option<(Vector, Cell)> {
        self.bounds?;
        if delta == Vector::ORIGIN {
            let v = self.get(from);
            return (v != SPACE).then_some((from, v));
        }

        // Only stored cells can be landed on, so scan the map keys rather
        // than every lattice point: a single distant put can make the box
        // enormous.  Ahead of the current position first (smallest n > 0),
        // else wrap to the line's entry point on the far side of the box
        // (smallest n overall).
        let mut ahead: Option<(i64, Vector)> = None;
        let mut entry: Option<(i64, Vector)> = None;
        for &pos in self.cells.keys() {
            let n = match line_index(from, delta, pos) {
                Some(n) => n,
                None => continue,
            };
            let slot = if n >= 1 { &mut ahead } else { &mut entry };
            if slot.map_or(true, |(best, _)| n < best) {
                *slot = Some((n, pos));
            }
        }
        let (_, pos) = ahead.or(entry)?;
        Some((pos, self.get(pos)))
    }

    fn compute_bounds(cells: &FxHashMap<Vector, Cell>) -> Option<Bounds> {
        let mut keys = cells.keys();
        let first = *keys.next()?;
        let mut b = Bounds {
            min: first,
            max: first,
        };
        for k in keys {
            b.min.x = b.min.x.min(k.x);
            b.min.y = b.min.y.min(k.y);
            b.max.x = b.max.x.max(k.x);
            b.max.y = b.max.y.max(k.y);
        }
        Some(b)
    }
}

/// The `n` for which `from + n * delta == pos`, or `None` when `pos` does
/// not lie on the line.  Wrapping arithmetic throughout: positions and
/// deltas can sit anywhere in the integer range.
fn line_index(from: Vector, delta: Vector, pos: Vector) -> Option<i64> {
    let off = pos - from;
    let axis = |o: i64, d: i64| {
        if d == 0 {
            (o == 0).then_some(None)
        } else {
            (o.wrapping_rem(d) == 0).then(|| Some(o.wrapping_div(d)))
        }
    };
    match (axis(off.x, delta.x)?, axis(off.y, delta.y)?) {
        (Some(nx), Some(ny)) => (nx == ny).then_some(nx),
        (Some(n), None) | (None, Some(n)) => Some(n),
        // Both delta components zero is handled by the caller
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwritten_cells_read_as_space() {
        let space = FungeSpace::new();
        assert_eq!(space.get(Vector::ORIGIN), SPACE);
        assert_eq!(space.get(Vector::new(-5000, 9999)), SPACE);
        assert_eq!(space.bounds(), None);
    }

    #[test]
    fn test_put_get_and_bounds() {
        let mut space = FungeSpace::new();
        space.put(Vector::new(3, -2), 'x' as Cell);
        space.put(Vector::new(-1, 7), 'y' as Cell);
        assert_eq!(space.get(Vector::new(3, -2)), 'x' as Cell);
        let b = space.bounds().unwrap();
        assert_eq!(b.min, Vector::new(-1, -2));
        assert_eq!(b.max, Vector::new(3, 7));

        // Erasing a boundary cell shrinks the box
        space.put(Vector::new(-1, 7), SPACE);
        let b = space.bounds().unwrap();
        assert_eq!(b.min, Vector::new(3, -2));
        assert_eq!(b.max, Vector::new(3, -2));

        space.put(Vector::new(3, -2), SPACE);
        assert_eq!(space.bounds(), None);
    }

    #[test]
    fn test_load_layout() {
        let mut space = FungeSpace::new();
        space.load("1   5  8\n\n  a b    c\r\n A", Vector::ORIGIN);
        assert_eq!(space.get(Vector::new(0, 0)), '1' as Cell);
        assert_eq!(space.get(Vector::new(4, 0)), '5' as Cell);
        assert_eq!(space.get(Vector::new(2, 2)), 'a' as Cell);
        assert_eq!(space.get(Vector::new(9, 2)), 'c' as Cell);
        assert_eq!(space.get(Vector::new(1, 3)), 'A' as Cell);
        // Spaces are not stored
        assert_eq!(space.get(Vector::new(1, 0)), SPACE);
        assert_eq!(space.len(), 7);
    }

    #[test]
    fn test_step_and_wraparound() {
        let mut space = FungeSpace::new();
        space.load("1   5  8\n\n  a b    c\r\n A", Vector::ORIGIN);

        assert_eq!(
            space.step(Vector::new(2, 2), Vector::new(1, 1)),
            Some((Vector::new(0, 0), '1' as Cell))
        );
        assert_eq!(
            space.step(Vector::new(2, 2), Vector::new(-3, -3)),
            Some((Vector::new(2, 2), 'a' as Cell))
        );
        assert_eq!(
            space.step(Vector::new(0, 0), Vector::new(-2, 0)),
            Some((Vector::new(4, 0), '5' as Cell))
        );
        assert_eq!(
            space.step(Vector::new(4, 0), Vector::SOUTH),
            Some((Vector::new(4, 2), 'b' as Cell))
        );
        assert_eq!(
            space.step(Vector::new(7, 0), Vector::new(2, -1)),
            Some((Vector::new(1, 3), 'A' as Cell))
        );

        // Writes far away grow the box and change the wrap targets
        space.put(Vector::new(32000, 8000), '0' as Cell);
        space.put(Vector::new(32000, 2), '0' as Cell);
        assert_eq!(
            space.step(Vector::new(0, 0), Vector::new(4, 1)),
            Some((Vector::new(32000, 8000), '0' as Cell))
        );
        assert_eq!(
            space.step(Vector::new(32000, 8000), Vector::SOUTH),
            Some((Vector::new(32000, 2), '0' as Cell))
        );
        assert_eq!(
            space.step(Vector::new(32000, 2), Vector::WEST),
            Some((Vector::new(9, 2), 'c' as Cell))
        );

        let b = space.bounds().unwrap();
        assert_eq!(b.min, Vector::new(0, 0));
        assert_eq!(b.max, Vector::new(32000, 8000));
    }

    #[test]
    fn test_wrap_cycle_is_stable() {
        let mut space = FungeSpace::new();
        space.load("ab cd", Vector::ORIGIN);

        // With no intervening writes, stepping east revisits the same cycle
        let mut pos = Vector::new(0, 0);
        let mut cycle = Vec::new();
        for _ in 0..8 {
            let (next, _) = space.step(pos, Vector::EAST).unwrap();
            cycle.push(next);
            pos = next;
        }
        assert_eq!(cycle[0..4], cycle[4..8]);
        assert_eq!(
            cycle[0..4].iter().map(|p| p.x).collect::<Vec<_>>(),
            vec![1, 3, 4, 0]
        );
    }

    #[test]
    fn test_step_empty_line() {
        let mut space = FungeSpace::new();
        assert_eq!(space.step(Vector::ORIGIN, Vector::EAST), None);

        space.put(Vector::new(5, 5), '@' as Cell);
        // A row with no cells on it wraps nowhere
        assert_eq!(space.step(Vector::new(0, 0), Vector::EAST), None);
        // The row through the one cell cycles onto it
        assert_eq!(
            space.step(Vector::new(5, 5), Vector::EAST),
            Some((Vector::new(5, 5), '@' as Cell))
        );
    }

    #[test]
    fn test_step_distant_put_stays_fast() {
        let mut space = FungeSpace::new();
        space.put(Vector::new(0, 0), '@' as Cell);
        // A single far-away cell blows the box up to 2^40 wide; stepping
        // must not walk the gap cell by cell
        space.put(Vector::new(1 << 40, 0), '#' as Cell);
        assert_eq!(
            space.step(Vector::new(0, 0), Vector::EAST),
            Some((Vector::new(1 << 40, 0), '#' as Cell))
        );
        assert_eq!(
            space.step(Vector::new(1 << 40, 0), Vector::EAST),
            Some((Vector::new(0, 0), '@' as Cell))
        );
    }

    #[test]
    fn test_step_extreme_coordinates_do_not_overflow() {
        let mut space = FungeSpace::new();
        space.put(Vector::new(i64::MAX, i64::MIN), 'x' as Cell);
        space.put(Vector::new(0, 0), 'y' as Cell);
        // Positions and deltas driven to the integer extremes (wrapping
        // arithmetic fed to x/j can produce them) must not panic
        space.step(Vector::new(i64::MIN, i64::MAX), Vector::new(i64::MIN, -1));
        space.step(Vector::new(3, -3), Vector::new(i64::MAX, i64::MIN));
        assert_eq!(
            space.step(Vector::new(i64::MAX, i64::MIN), Vector::ORIGIN),
            Some((Vector::new(i64::MAX, i64::MIN), 'x' as Cell))
        );
    }

    #[test]
    fn test_step_zero_delta() {
        let mut space = FungeSpace::new();
        space.put(Vector::new(1, 1), 'z' as Cell);
        assert_eq!(
            space.step(Vector::new(1, 1), Vector::ORIGIN),
            Some((Vector::new(1, 1), 'z' as Cell))
        );
        assert_eq!(space.step(Vector::new(0, 0), Vector::ORIGIN), None);
    }
}
