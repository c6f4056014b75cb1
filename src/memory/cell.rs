//! Funge-space cell values
//!
//! A cell is a full-width signed integer in both cell modes; byte mode only
//! narrows values at the I/O boundary.  In Unicode mode a cell usually holds
//! a Unicode scalar value, but arithmetic is free to push it outside that
//! range, so conversions back to `char` are fallible.

/// A single Funge-space cell.
pub type Cell = i64;

/// The value of every unwritten cell: the blank glyph, not zero.
pub const SPACE: Cell = ' ' as Cell;

/// Convert a cell to a character, if it is a valid Unicode scalar value.
pub fn to_char(v: Cell) -> Option<char> {
    u32::try_from(v).ok().and_then(char::from_u32)
}

/// Convert a cell to a character, substituting U+FFFD for anything that is
/// not a valid Unicode scalar value.
pub fn to_char_lossy(v: Cell) -> char {
    to_char(v).unwrap_or('\u{fffd}')
}
