//! # succinct-bits
//!
//! Succinct data structures over static bit sequences: constant-time rank,
//! near-constant-time select, and O(log n) balanced-parentheses navigation,
//! all with sublinear auxiliary space.
//!
//! Bit sequences are stored little-endian within 32-bit words: bit `j` lives
//! in word `j / 32` at position `j % 32`. Sequences hold at most 2^31 − 1
//! bits.
//!
//! ## Quick Start
//!
//! ```
//! use succinct_bits::{Rank, Select, SelectIndex};
//!
//! // 10101011 (LSB first): ones at positions 0, 1, 3, 5, 7
//! let v = SelectIndex::new(vec![0b1010_1011u32], 8).unwrap();
//!
//! assert_eq!(v.rank(7).unwrap(), 5);
//! assert_eq!(v.select(4).unwrap(), Some(7));
//! assert_eq!(v.excess(7).unwrap(), 2);
//! ```
//!
//! Balanced parentheses (1 = open, 0 = close) get a range min/max tree:
//!
//! ```
//! use succinct_bits::{BalancedParens, Parentheses};
//!
//! // "(()(()))" = 1,1,0,1,1,0,0,0 (LSB first)
//! let bp = BalancedParens::new(vec![0b0001_1011u32], 8).unwrap();
//! assert_eq!(bp.find_close(0).unwrap(), Some(7));
//! assert_eq!(bp.enclose(4).unwrap(), Some(3));
//! ```
//!
//! ## Ownership
//!
//! The rank/select/parentheses indexes are built once and are immutable
//! afterwards; queries never allocate, so a built index is freely shareable
//! across threads for reads. Index constructors accept any word storage via
//! `AsRef<[u32]>` and keep it without copying; bits past the declared length
//! in the final word must be zero (see [`BitSet::to_words`]).

pub mod bitset;
pub mod bp;
pub mod compact;
pub mod error;
pub mod lookup;
pub mod scan;

mod rank;
mod select;

pub use bitset::BitSet;
pub use bp::BalancedParens;
pub use compact::CompactIntArray;
pub use error::{Error, Result};
pub use rank::RankDirectory;
pub use scan::BackwardScan;
pub use select::SelectIndex;

/// Maximum number of bits any structure in this crate can hold.
///
/// The top index 2^31 − 1 is reserved so that sizes and positions always fit
/// a non-negative 32-bit value.
pub const MAX_BITS: usize = i32::MAX as usize;

/// Read (and, where supported, write) access to a sequence of bits.
///
/// Read-only views implement `set` by failing with [`Error::Unsupported`].
pub trait Bits {
    /// Number of bits in the sequence.
    fn len(&self) -> usize;

    /// Returns true if the sequence has length 0.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value of the bit at position `index`.
    ///
    /// Fails with [`Error::OutOfRange`] if `index >= len()`.
    fn get(&self, index: usize) -> Result<bool>;

    /// Sets the bit at position `index`.
    ///
    /// Fails with [`Error::OutOfRange`] on domain violations, or with
    /// [`Error::Unsupported`] on read-only views.
    fn set(&mut self, index: usize, value: bool) -> Result<()>;
}

/// Rank queries over a static bit sequence.
///
/// `rank0` and `excess` are derived from `rank`, so implementors only
/// provide the two required methods.
pub trait Rank {
    /// Number of 1-bits in positions `[0, index]` (inclusive).
    ///
    /// Fails with [`Error::OutOfRange`] if `index >= len()`.
    fn rank(&self, index: usize) -> Result<usize>;

    /// Total number of 1-bits in the sequence.
    fn total_rank(&self) -> usize;

    /// Number of 0-bits in positions `[0, index]` (inclusive).
    fn rank0(&self, index: usize) -> Result<usize> {
        Ok(index + 1 - self.rank(index)?)
    }

    /// Difference between the number of 1-bits and 0-bits in `[0, index]`.
    ///
    /// When bits encode parentheses (1 = open), this is the nesting depth
    /// at `index`.
    fn excess(&self, index: usize) -> Result<i32> {
        let r = self.rank(index)? as i64;
        Ok((2 * r - index as i64 - 1) as i32)
    }
}

/// Select queries over a static bit sequence.
pub trait Select {
    /// Position of the `(i + 1)`-th 1-bit (0-based ordinal `i`).
    ///
    /// Returns `Ok(None)` when fewer than `i + 1` ones exist. Fails with
    /// [`Error::OutOfRange`] if `i >= len()`.
    fn select(&self, i: usize) -> Result<Option<usize>>;
}

/// Navigation over a balanced-parentheses bit sequence (1 = open, 0 = close).
///
/// Balancedness is not verified; on unbalanced input the answers are
/// unspecified (queries still return without panicking).
pub trait Parentheses {
    /// Position of the close parenthesis matching the open at `index`.
    fn find_close(&self, index: usize) -> Result<Option<usize>>;

    /// Position of the open parenthesis matching the close at `index`.
    fn find_open(&self, index: usize) -> Result<Option<usize>>;

    /// Position of the nearest open parenthesis enclosing `index`, or
    /// `Ok(None)` at the top level.
    fn enclose(&self, index: usize) -> Result<Option<usize>>;
}
