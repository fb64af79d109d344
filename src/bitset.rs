//! Mutable packed bit storage.
//!
//! [`BitSet`] is the construction-time container for the static indexes in
//! this crate: bits are staged here (dynamically grown or at a fixed size),
//! then frozen into a word array via [`BitSet::to_words`] and handed to
//! [`RankDirectory`](crate::RankDirectory) or
//! [`BalancedParens`](crate::BalancedParens).

use crate::error::{Error, Result};
use crate::{Bits, MAX_BITS};

/// Number of bits per storage word.
const WORD_BITS: usize = 32;

/// Word count a dynamic set starts with.
const INITIAL_WORDS: usize = 8;

/// Maximum count of full 32-bit words below the bit cap.
const MAX_WORDS: usize = MAX_BITS / WORD_BITS;

/// A mutable bit set that either has a fixed size or grows as needed.
///
/// A dynamic set doubles its word array whenever a write lands past the
/// current size (or grows further, to cover the written index), so a typical
/// lifecycle is: fill a dynamic set, then call [`to_words`](Self::to_words)
/// to truncate the storage to the exact bit count. Writes past the end of a
/// fixed set fail with [`Error::OutOfRange`].
///
/// The size of a dynamic set saturates at [`MAX_BITS`]; setting any bit at
/// or above that cap always fails.
#[derive(Clone, Debug)]
pub struct BitSet {
    /// Bits packed into 32-bit words.
    words: Vec<u32>,
    /// Number of bits the set holds.
    size: usize,
    /// Whether the set may grow.
    dynamic: bool,
}

impl BitSet {
    /// Creates an empty bit set that grows dynamically.
    pub fn new() -> Self {
        Self {
            words: vec![0; INITIAL_WORDS],
            size: INITIAL_WORDS * WORD_BITS,
            dynamic: true,
        }
    }

    /// Creates an empty bit set of the given fixed size.
    ///
    /// Fails with [`Error::BadArgument`] if `size` is zero or exceeds
    /// [`MAX_BITS`].
    pub fn with_size(size: usize) -> Result<Self> {
        if size == 0 || size > MAX_BITS {
            return Err(Error::BadArgument("invalid bit set size"));
        }
        Ok(Self {
            words: vec![0; size.div_ceil(WORD_BITS)],
            size,
            dynamic: false,
        })
    }

    /// Creates a fixed-size bit set over an existing word array.
    ///
    /// Fails with [`Error::BadArgument`] if `size` is zero, exceeds
    /// [`MAX_BITS`], or exceeds the bits available in `words`.
    pub fn from_words(words: Vec<u32>, size: usize) -> Result<Self> {
        if size == 0 || size > MAX_BITS || size > words.len() * WORD_BITS {
            return Err(Error::BadArgument("invalid words or size"));
        }
        Ok(Self {
            words,
            size,
            dynamic: false,
        })
    }

    /// Sets the bit at `index` to 1.
    pub fn set_bit(&mut self, index: usize) -> Result<()> {
        self.set(index, true)
    }

    /// Writes a whole 32-bit word at word position `word_index`.
    ///
    /// This lets the set double as a dynamic array of `u32`s. Fails with
    /// [`Error::OutOfRange`] if `word_index` is at or above [`MAX_BITS`]
    /// divided by the word size, or if the word lies past the end of a
    /// fixed set.
    pub fn set_word(&mut self, word_index: usize, value: u32) -> Result<()> {
        if word_index >= MAX_WORDS {
            return Err(Error::OutOfRange(word_index));
        }
        self.ensure_capacity((word_index + 1) * WORD_BITS - 1)?;
        self.words[word_index] = value;
        Ok(())
    }

    /// The internal word array as is.
    ///
    /// No copy is taken; for a dynamic set the array may extend past the
    /// logical size.
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// A copy of the word array truncated or zero-padded to `new_size` bits.
    ///
    /// Bits at positions `new_size` and above are cleared in the final word,
    /// which makes the result safe to hand to the index constructors.
    pub fn to_words(&self, new_size: usize) -> Vec<u32> {
        let word_count = new_size.div_ceil(WORD_BITS);
        let mut copy = vec![0u32; word_count];
        let shared = word_count.min(self.words.len());
        copy[..shared].copy_from_slice(&self.words[..shared]);

        let tail_bits = new_size % WORD_BITS;
        if tail_bits > 0 {
            copy[word_count - 1] &= (1u32 << tail_bits) - 1;
        }
        copy
    }

    /// Grows the word array to cover `index` if the set is dynamic; fails
    /// with [`Error::OutOfRange`] otherwise.
    fn ensure_capacity(&mut self, index: usize) -> Result<()> {
        if index < self.size {
            return Ok(());
        }
        if !self.dynamic {
            return Err(Error::OutOfRange(index));
        }

        let word_count = (self.words.len() * 2)
            .max((index + 1).div_ceil(WORD_BITS))
            .min(MAX_BITS.div_ceil(WORD_BITS));
        self.words.resize(word_count, 0);
        self.size = (word_count * WORD_BITS).min(MAX_BITS);
        Ok(())
    }
}

impl Default for BitSet {
    fn default() -> Self {
        Self::new()
    }
}

impl Bits for BitSet {
    /// Number of bits in the set. For a dynamic set this is a multiple of
    /// the word size and depends on the growth pattern.
    fn len(&self) -> usize {
        self.size
    }

    fn get(&self, index: usize) -> Result<bool> {
        if index >= self.size {
            return Err(Error::OutOfRange(index));
        }
        Ok(self.words[index / WORD_BITS] & (1 << (index % WORD_BITS)) != 0)
    }

    /// Sets the bit at `index`. A dynamic set grows to cover the index; a
    /// fixed set fails with [`Error::OutOfRange`] past its end. The index
    /// [`MAX_BITS`] and above is always rejected (the size cap is
    /// reserved).
    fn set(&mut self, index: usize, value: bool) -> Result<()> {
        if index >= MAX_BITS {
            return Err(Error::OutOfRange(index));
        }
        self.ensure_capacity(index)?;

        let word = &mut self.words[index / WORD_BITS];
        if value {
            *word |= 1 << (index % WORD_BITS);
        } else {
            *word &= !(1 << (index % WORD_BITS));
        }
        Ok(())
    }
}
