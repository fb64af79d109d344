//! Sampling select index layered on the rank directory.
//!
//! One sample is kept per 256 ones, pointing at the small block preceding
//! the milestone. A query jumps through the sample, advances along the two
//! rank directories, and finishes with a clear-lowest-set-bit walk inside a
//! single word. On dense vectors this is O(1) expected; sparse regions cost
//! a short directory scan.

use crate::error::{Error, Result};
use crate::rank::{RankDirectory, WORDS_PER_LARGE, WORD_BITS};
use crate::{Bits, Rank, Select};

/// Sampling period in ones.
const SAMPLE_RANGE: usize = 256;

/// A bit sequence answering rank and select queries.
///
/// Wraps a [`RankDirectory`] and adds the select sample array. The storage
/// contract is the directory's: words are kept without copying and must
/// stay frozen, with a clean tail past `len`.
///
/// # Example
///
/// ```
/// use succinct_bits::{Select, SelectIndex};
///
/// let v = SelectIndex::new(vec![0x00A5_A5A5u32], 24).unwrap();
/// assert_eq!(v.select(0).unwrap(), Some(0));
/// assert_eq!(v.select(11).unwrap(), Some(23));
/// assert_eq!(v.select(12).unwrap(), None);
/// ```
#[derive(Clone, Debug)]
pub struct SelectIndex<W = Vec<u32>> {
    rank: RankDirectory<W>,
    /// Small-block index just before each 256-one milestone; slot 0 is a
    /// fixed zero so the first jump lands at the vector start.
    samples: Vec<u32>,
}

impl<W: AsRef<[u32]>> SelectIndex<W> {
    /// Builds the rank directory and the select samples.
    ///
    /// Fails with [`Error::BadArgument`] under the same conditions as
    /// [`RankDirectory::new`].
    pub fn new(words: W, size: usize) -> Result<Self> {
        let rank = RankDirectory::new(words, size)?;
        let samples = Self::sample_select(&rank);
        Ok(Self { rank, samples })
    }

    /// Walks the two rank directories and records the small block that
    /// precedes each crossing of a 256-one milestone.
    fn sample_select(rank: &RankDirectory<W>) -> Vec<u32> {
        let total = rank.total_rank();
        let mut samples = vec![0u32; total / SAMPLE_RANGE + 1];
        let mut sample_index = 1;
        let mut sample_rank = SAMPLE_RANGE;

        for i in 0..rank.large_len() - 1 {
            let large = rank.large_rank(i);
            let next_block = rank.word_count().min((i + 1) * WORDS_PER_LARGE);
            for j in i * WORDS_PER_LARGE..next_block {
                let r = large + rank.small_rank(j);
                while sample_rank <= r {
                    samples[sample_index] = (j - 1) as u32;
                    sample_index += 1;
                    sample_rank += SAMPLE_RANGE;
                }
            }
        }

        // Milestones inside the final small block are not seen above.
        while sample_rank <= total {
            samples[sample_index] = (rank.word_count() - 1) as u32;
            sample_index += 1;
            sample_rank += SAMPLE_RANGE;
        }
        samples
    }

    /// The underlying word storage.
    #[inline]
    pub fn words(&self) -> &[u32] {
        self.rank.words()
    }
}

impl<W: AsRef<[u32]>> Bits for SelectIndex<W> {
    fn len(&self) -> usize {
        self.rank.len()
    }

    fn get(&self, index: usize) -> Result<bool> {
        self.rank.get(index)
    }

    fn set(&mut self, _index: usize, _value: bool) -> Result<()> {
        Err(Error::Unsupported("set on a read-only select index"))
    }
}

impl<W: AsRef<[u32]>> Rank for SelectIndex<W> {
    fn rank(&self, index: usize) -> Result<usize> {
        self.rank.rank(index)
    }

    fn total_rank(&self) -> usize {
        self.rank.total_rank()
    }
}

impl<W: AsRef<[u32]>> Select for SelectIndex<W> {
    fn select(&self, i: usize) -> Result<Option<usize>> {
        if i >= self.rank.len() {
            return Err(Error::OutOfRange(i));
        }
        if i >= self.rank.total_rank() {
            return Ok(None);
        }

        let mut r = i + 1;

        // Jump through the sample, then advance to the owning large block.
        let mut lb = self.samples[r / SAMPLE_RANGE] as usize / WORDS_PER_LARGE;
        while r > self.rank.large_rank(lb + 1) {
            lb += 1;
        }
        r -= self.rank.large_rank(lb);

        // Scan the small directory within the large block. The jump is
        // biased by r - 1: every small block before lb*8 + (r-1)/32 + 1
        // holds at most r - 1 ones, so the scan can only stop at or after
        // the block containing the answer. (A jump by r/32 overshoots when
        // r is a multiple of 32 and the preceding blocks are full.)
        let boundary = self.rank.word_count().min((lb + 1) * WORDS_PER_LARGE);
        let mut s = lb * WORDS_PER_LARGE + (r - 1) / WORD_BITS + 1;
        while s < boundary && self.rank.small_rank(s) < r {
            s += 1;
        }
        s -= 1;
        r -= self.rank.small_rank(s);

        // Clear the lowest set bit r - 1 times; the answer is the next one.
        let mut word = self.rank.words()[s];
        for _ in 1..r {
            word &= word - 1;
        }
        Ok(Some(s * WORD_BITS + word.trailing_zeros() as usize))
    }
}
