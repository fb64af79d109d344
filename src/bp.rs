//! Balanced parentheses search over a range min/max tree.
//!
//! The parentheses are a bit sequence where 1 = open and 0 = close. On top
//! of the two-level rank directory (which answers excess queries), the index
//! keeps:
//!
//! - per-word local min/max excess, composed from the per-byte tables in
//!   [`lookup`](crate::lookup);
//! - two heap-layout trees over 256-bit superblocks holding the global
//!   min/max excess per superblock at the leaves.
//!
//! A query then runs in three phases: scan the rest of the current word,
//! walk the remaining words of the superblock through their extrema, and
//! finally ascend/descend the tree to the nearest superblock whose excess
//! range covers the target. Queries cost O(log n) in the worst case.
//!
//! Based on the range min-max tree of Sadakane & Navarro, "Fully-Functional
//! Succinct Trees", SODA 2010.

use crate::error::{Error, Result};
use crate::lookup::{MAX_EXCESS, MIN_EXCESS};
use crate::rank::{RankDirectory, WORD_BITS};
use crate::scan::{self, BackwardScan};
use crate::{Bits, Parentheses, Rank};

/// Number of words per superblock.
const WORDS_PER_SUPER: usize = 8;

/// Number of bits per superblock (coincides with a rank large block).
const SUPER_BITS: usize = WORD_BITS * WORDS_PER_SUPER;

/// Balanced-parentheses navigation with O(log n) queries.
///
/// Construction does not verify that the sequence is balanced; on
/// unbalanced input the search results are unspecified, though queries
/// still return without panicking.
///
/// # Example
///
/// ```
/// use succinct_bits::{BalancedParens, Parentheses};
///
/// // "(()(()))" = 1,1,0,1,1,0,0,0 (LSB first)
/// let bp = BalancedParens::new(vec![0b0001_1011u32], 8).unwrap();
/// assert_eq!(bp.find_close(1).unwrap(), Some(2));
/// assert_eq!(bp.find_open(7).unwrap(), Some(0));
/// assert_eq!(bp.enclose(3).unwrap(), Some(0));
/// ```
#[derive(Clone, Debug)]
pub struct BalancedParens<W = Vec<u32>> {
    /// Rank directory over the parentheses; answers the excess queries.
    rank: RankDirectory<W>,
    /// Local (word-relative) minimum excess per word; entry 0 is clamped
    /// to at most 0 so the virtual excess before position 0 takes part in
    /// range checks.
    min_excess: Vec<i8>,
    /// Local maximum excess per word.
    max_excess: Vec<i8>,
    /// Number of superblocks.
    super_count: usize,
    /// Range tree of global superblock minimum excesses. 1-based heap
    /// layout: slot 0 is unused, the root is 1, children of `i` are `2i`
    /// and `2i + 1`, and the last `super_count` slots are the leaves.
    min_tree: Vec<i32>,
    /// Range tree of global superblock maximum excesses, same layout.
    max_tree: Vec<i32>,
}

/// Local min/max excess of one word, composed byte by byte from the lookup
/// tables. Values lie in [−32, 32].
fn word_extrema(word: u32) -> (i8, i8) {
    let mut min = i32::MAX;
    let mut max = i32::MIN;
    let mut excess = 0i32;
    for byte in word.to_le_bytes() {
        min = min.min(excess + MIN_EXCESS[byte as usize] as i32);
        max = max.max(excess + MAX_EXCESS[byte as usize] as i32);
        excess += 2 * byte.count_ones() as i32 - 8;
    }
    (min as i8, max as i8)
}

impl<W: AsRef<[u32]>> BalancedParens<W> {
    /// Builds the search structure over a parentheses bit sequence.
    ///
    /// Fails with [`Error::BadArgument`] under the same conditions as
    /// [`RankDirectory::new`]. Bits past `size` in the final word must be
    /// zero.
    pub fn new(words: W, size: usize) -> Result<Self> {
        let rank = RankDirectory::new(words, size)?;
        let word_count = rank.word_count();

        let mut min_excess = Vec::with_capacity(word_count);
        let mut max_excess = Vec::with_capacity(word_count);
        for &word in &rank.words()[..word_count] {
            let (min, max) = word_extrema(word);
            min_excess.push(min);
            max_excess.push(max);
        }
        // The virtual excess 0 before position 0 participates in searches.
        min_excess[0] = min_excess[0].min(0);

        let super_count = word_count.div_ceil(WORDS_PER_SUPER);
        // Internal slots for the next power of two above the leaf count,
        // plus the leaves, plus the unused slot 0.
        let height = super_count.next_power_of_two().trailing_zeros();
        let node_count = (1usize << height) - 1 + super_count + 1;
        let mut min_tree = vec![0i32; node_count];
        let mut max_tree = vec![0i32; node_count];

        // Leaves: global extrema per superblock.
        let leaf_base = node_count - super_count;
        for s in 0..super_count {
            let start = s * WORDS_PER_SUPER;
            let end = word_count.min(start + WORDS_PER_SUPER);
            let mut min = i32::MAX;
            let mut max = i32::MIN;
            for j in start..end {
                let base = if j > 0 {
                    rank.excess(j * WORD_BITS - 1)?
                } else {
                    0
                };
                min = min.min(base + min_excess[j] as i32);
                max = max.max(base + max_excess[j] as i32);
            }
            min_tree[leaf_base + s] = min;
            max_tree[leaf_base + s] = max;
        }

        // Internal nodes bottom-up; missing children are ignored.
        for i in (1..leaf_base).rev() {
            let mut min = i32::MAX;
            let mut max = i32::MIN;
            let child = 2 * i;
            if child < node_count {
                min = min.min(min_tree[child]);
                max = max.max(max_tree[child]);
                if child + 1 < node_count {
                    min = min.min(min_tree[child + 1]);
                    max = max.max(max_tree[child + 1]);
                }
            }
            min_tree[i] = min;
            max_tree[i] = max;
        }

        Ok(Self {
            rank,
            min_excess,
            max_excess,
            super_count,
            min_tree,
            max_tree,
        })
    }

    /// The underlying word storage.
    #[inline]
    pub fn words(&self) -> &[u32] {
        self.rank.words()
    }

    /// True if position `index` holds an open parenthesis.
    pub fn is_open(&self, index: usize) -> Result<bool> {
        self.rank.get(index)
    }

    /// True if position `index` holds a close parenthesis.
    pub fn is_close(&self, index: usize) -> Result<bool> {
        Ok(!self.rank.get(index)?)
    }

    /// Position of the open parenthesis of the parent node, i.e.
    /// [`enclose`](Parentheses::enclose).
    pub fn parent(&self, index: usize) -> Result<Option<usize>> {
        self.enclose(index)
    }

    /// Position of the first child of the node opening at `index`, or
    /// `None` for a leaf.
    pub fn first_child(&self, index: usize) -> Result<Option<usize>> {
        if !self.is_open(index)? {
            return Ok(None);
        }
        if index + 1 < self.rank.len() && self.is_open(index + 1)? {
            Ok(Some(index + 1))
        } else {
            Ok(None)
        }
    }

    /// Position of the next sibling of the node opening at `index`, or
    /// `None` for a last child.
    pub fn next_sibling(&self, index: usize) -> Result<Option<usize>> {
        if !self.is_open(index)? {
            return Ok(None);
        }
        match self.find_close(index)? {
            Some(close) if close + 1 < self.rank.len() && self.is_open(close + 1)? => {
                Ok(Some(close + 1))
            }
            _ => Ok(None),
        }
    }

    /// Nesting depth at `index`; for an open parenthesis this is the depth
    /// of its node (the root opening at position 0 has depth 1).
    pub fn depth(&self, index: usize) -> Result<i32> {
        self.rank.excess(index)
    }

    /// Number of nodes in the subtree rooted at the node opening at
    /// `index`, counting the node itself. `None` if no matching close is
    /// found.
    pub fn subtree_size(&self, index: usize) -> Result<Option<usize>> {
        if !self.is_open(index)? {
            return Ok(None);
        }
        Ok(self
            .find_close(index)?
            .map(|close| (close - index + 1) / 2))
    }

    /// One word of the sequence.
    #[inline]
    fn word(&self, word_index: usize) -> u32 {
        self.rank.words()[word_index]
    }

    /// Number of words the sequence covers.
    #[inline]
    fn word_count(&self) -> usize {
        self.min_excess.len()
    }

    /// Global excess just before word `word_index` starts.
    fn excess_before_word(&self, word_index: usize) -> Result<i32> {
        if word_index == 0 {
            Ok(0)
        } else {
            self.rank.excess(word_index * WORD_BITS - 1)
        }
    }

    /// Whether the excess range of tree node `node` covers `target`.
    #[inline]
    fn contains(&self, node: usize, target: i32) -> bool {
        target >= self.min_tree[node] && target <= self.max_tree[node]
    }

    /// Finds the nearest position after `index` whose inclusive excess is
    /// `excess(index − 1) + delta` (taking 0 before position 0).
    fn search_forward(&self, index: usize, delta: i32) -> Result<Option<usize>> {
        let before = if index == 0 {
            0
        } else {
            self.rank.excess(index - 1)?
        };
        let target = before + delta;

        let word_index = index / WORD_BITS;
        let bit = index % WORD_BITS;

        // Phase 1: the rest of the current word.
        if bit < 31 && index + 1 < self.rank.len() {
            let found = scan::forward_excess_index(
                self.word(word_index),
                (bit + 1) as u32,
                self.rank.excess(index + 1)?,
                target,
            )?;
            if let Some(k) = found {
                return Ok(Some(word_index * WORD_BITS + k as usize));
            }
        }

        // Phase 2: the remaining words of the current superblock.
        let sb = index / SUPER_BITS;
        let end_word = self.word_count().min((sb + 1) * WORDS_PER_SUPER);
        if let Some(pos) = self.scan_super_forward(word_index + 1, end_word, target)? {
            return Ok(Some(pos));
        }

        // Phase 3: ascend toward a right-hand sibling whose range covers
        // the target, then descend to its leftmost covering superblock.
        let leaf_base = self.min_tree.len() - self.super_count;
        let mut node = leaf_base + sb;
        loop {
            if node <= 1 {
                return Ok(None); // ran past the root: target absent
            }
            if node % 2 == 1 {
                node /= 2;
                continue;
            }
            node += 1;
            if node < self.min_tree.len() && self.contains(node, target) {
                break;
            }
            node /= 2;
        }
        loop {
            let child = 2 * node;
            if child >= self.min_tree.len() {
                break;
            }
            node = if self.contains(child, target) {
                child
            } else {
                child + 1
            };
        }

        let sb = match node.checked_sub(leaf_base) {
            Some(s) if s < self.super_count => s,
            _ => return Ok(None),
        };
        let start_word = sb * WORDS_PER_SUPER;
        let end_word = self.word_count().min(start_word + WORDS_PER_SUPER);
        self.scan_super_forward(start_word, end_word, target)
    }

    /// Scans words `begin..end` left to right for the first position with
    /// inclusive excess `target`, skipping words whose extrema exclude it.
    fn scan_super_forward(&self, begin: usize, end: usize, target: i32) -> Result<Option<usize>> {
        for b in begin..end {
            let base = self.excess_before_word(b)?;
            if target >= base + self.min_excess[b] as i32
                && target <= base + self.max_excess[b] as i32
            {
                let first = self.rank.excess(b * WORD_BITS)?;
                if let Some(k) = scan::forward_excess_index(self.word(b), 0, first, target)? {
                    return Ok(Some(b * WORD_BITS + k as usize));
                }
            }
        }
        Ok(None)
    }

    /// Finds the nearest position at or before `index` whose predecessor
    /// excess is `excess(index) − delta`; the returned position is the one
    /// following the scan hit.
    fn search_backward(&self, index: usize, delta: i32) -> Result<Option<usize>> {
        let target = self.rank.excess(index)? - delta;
        if target < 0 {
            return Ok(None);
        }

        let word_index = index / WORD_BITS;
        let bit = index % WORD_BITS;

        // Phase 1: the low part of the current word.
        if bit > 0 {
            match scan::backward_excess_index(
                self.word(word_index),
                (bit - 1) as u32,
                self.rank.excess(index - 1)?,
                target,
            )? {
                BackwardScan::Found(k) => {
                    return Ok(Some(word_index * WORD_BITS + k as usize + 1))
                }
                BackwardScan::Boundary => return Ok(Some(word_index * WORD_BITS)),
                BackwardScan::NotFound => {}
            }
        }

        // Phase 2: the preceding words of the current superblock.
        let sb = index / SUPER_BITS;
        let super_start = sb * WORDS_PER_SUPER;
        if word_index > super_start {
            if let Some(pos) = self.scan_super_backward(word_index - 1, super_start, target)? {
                return Ok(Some(pos));
            }
        }

        // Phase 3: ascend toward a left-hand sibling whose range covers the
        // target, then descend to its rightmost covering superblock.
        let leaf_base = self.min_tree.len() - self.super_count;
        let mut node = leaf_base + sb;
        loop {
            if node <= 1 {
                return Ok(None);
            }
            if node % 2 == 0 {
                node /= 2;
                continue;
            }
            node -= 1;
            if self.contains(node, target) {
                break;
            }
            node /= 2;
        }
        loop {
            let child = 2 * node;
            if child >= self.min_tree.len() {
                break;
            }
            let right = child + 1;
            node = if right < self.min_tree.len() && self.contains(right, target) {
                right
            } else {
                child
            };
        }

        let sb = match node.checked_sub(leaf_base) {
            Some(s) if s < self.super_count => s,
            _ => return Ok(None),
        };
        let begin = self.word_count().min((sb + 1) * WORDS_PER_SUPER) - 1;
        self.scan_super_backward(begin, sb * WORDS_PER_SUPER, target)
    }

    /// Scans words `begin..=end` right to left for the nearest position
    /// whose predecessor excess is `target`, skipping words whose extrema
    /// exclude it.
    fn scan_super_backward(&self, begin: usize, end: usize, target: i32) -> Result<Option<usize>> {
        for b in (end..=begin).rev() {
            let base = self.excess_before_word(b)?;
            if target >= base + self.min_excess[b] as i32
                && target <= base + self.max_excess[b] as i32
            {
                let last = self.rank.excess((b + 1) * WORD_BITS - 1)?;
                match scan::backward_excess_index(self.word(b), 31, last, target)? {
                    BackwardScan::Found(k) => return Ok(Some(b * WORD_BITS + k as usize + 1)),
                    BackwardScan::Boundary => return Ok(Some(b * WORD_BITS)),
                    BackwardScan::NotFound => {}
                }
            }
        }
        Ok(None)
    }
}

impl<W: AsRef<[u32]>> Bits for BalancedParens<W> {
    fn len(&self) -> usize {
        self.rank.len()
    }

    fn get(&self, index: usize) -> Result<bool> {
        self.rank.get(index)
    }

    fn set(&mut self, _index: usize, _value: bool) -> Result<()> {
        Err(Error::Unsupported("set on a read-only parentheses index"))
    }
}

impl<W: AsRef<[u32]>> Rank for BalancedParens<W> {
    fn rank(&self, index: usize) -> Result<usize> {
        self.rank.rank(index)
    }

    fn total_rank(&self) -> usize {
        self.rank.total_rank()
    }
}

impl<W: AsRef<[u32]>> Parentheses for BalancedParens<W> {
    fn find_close(&self, index: usize) -> Result<Option<usize>> {
        if index >= self.rank.len() {
            return Err(Error::OutOfRange(index));
        }
        self.search_forward(index, 0)
    }

    fn find_open(&self, index: usize) -> Result<Option<usize>> {
        if index >= self.rank.len() {
            return Err(Error::OutOfRange(index));
        }
        self.search_backward(index, 0)
    }

    fn enclose(&self, index: usize) -> Result<Option<usize>> {
        if index >= self.rank.len() {
            return Err(Error::OutOfRange(index));
        }
        self.search_backward(index, 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Packs a paren string ('(' = 1, ')' = 0) into words, LSB first.
    fn pack(s: &str) -> (Vec<u32>, usize) {
        let mut words = vec![0u32; s.len().div_ceil(32)];
        for (i, c) in s.chars().enumerate() {
            if c == '(' {
                words[i / 32] |= 1 << (i % 32);
            }
        }
        (words, s.len())
    }

    fn build(s: &str) -> BalancedParens {
        let (words, len) = pack(s);
        BalancedParens::new(words, len).unwrap()
    }

    #[test]
    fn test_find_close_small() {
        let bp = build("(()(()))");
        assert_eq!(bp.find_close(0).unwrap(), Some(7));
        assert_eq!(bp.find_close(1).unwrap(), Some(2));
        assert_eq!(bp.find_close(3).unwrap(), Some(6));
        assert_eq!(bp.find_close(4).unwrap(), Some(5));
    }

    #[test]
    fn test_find_open_small() {
        let bp = build("(()(()))");
        assert_eq!(bp.find_open(7).unwrap(), Some(0));
        assert_eq!(bp.find_open(2).unwrap(), Some(1));
        assert_eq!(bp.find_open(6).unwrap(), Some(3));
        assert_eq!(bp.find_open(5).unwrap(), Some(4));
    }

    #[test]
    fn test_enclose_small() {
        let bp = build("(()(()))");
        assert_eq!(bp.enclose(0).unwrap(), None);
        assert_eq!(bp.enclose(1).unwrap(), Some(0));
        assert_eq!(bp.enclose(3).unwrap(), Some(0));
        assert_eq!(bp.enclose(4).unwrap(), Some(3));
    }

    #[test]
    fn test_single_pair() {
        let bp = build("()");
        assert_eq!(bp.find_close(0).unwrap(), Some(1));
        assert_eq!(bp.find_open(1).unwrap(), Some(0));
        assert_eq!(bp.enclose(0).unwrap(), None);
    }

    #[test]
    fn test_out_of_range() {
        let bp = build("()");
        assert_eq!(bp.find_close(2), Err(Error::OutOfRange(2)));
        assert_eq!(bp.find_open(2), Err(Error::OutOfRange(2)));
        assert_eq!(bp.enclose(2), Err(Error::OutOfRange(2)));
    }

    #[test]
    fn test_deep_nesting_across_superblocks() {
        // 1000 opens then 1000 closes: 2000 bits over 8 superblocks.
        let n = 1000;
        let mut bits = BitsBuilder::new(2 * n);
        for i in 0..n {
            bits.set(i);
        }
        let bp = BalancedParens::new(bits.words, 2 * n).unwrap();

        for i in (0..n).step_by(37) {
            assert_eq!(bp.find_close(i).unwrap(), Some(2 * n - 1 - i), "close {}", i);
            assert_eq!(
                bp.find_open(2 * n - 1 - i).unwrap(),
                Some(i),
                "open {}",
                2 * n - 1 - i
            );
        }
        assert_eq!(bp.enclose(0).unwrap(), None);
        for i in (1..n).step_by(41) {
            assert_eq!(bp.enclose(i).unwrap(), Some(i - 1), "enclose {}", i);
        }
    }

    #[test]
    fn test_flat_siblings_across_superblocks() {
        // ()()()... with 1024 pairs: matches never leave their own word,
        // but enclose and the directories still cross superblocks.
        let pairs = 1024;
        let mut bits = BitsBuilder::new(2 * pairs);
        for i in 0..pairs {
            bits.set(2 * i);
        }
        let bp = BalancedParens::new(bits.words, 2 * pairs).unwrap();

        for i in (0..pairs).step_by(97) {
            assert_eq!(bp.find_close(2 * i).unwrap(), Some(2 * i + 1));
            assert_eq!(bp.find_open(2 * i + 1).unwrap(), Some(2 * i));
            assert_eq!(bp.enclose(2 * i).unwrap(), None);
        }
    }

    #[test]
    fn test_wide_tree_with_long_match_distance() {
        // "(" + "()" * 600 + ")": the outer close sits 1201 positions and
        // several superblocks away from the outer open.
        let inner = 600;
        let len = 2 * inner + 2;
        let mut bits = BitsBuilder::new(len);
        bits.set(0);
        for i in 0..inner {
            bits.set(1 + 2 * i);
        }
        let bp = BalancedParens::new(bits.words, len).unwrap();

        assert_eq!(bp.find_close(0).unwrap(), Some(len - 1));
        assert_eq!(bp.find_open(len - 1).unwrap(), Some(0));
        for i in (0..inner).step_by(53) {
            assert_eq!(bp.enclose(1 + 2 * i).unwrap(), Some(0), "enclose pair {}", i);
        }
    }

    #[test]
    fn test_matches_stack_baseline_mixed_shape() {
        // A lopsided tree exercising all three search phases.
        let mut s = String::new();
        for d in 0..12 {
            s.push('(');
            for _ in 0..d * 7 {
                s.push_str("()");
            }
        }
        for _ in 0..12 {
            s.push(')');
        }
        let bp = build(&s);

        // Stack baseline.
        let chars: Vec<char> = s.chars().collect();
        let mut stack = Vec::new();
        let mut close_of = vec![None; chars.len()];
        let mut enclose_of = vec![None; chars.len()];
        for (i, &c) in chars.iter().enumerate() {
            if c == '(' {
                enclose_of[i] = stack.last().copied();
                stack.push(i);
            } else {
                close_of[stack.pop().unwrap()] = Some(i);
            }
        }

        for (i, &c) in chars.iter().enumerate() {
            if c == '(' {
                let close = close_of[i];
                assert_eq!(bp.find_close(i).unwrap(), close, "find_close({})", i);
                assert_eq!(
                    bp.find_open(close.unwrap()).unwrap(),
                    Some(i),
                    "find_open({})",
                    close.unwrap()
                );
                assert_eq!(bp.enclose(i).unwrap(), enclose_of[i], "enclose({})", i);
            }
        }
    }

    #[test]
    fn test_navigation_helpers() {
        let bp = build("(()(()))");
        assert!(bp.is_open(0).unwrap());
        assert!(bp.is_close(2).unwrap());
        assert_eq!(bp.parent(4).unwrap(), Some(3));
        assert_eq!(bp.first_child(0).unwrap(), Some(1));
        assert_eq!(bp.first_child(1).unwrap(), None);
        assert_eq!(bp.next_sibling(1).unwrap(), Some(3));
        assert_eq!(bp.next_sibling(3).unwrap(), None);
        assert_eq!(bp.depth(0).unwrap(), 1);
        assert_eq!(bp.depth(4).unwrap(), 3);
        assert_eq!(bp.subtree_size(0).unwrap(), Some(4));
        assert_eq!(bp.subtree_size(4).unwrap(), Some(1));
    }

    #[test]
    fn test_read_only_view() {
        let mut bp = build("()");
        assert!(matches!(bp.set(0, true), Err(Error::Unsupported(_))));
    }

    #[test]
    fn test_word_extrema() {
        // All opens.
        assert_eq!(word_extrema(u32::MAX), (1, 32));
        // All closes.
        assert_eq!(word_extrema(0), (-32, -1));
        // "()" then closes: peak 1 early, then straight down to -30.
        assert_eq!(word_extrema(0b01), (-30, 1));
    }

    /// Minimal word-packing helper for the larger shapes.
    struct BitsBuilder {
        words: Vec<u32>,
    }

    impl BitsBuilder {
        fn new(len: usize) -> Self {
            Self {
                words: vec![0; len.div_ceil(32)],
            }
        }

        fn set(&mut self, i: usize) {
            self.words[i / 32] |= 1 << (i % 32);
        }
    }
}
