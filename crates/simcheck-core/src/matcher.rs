//! Junk-free sequence alignment over two character sequences.
//!
//! Block discovery is greedy: find the longest common substring of the two
//! sequences, then recurse on the unmatched pieces to its left and right. Ties
//! between equal-length longest substrings are broken deterministically toward
//! the leftmost start in `a`, then the leftmost start in `b`. The similarity
//! ratio is `2 * M / T` where `M` is the total length of the matched blocks
//! and `T` the combined sequence length; two empty sequences compare as 1.0.
//!
//! Offsets are character offsets, not byte offsets, so block triples can be
//! used to slice multibyte text safely.

use once_cell::unsync::OnceCell;
use std::collections::HashMap;

/// One contiguous matched run: `a[a..a+len] == b[b..b+len]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchBlock {
    pub a: usize,
    pub b: usize,
    pub len: usize,
}

pub struct SequenceMatcher {
    a: Vec<char>,
    b: Vec<char>,
    /// Index of `b`: char -> ascending positions where it occurs.
    b2j: HashMap<char, Vec<usize>>,
    blocks: OnceCell<Vec<MatchBlock>>,
}

impl SequenceMatcher {
    pub fn new(a: &str, b: &str) -> Self {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, ch) in b.iter().enumerate() {
            b2j.entry(*ch).or_default().push(j);
        }
        Self {
            a,
            b,
            b2j,
            blocks: OnceCell::new(),
        }
    }

    /// Longest matching block within `a[alo..ahi]` and `b[blo..bhi]`.
    ///
    /// `j2len[j]` holds the length of the longest run ending at `a[i]`/`b[j]`;
    /// carrying it from row to row makes the scan O((ahi-alo)·(bhi-blo)) worst
    /// case. Every character participates; there is no junk filtering. The
    /// best block is only replaced on a strictly longer run, which pins ties
    /// to the leftmost start in `a`, then in `b`.
    fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> MatchBlock {
        let mut best = MatchBlock {
            a: alo,
            b: blo,
            len: 0,
        };
        let mut j2len: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut newj2len: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let run = if j > 0 {
                        j2len.get(&(j - 1)).copied().unwrap_or(0) + 1
                    } else {
                        1
                    };
                    newj2len.insert(j, run);
                    if run > best.len {
                        best = MatchBlock {
                            a: i + 1 - run,
                            b: j + 1 - run,
                            len: run,
                        };
                    }
                }
            }
            j2len = newj2len;
        }

        best
    }

    /// Matched blocks sorted ascending by offset in `a`, non-overlapping,
    /// covering every character that is part of some match. Adjacent blocks
    /// are merged. No zero-length terminator is appended.
    pub fn matching_blocks(&self) -> &[MatchBlock] {
        self.blocks.get_or_init(|| {
            let mut queue = vec![(0usize, self.a.len(), 0usize, self.b.len())];
            let mut raw: Vec<MatchBlock> = Vec::new();

            while let Some((alo, ahi, blo, bhi)) = queue.pop() {
                let m = self.find_longest_match(alo, ahi, blo, bhi);
                if m.len == 0 {
                    continue;
                }
                if alo < m.a && blo < m.b {
                    queue.push((alo, m.a, blo, m.b));
                }
                if m.a + m.len < ahi && m.b + m.len < bhi {
                    queue.push((m.a + m.len, ahi, m.b + m.len, bhi));
                }
                raw.push(m);
            }

            raw.sort_by_key(|m| (m.a, m.b));

            let mut merged: Vec<MatchBlock> = Vec::new();
            for m in raw {
                match merged.last_mut() {
                    Some(last) if last.a + last.len == m.a && last.b + last.len == m.b => {
                        last.len += m.len;
                    }
                    _ => merged.push(m),
                }
            }
            merged
        })
    }

    /// `2 * M / T`, in [0.0, 1.0]. Defined as 1.0 when both sequences are
    /// empty.
    pub fn ratio(&self) -> f64 {
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        let matched: usize = self.matching_blocks().iter().map(|m| m.len).sum();
        2.0 * matched as f64 / total as f64
    }
}

/// Similarity percentage rounded to two decimals, range [0.0, 100.0].
pub fn similarity_percent(a: &str, b: &str) -> f64 {
    round2(SequenceMatcher::new(a, b).ratio() * 100.0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
