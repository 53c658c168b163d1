//! Longest-common-block string similarity.
//!
//! # Algorithm
//! Ratcliff/Obershelp: find the longest common contiguous block, recurse on
//! the pieces left and right of it, and sum the block sizes `M`. The ratio
//! is `2 * M / (|a| + |b|)`, 1.0 for two empty strings.
//!
//! For a second sequence of 200+ characters, characters occurring in more
//! than 1% of its positions are not used to seed blocks (they may still
//! extend one).
//!
//! # Reference
//! Ratcliff & Metzener (1988), "Pattern Matching: The Gestalt Approach",
//! Dr. Dobb's Journal.

use std::collections::{HashMap, HashSet};

const POPULAR_MIN_LEN: usize = 200;

/// Similarity ratio in [0, 1] between two strings (by Unicode scalar value).
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = BlockMatcher::new(&a, &b).matching_characters();
    2.0 * matched as f64 / total as f64
}

/// Best candidate at or above `cutoff`.
///
/// Candidates are ranked by (ratio, candidate) descending, so equal ratios
/// go to the lexicographically greater candidate. Returns the candidate and
/// its ratio.
pub fn best_match<'a, I>(word: &str, candidates: I, cutoff: f64) -> Option<(&'a str, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&'a str, f64)> = None;
    for candidate in candidates {
        // `candidate` is the first sequence, `word` the second.
        let ratio = similarity_ratio(candidate, word);
        if ratio < cutoff {
            continue;
        }
        let better = match best {
            None => true,
            Some((b, r)) => ratio > r || (ratio == r && candidate > b),
        };
        if better {
            best = Some((candidate, ratio));
        }
    }
    best
}

struct BlockMatcher<'s> {
    a: &'s [char],
    b: &'s [char],
    b2j: HashMap<char, Vec<usize>>,
}

impl<'s> BlockMatcher<'s> {
    fn new(a: &'s [char], b: &'s [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &c) in b.iter().enumerate() {
            b2j.entry(c).or_default().push(j);
        }
        if b.len() >= POPULAR_MIN_LEN {
            let limit = b.len() / 100 + 1;
            let popular: HashSet<char> = b2j
                .iter()
                .filter(|(_, idx)| idx.len() > limit)
                .map(|(&c, _)| c)
                .collect();
            for c in popular {
                b2j.remove(&c);
            }
        }
        Self { a, b, b2j }
    }

    /// Longest block in a[alo..ahi] × b[blo..bhi]; earliest in `a`, then in
    /// `b`, among blocks of maximal size. Returns (i, j, size).
    fn longest_block(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> (usize, usize, usize) {
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0usize);
        // j2len[j] = length of the block ending at a[i-1], b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|p| j2len.get(&p))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next.insert(j, k);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            j2len = next;
        }

        while best_i > alo && best_j > blo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < ahi
            && best_j + best_size < bhi
            && self.a[best_i + best_size] == self.b[best_j + best_size]
        {
            best_size += 1;
        }
        (best_i, best_j, best_size)
    }

    /// Total size of all matching blocks.
    fn matching_characters(&self) -> usize {
        let mut total = 0;
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.longest_block(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            total += k;
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }
        total
    }
}
