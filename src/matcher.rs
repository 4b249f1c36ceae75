//! Approximate client-name matching.
//!
//! User-typed references ("acme corp.") are resolved against canonical
//! dataset names with a Ratcliff/Obershelp sequence ratio, not an edit
//! distance: the score is `2 * M / T`, where `M` counts the characters in
//! recursively-found longest matching blocks and `T` is the combined
//! length of both strings.

use log::debug;

/// Resolves free-text client references against canonical dataset names.
#[derive(Debug, Clone)]
pub struct ClientResolver {
    threshold: f64,
}

impl ClientResolver {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Best-scoring candidate, or `None` when nothing strictly exceeds the
    /// threshold. Ties keep the first candidate reaching the top score.
    pub fn resolve<'a>(&self, search: &str, candidates: &'a [String]) -> Option<&'a str> {
        let needle: Vec<char> = search.to_lowercase().chars().collect();
        let mut best_score = 0.0_f64;
        let mut best: Option<&str> = None;

        for candidate in candidates {
            if candidate.is_empty() {
                continue;
            }
            let hay: Vec<char> = candidate.to_lowercase().chars().collect();
            let score = sequence_ratio(&needle, &hay);
            if score > best_score {
                best_score = score;
                best = Some(candidate);
            }
        }

        if best_score > self.threshold {
            debug!("Resolved {:?} with score {:.3}", search, best_score);
            best
        } else {
            None
        }
    }
}

/// Similarity of two character sequences in `[0, 1]`.
pub fn sequence_ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(a, b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (ai, bi, len) = longest_match(a, b);
    if len == 0 {
        return 0;
    }
    len + matching_chars(&a[..ai], &b[..bi]) + matching_chars(&a[ai + len..], &b[bi + len..])
}

/// Longest common substring of `a` and `b`. Among blocks of equal length
/// the one starting earliest in `a`, then in `b`, wins.
fn longest_match(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    // prev[j + 1] = length of the common suffix ending at a[i - 1], b[j]
    let mut prev = vec![0_usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        let mut row = vec![0_usize; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            if ca == cb {
                let len = prev[j] + 1;
                row[j + 1] = len;
                if len > best.2 {
                    best = (i + 1 - len, j + 1 - len, len);
                }
            }
        }
        prev = row;
    }
    best
}
