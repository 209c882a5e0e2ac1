//! Fuzzy phrase scoring.
//!
//! Recognisers rarely reproduce a command word for word, and sometimes
//! reorder it ("bild gehe zu").  Phrases are therefore compared with a
//! token-sort ratio: both sides are split on whitespace, the tokens sorted and
//! re-joined, and the results scored by normalised longest-common-subsequence
//! similarity:
//!
//! ```text
//! score = 100 · 2·LCS(a, b) / (|a| + |b|)
//! ```
//!
//! Lengths are counted in `char`s so umlauts weigh the same as ASCII letters.

/// Similarity of `a` and `b` in `[0, 100]`.  Two empty strings score 100.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    200.0 * lcs_len(&a, &b) as f64 / total as f64
}

/// [`ratio`] after sorting the whitespace-separated tokens of both sides.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Best-scoring candidate for `query`.
///
/// Returns the index into `candidates` and its score.  Ties go to the
/// earliest candidate.  `None` only when `candidates` is empty.
pub fn best_match<'a, I>(query: &str, candidates: I) -> Option<(usize, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let query = sorted_tokens(query);
    let mut best: Option<(usize, f64)> = None;
    for (i, candidate) in candidates.into_iter().enumerate() {
        let score = ratio(&query, &sorted_tokens(candidate));
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((i, score));
        }
    }
    best
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Length of the longest common subsequence, one rolling row of DP.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut row = vec![0usize; b.len() + 1];
    for &ca in a {
        let mut diag = 0;
        for (j, &cb) in b.iter().enumerate() {
            let up = row[j + 1];
            row[j + 1] = if ca == cb {
                diag + 1
            } else {
                up.max(row[j])
            };
            diag = up;
        }
    }
    row[b.len()]
}
