//! # Fuzzy Matching
//!
//! Search-as-you-type over todo titles. A query is split on whitespace into
//! tokens; every token has to match somewhere in the text for the query to
//! match. The result carries a score and the highlight ranges.
//!
//! ## Token Matching
//!
//! Matching is case-insensitive and works on Unicode scalar values.
//!
//! 1. **Exact**: the first occurrence of the token scores `1.0`.
//! 2. **Approximate**: otherwise every span of the text whose length is
//!    within `token_len ± max(1, ceil(token_len * tolerance))` is compared
//!    with the token by Levenshtein distance. The normalized distance is
//!    `distance / max(token_len, span_len)`; a span is a candidate when it
//!    does not exceed `max_ratio`. The lowest normalized distance wins, ties
//!    go to the earliest start, then to the shortest span. The token scores
//!    `1.0 - normalized_distance`.
//!
//! Tokens shorter than `min_fuzzy_len` skip the approximate pass: with the
//! default of 3, a one- or two-letter token only ever matches exactly.
//!
//! ## Ranges
//!
//! Ranges are half-open `start..end` offsets counted in `char`s. Per-token
//! ranges are merged when they overlap or touch, sorted by start.
//! [`MatchResult::byte_ranges`] converts them for slicing the original text.
//!
//! The overall score is the mean of the token scores.

use std::ops::Range;

use serde::Serialize;

use crate::config::FuzzyConfig;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// Mean token score in `0.0..=1.0`
    pub score: f64,
    /// Disjoint, sorted, char-offset highlight ranges
    pub ranges: Vec<Range<usize>>,
}

impl MatchResult {
    /// The highlight ranges as byte offsets into `text`, the string that was
    /// matched.
    pub fn byte_ranges(&self, text: &str) -> Vec<Range<usize>> {
        let mut offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        offsets.push(text.len());
        let at = |char_idx: usize| offsets.get(char_idx).copied().unwrap_or(text.len());
        self.ranges
            .iter()
            .map(|r| at(r.start)..at(r.end))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenMatch {
    pub range: Range<usize>,
    pub score: f64,
}

/// Matches every whitespace-separated token of `query` against `text`.
///
/// Returns `None` when the query is blank or when any token fails to match.
pub fn match_query(query: &str, text: &str, config: &FuzzyConfig) -> Option<MatchResult> {
    let tokens: Vec<Vec<char>> = query.split_whitespace().map(fold).collect();
    if tokens.is_empty() {
        return None;
    }

    let haystack = fold(text);
    let mut ranges = Vec::with_capacity(tokens.len());
    let mut total = 0.0;
    for token in &tokens {
        let hit = match_token(token, &haystack, config)?;
        total += hit.score;
        ranges.push(hit.range);
    }

    Some(MatchResult {
        score: total / tokens.len() as f64,
        ranges: merge_ranges(ranges),
    })
}

/// Best match of one already folded token inside already folded text.
pub fn match_token(token: &[char], text: &[char], config: &FuzzyConfig) -> Option<TokenMatch> {
    let n = token.len();
    if n == 0 || text.is_empty() {
        return None;
    }

    if let Some(start) = find(text, token) {
        return Some(TokenMatch {
            range: start..start + n,
            score: 1.0,
        });
    }
    if n < config.min_fuzzy_len {
        return None;
    }

    let slack = ((n as f64 * config.tolerance).ceil() as usize).max(1);
    let min_len = n.saturating_sub(slack).max(1);
    let max_len = n.saturating_add(slack).min(text.len());

    // (ratio, start, len); strict improvement keeps the earliest, shortest span
    let mut best: Option<(f64, usize, usize)> = None;
    for start in 0..text.len() {
        for len in min_len..=max_len {
            if start + len > text.len() {
                break;
            }
            let distance = levenshtein_chars(token, &text[start..start + len]);
            let ratio = distance as f64 / n.max(len) as f64;
            if ratio > config.max_ratio {
                continue;
            }
            if best.map_or(true, |(r, _, _)| ratio < r) {
                best = Some((ratio, start, len));
            }
        }
    }

    best.map(|(ratio, start, len)| TokenMatch {
        range: start..start + len,
        score: 1.0 - ratio,
    })
}

/// Classic unit-cost edit distance over `char`s.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    levenshtein_chars(&a, &b)
}

fn levenshtein_chars(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Merges overlapping or adjacent ranges into sorted, disjoint ranges.
pub fn merge_ranges(mut ranges: Vec<Range<usize>>) -> Vec<Range<usize>> {
    ranges.retain(|r| r.start < r.end);
    ranges.sort_by_key(|r| (r.start, r.end));

    let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }
    merged
}

/// Lowercases one `char` at a time so offsets stay aligned with the input.
fn fold(s: &str) -> Vec<char> {
    s.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}

fn find(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
