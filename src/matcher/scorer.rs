use crate::normalizer::tokens;
use std::collections::BTreeSet;

/// Score reserved for an exact match of normalized forms.
pub const EXACT_MATCH: f64 = 1.0;

/// Share of the pattern's words found in the input.
const COVERAGE_WEIGHT: f64 = 0.55;
/// Share of the input's words found in the pattern.
const PRECISION_WEIGHT: f64 = 0.25;
/// Every word of the pattern occurs in the input.
const PATTERN_CONTAINED_BONUS: f64 = 0.10;
/// Every word of the input occurs in the pattern.
const INPUT_CONTAINED_BONUS: f64 = 0.05;
/// Shorter words only count when they match a whole word.
const MIN_FRAGMENT: usize = 3;

/// Scores a normalized input against one normalized pattern, in [0, 1].
///
/// Only identical strings score 1.0; everything else tops out at 0.95.
/// A word is found on the other side when it equals a word there or is a
/// substring of one (`xbox` inside `xbox360`), and earns credit for the
/// length of the shared fragment, so a longer match counts for more than a
/// short one. Word order is ignored. Two empty strings score 0.
pub fn score(input: &str, pattern: &str) -> f64 {
    if input.is_empty() || pattern.is_empty() {
        return 0.0;
    }
    if input == pattern {
        return EXACT_MATCH;
    }

    let input_words: BTreeSet<&str> = tokens(input).collect();
    let pattern_words: BTreeSet<&str> = tokens(pattern).collect();

    let (pattern_found, pattern_whole) = credit(&pattern_words, &input_words);
    if pattern_found == 0 {
        return 0.0;
    }
    let (input_found, input_whole) = credit(&input_words, &pattern_words);

    let coverage = pattern_found as f64 / weight(&pattern_words) as f64;
    let precision = input_found as f64 / weight(&input_words) as f64;

    let mut total = COVERAGE_WEIGHT * coverage + PRECISION_WEIGHT * precision;
    if pattern_whole {
        total += PATTERN_CONTAINED_BONUS;
    }
    if input_whole {
        total += INPUT_CONTAINED_BONUS;
    }
    total.min(EXACT_MATCH)
}

/// Credit earned by `words` against `other`, and whether every word was
/// found in full.
fn credit(words: &BTreeSet<&str>, other: &BTreeSet<&str>) -> (usize, bool) {
    let mut found = 0;
    let mut whole = true;
    for word in words {
        let len = word.chars().count();
        let best = other.iter().map(|o| overlap(word, o)).max().unwrap_or(0);
        found += best;
        whole &= best == len;
    }
    (found, whole)
}

/// Length of the shared fragment when one word contains the other.
fn overlap(a: &str, b: &str) -> usize {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let len = short.chars().count();
    if short == long || (len >= MIN_FRAGMENT && long.contains(short)) {
        len
    } else {
        0
    }
}

fn weight(words: &BTreeSet<&str>) -> usize {
    words.iter().map(|w| w.chars().count()).sum()
}
