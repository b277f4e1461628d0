use crate::catalog::Catalog;
use crate::matcher::scorer::{score, EXACT_MATCH};
use crate::model::{MatchResult, Profile, Resolution, MAX_SPECIFICITY};
use crate::normalizer::normalize;

/// Resolves a raw device name to the best catalog profile.
///
/// Every profile is scored by its best pattern. On equal scores the more
/// platform-specific profile wins, then the one listed first. A candidate is
/// accepted when its score is strictly above `threshold`; at a threshold of
/// exactly 1.0 an exact match still passes. Never fails: an empty name or an
/// empty catalog is simply `NoMatch`.
pub fn resolve(raw: &str, catalog: &Catalog, threshold: f64) -> Resolution {
    let normalized = normalize(raw);
    if normalized.is_empty() {
        return Resolution::NoMatch;
    }

    let mut best: Option<(&Profile, f64)> = None;
    for profile in catalog.profiles() {
        let candidate = effective_score(&normalized, profile);
        if best.is_none_or(|(leader, top)| outranks(candidate, profile, top, leader)) {
            best = Some((profile, candidate));
            // nothing later can beat this one
            if candidate >= EXACT_MATCH && profile.specificity >= MAX_SPECIFICITY {
                break;
            }
        }
    }

    match best {
        Some((profile, top)) if accepts(top, threshold) => Resolution::Match(MatchResult {
            name: profile.name.clone(),
            score: top,
        }),
        _ => Resolution::NoMatch,
    }
}

/// Highest score a profile reaches over its patterns.
pub fn effective_score(normalized: &str, profile: &Profile) -> f64 {
    profile
        .patterns
        .iter()
        .map(|pattern| score(normalized, pattern))
        .fold(0.0, f64::max)
}

fn outranks(candidate: f64, profile: &Profile, top: f64, leader: &Profile) -> bool {
    candidate > top || (candidate == top && profile.specificity > leader.specificity)
}

fn accepts(top: f64, threshold: f64) -> bool {
    top > threshold || (top >= EXACT_MATCH && threshold == EXACT_MATCH)
}
