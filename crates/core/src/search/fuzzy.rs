//! Fuzzy matching of query words against field content.

use serde::Serialize;

use crate::inventory::VehicleRecord;

use super::normalize::{normalize_text, split_words};

/// Words shorter than this (after normalization) are ignored.
const MIN_WORD_LEN: usize = 2;
/// Words at least this long may match by similarity.
const MIN_FUZZY_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchReason {
    Exact,
    Fuzzy,
    NoMatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuzzyOutcome {
    pub matched: bool,
    pub reason: MatchReason,
}

impl FuzzyOutcome {
    const NO_MATCH: Self = Self {
        matched: false,
        reason: MatchReason::NoMatch,
    };
}

/// Whole-string similarity, 0-100.
pub fn ratio(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b) * 100.0
}

/// Best similarity of the shorter string against any equally long window
/// of the longer one, 0-100.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (short, long) = if a_chars.len() <= b_chars.len() {
        (a_chars, b_chars)
    } else {
        (b_chars, a_chars)
    };

    if short.is_empty() {
        return if long.is_empty() { 100.0 } else { 0.0 };
    }

    let needle: String = short.iter().collect();
    let mut best = 0.0_f64;
    for window in long.windows(short.len()) {
        let candidate: String = window.iter().collect();
        best = best.max(ratio(&needle, &candidate));
        if best >= 100.0 {
            break;
        }
    }
    best
}

/// Does any of `words` match `field`?
///
/// A word matches when its normalized form is contained in the normalized
/// field, or (for words of 3+ characters) when the better of the partial
/// and whole-string similarity reaches `threshold`.
pub fn fuzzy_match<S: AsRef<str>>(words: &[S], field: &str, threshold: f64) -> FuzzyOutcome {
    let content = normalize_text(field);

    for word in words {
        let word = normalize_text(word.as_ref());
        let len = word.chars().count();
        if len < MIN_WORD_LEN {
            continue;
        }

        if content.contains(&word) {
            return FuzzyOutcome {
                matched: true,
                reason: MatchReason::Exact,
            };
        }

        if len >= MIN_FUZZY_LEN {
            let score = partial_ratio(&content, &word).max(ratio(&content, &word));
            if score >= threshold {
                return FuzzyOutcome {
                    matched: true,
                    reason: MatchReason::Fuzzy,
                };
            }
        }
    }

    FuzzyOutcome::NO_MATCH
}

/// Does any record's model description match `model`?
pub fn model_exists(records: &[&VehicleRecord], model: &str, threshold: f64) -> bool {
    let words = split_words(model);
    records
        .iter()
        .filter_map(|r| r.model_text())
        .any(|text| fuzzy_match(&words, text, threshold).matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn test_ratio_bounds() {
        assert_eq!(ratio("civic", "civic"), 100.0);
        assert_eq!(ratio("", "abc"), 0.0);
        assert!(ratio("corola", "corolla") > 80.0);
    }

    #[test]
    fn test_partial_ratio_finds_window() {
        assert_eq!(partial_ratio("toyotacorollaxei", "corolla"), 100.0);
        assert!(partial_ratio("toyotacorollaxei", "corola") >= 80.0);
        assert!(partial_ratio("hondacivic", "corolla") < 80.0);
        assert_eq!(partial_ratio("", ""), 100.0);
        assert_eq!(partial_ratio("abc", ""), 0.0);
    }

    #[test]
    fn test_exact_substring_match() {
        let outcome = fuzzy_match(&["Corolla"], "TOYOTA COROLLA XEI 2.0", 80.0);
        assert!(outcome.matched);
        assert_eq!(outcome.reason, MatchReason::Exact);
    }

    #[test]
    fn test_diacritics_are_ignored() {
        let outcome = fuzzy_match(&["perola"], "BRANCO PÉROLA", 80.0);
        assert_eq!(outcome.reason, MatchReason::Exact);
    }

    #[test]
    fn test_misspelling_matches_fuzzily() {
        let outcome = fuzzy_match(&["corola"], "TOYOTA COROLLA XEI", 80.0);
        assert!(outcome.matched);
        assert_eq!(outcome.reason, MatchReason::Fuzzy);
    }

    #[test]
    fn test_any_word_suffices() {
        let outcome = fuzzy_match(&["banana", "civic"], "HONDA CIVIC EXL", 80.0);
        assert!(outcome.matched);
    }

    #[test]
    fn test_short_words_are_skipped() {
        let outcome = fuzzy_match(&["a", "x"], "FIAT UNO X", 80.0);
        assert!(!outcome.matched);
        assert_eq!(outcome.reason, MatchReason::NoMatch);
    }

    #[test]
    fn test_two_letter_words_only_match_exactly() {
        assert!(fuzzy_match(&["c4"], "CITROEN C4 CACTUS", 80.0).matched);
        assert!(!fuzzy_match(&["c5"], "CITROEN C4 CACTUS", 80.0).matched);
    }

    #[test]
    fn test_unrelated_word_does_not_match() {
        let outcome = fuzzy_match(&["civic"], "TOYOTA COROLLA XEI", 80.0);
        assert!(!outcome.matched);
    }

    #[test]
    fn test_empty_field_never_matches() {
        assert!(!fuzzy_match(&["civic"], "", 80.0).matched);
    }

    #[test]
    fn test_model_exists() {
        let vehicles = fixtures::sample_inventory();
        let refs: Vec<&VehicleRecord> = vehicles.iter().collect();
        assert!(model_exists(&refs, "corolla", 80.0));
        assert!(model_exists(&refs, "ferrari, onix", 80.0));
        assert!(!model_exists(&refs, "lamborghini", 80.0));
    }
}
