//! Color synonyms.
//!
//! The feed spells colors in Portuguese, upper case (`BRANCO`, `PRATA`).
//! Callers may ask for a feminine form or an English name instead, so a
//! color word is widened with the canonical color it stands for.

use std::collections::BTreeMap;

use super::normalize::normalize_text;

/// Canonical feed color and the words accepted for it.
pub const COLOR_SYNONYMS: &[(&str, &[&str])] = &[
    ("branco", &["branco", "branca", "white"]),
    ("preto", &["preto", "preta", "black"]),
    ("vermelho", &["vermelho", "vermelha", "red"]),
    ("azul", &["azul", "blue"]),
    ("prata", &["prata", "silver", "cinza", "gray"]),
    ("amarelo", &["amarelo", "amarela", "yellow"]),
    ("verde", &["verde", "green"]),
    ("bege", &["bege", "creme", "cream"]),
    ("dourado", &["dourado", "dourada", "gold"]),
    ("rosa", &["rosa", "pink"]),
    ("roxo", &["roxo", "roxa", "purple"]),
    ("marrom", &["marrom", "brown"]),
];

/// The canonical color for `word`, if it is a known variation.
pub fn canonical_color(word: &str) -> Option<&'static str> {
    let word = normalize_text(word);
    COLOR_SYNONYMS
        .iter()
        .find(|(_, variations)| variations.iter().any(|v| *v == word))
        .map(|(canonical, _)| *canonical)
}

/// Add the canonical color after each word that has one.
///
/// The original words are kept, so a feed that spells a color `CINZA`
/// still matches a query for `cinza`.
pub fn expand_color_words(words: &[String]) -> Vec<String> {
    let mut expanded = Vec::with_capacity(words.len() * 2);
    for word in words {
        expanded.push(word.clone());
        if let Some(canonical) = canonical_color(word) {
            if normalize_text(word) != canonical {
                expanded.push(canonical.to_string());
            }
        }
    }
    expanded
}

/// The synonym table keyed by canonical color, as exposed over the API.
pub fn color_mapping() -> BTreeMap<&'static str, &'static [&'static str]> {
    COLOR_SYNONYMS.iter().copied().collect()
}
