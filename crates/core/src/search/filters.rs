//! Named filters and the single-pass filter applicator.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::inventory::VehicleRecord;

use super::colors::expand_color_words;
use super::fuzzy::fuzzy_match;
use super::normalize::{normalize_text, split_multi_value, split_words};

/// The recognized filter vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    Veiculo,
    Placa,
    Cor,
    Ano,
    Km,
}

impl FilterField {
    pub const ALL: [FilterField; 5] = [
        FilterField::Veiculo,
        FilterField::Placa,
        FilterField::Cor,
        FilterField::Ano,
        FilterField::Km,
    ];

    /// Order in which filters are dropped when relaxing a query. The model
    /// goes last; the plate is never dropped.
    pub const RELAXATION_ORDER: [FilterField; 4] = [
        FilterField::Cor,
        FilterField::Ano,
        FilterField::Km,
        FilterField::Veiculo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterField::Veiculo => "veiculo",
            FilterField::Placa => "placa",
            FilterField::Cor => "cor",
            FilterField::Ano => "ano",
            FilterField::Km => "km",
        }
    }

    /// Free-text fields compared with fuzzy matching; the rest compare by
    /// normalized equality.
    pub fn is_fuzzy(&self) -> bool {
        matches!(
            self,
            FilterField::Veiculo | FilterField::Placa | FilterField::Cor
        )
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown filter: {0}")]
pub struct UnknownFilter(pub String);

impl FromStr for FilterField {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "veiculo" | "modelo" => Ok(FilterField::Veiculo),
            "placa" => Ok(FilterField::Placa),
            "cor" => Ok(FilterField::Cor),
            "ano" => Ok(FilterField::Ano),
            "km" => Ok(FilterField::Km),
            other => Err(UnknownFilter(other.to_string())),
        }
    }
}

/// Active filters, keyed by field. Empty values are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FilterSet {
    filters: BTreeMap<FilterField, String>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a filter; a blank value removes it instead.
    pub fn insert(&mut self, field: FilterField, value: impl Into<String>) {
        let value = value.into();
        let value = value.trim();
        if value.is_empty() {
            self.filters.remove(&field);
        } else {
            self.filters.insert(field, value.to_string());
        }
    }

    pub fn with(mut self, field: FilterField, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn remove(&mut self, field: FilterField) -> Option<String> {
        self.filters.remove(&field)
    }

    pub fn get(&self, field: FilterField) -> Option<&str> {
        self.filters.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: FilterField) -> bool {
        self.filters.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterField, &str)> {
        self.filters.iter().map(|(f, v)| (*f, v.as_str()))
    }
}

impl<V: Into<String>> FromIterator<(FilterField, V)> for FilterSet {
    fn from_iter<I: IntoIterator<Item = (FilterField, V)>>(iter: I) -> Self {
        let mut set = FilterSet::new();
        for (field, value) in iter {
            set.insert(field, value);
        }
        set
    }
}

/// Keep the records that satisfy every filter.
///
/// Fuzzy fields pool the words of all comma-separated alternatives and keep
/// a record when any word matches; color words also match their canonical
/// feed color. Exact fields keep a record when its
/// normalized value equals one of the normalized alternatives.
pub fn apply_filters<'a>(
    records: &[&'a VehicleRecord],
    filters: &FilterSet,
    threshold: f64,
) -> Vec<&'a VehicleRecord> {
    let mut candidates = records.to_vec();

    for (field, value) in filters.iter() {
        if field.is_fuzzy() {
            let mut words = split_words(value);
            if field == FilterField::Cor {
                words = expand_color_words(&words);
            }
            candidates.retain(|record| {
                let content = record.field_text(field).unwrap_or_default();
                fuzzy_match(&words, &content, threshold).matched
            });
        } else {
            let alternatives: HashSet<String> = split_multi_value(value)
                .iter()
                .map(|alt| normalize_text(alt))
                .collect();
            candidates.retain(|record| {
                let content = normalize_text(&record.field_text(field).unwrap_or_default());
                alternatives.contains(&content)
            });
        }

        if candidates.is_empty() {
            break;
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn ids(records: &[&VehicleRecord]) -> Vec<String> {
        records.iter().filter_map(|r| r.id_string()).collect()
    }

    #[test]
    fn test_filter_field_parsing() {
        assert_eq!("veiculo".parse::<FilterField>(), Ok(FilterField::Veiculo));
        assert_eq!("Modelo".parse::<FilterField>(), Ok(FilterField::Veiculo));
        assert_eq!("km".parse::<FilterField>(), Ok(FilterField::Km));
        assert!("valor".parse::<FilterField>().is_err());
    }

    #[test]
    fn test_filter_set_drops_blank_values() {
        let set = FilterSet::new()
            .with(FilterField::Cor, "  ")
            .with(FilterField::Veiculo, " onix ");
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(FilterField::Veiculo), Some("onix"));
        assert!(!set.contains(FilterField::Cor));
    }

    #[test]
    fn test_filter_set_serializes_as_map() {
        let set = FilterSet::new().with(FilterField::Cor, "azul");
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json, serde_json::json!({"cor": "azul"}));
    }

    #[test]
    fn test_fuzzy_filter_on_model() {
        let vehicles = fixtures::sample_inventory();
        let refs: Vec<&VehicleRecord> = vehicles.iter().collect();

        let result = apply_filters(&refs, &FilterSet::new().with(FilterField::Veiculo, "corolla"), 80.0);
        assert_eq!(ids(&result), vec!["1", "2"]);
    }

    #[test]
    fn test_multi_value_is_or() {
        let vehicles = fixtures::sample_inventory();
        let refs: Vec<&VehicleRecord> = vehicles.iter().collect();

        let result = apply_filters(&refs, &FilterSet::new().with(FilterField::Cor, "azul, preto"), 80.0);
        assert_eq!(ids(&result), vec!["3", "4", "6"]);
    }

    #[test]
    fn test_color_synonyms() {
        let mut vehicles = fixtures::sample_inventory();
        vehicles.push(fixtures::vehicle(9, "NISSAN VERSA", "PRATA", "2021", 40000, 80000));
        let refs: Vec<&VehicleRecord> = vehicles.iter().collect();

        let result = apply_filters(&refs, &FilterSet::new().with(FilterField::Cor, "white"), 80.0);
        assert_eq!(ids(&result), vec!["2", "5"]);

        let result = apply_filters(&refs, &FilterSet::new().with(FilterField::Cor, "cinza"), 80.0);
        assert_eq!(ids(&result), vec!["1", "8", "9"]);

        let result = apply_filters(&refs, &FilterSet::new().with(FilterField::Cor, "silver"), 80.0);
        assert_eq!(ids(&result), vec!["9"]);
    }

    #[test]
    fn test_unknown_filter_name() {
        let err = "preco".parse::<FilterField>().unwrap_err();
        assert_eq!(err.to_string(), "unknown filter: preco");
        assert_eq!(err, UnknownFilter("preco".to_string()));
    }

    #[test]
    fn test_exact_filter_on_year() {
        let vehicles = fixtures::sample_inventory();
        let refs: Vec<&VehicleRecord> = vehicles.iter().collect();

        let result = apply_filters(&refs, &FilterSet::new().with(FilterField::Ano, "2020/2021"), 80.0);
        assert_eq!(ids(&result), vec!["1"]);

        // Exact fields compare whole values.
        let result = apply_filters(&refs, &FilterSet::new().with(FilterField::Ano, "2020"), 80.0);
        assert_eq!(ids(&result), vec!["8"]);
    }

    #[test]
    fn test_filters_are_conjunctive_and_order_independent() {
        let vehicles = fixtures::sample_inventory();
        let refs: Vec<&VehicleRecord> = vehicles.iter().collect();

        let a = FilterSet::new()
            .with(FilterField::Veiculo, "corolla")
            .with(FilterField::Cor, "branco");
        let b: FilterSet = vec![
            (FilterField::Cor, "branco"),
            (FilterField::Veiculo, "corolla"),
        ]
        .into_iter()
        .collect();

        let ra = apply_filters(&refs, &a, 80.0);
        let rb = apply_filters(&refs, &b, 80.0);
        assert_eq!(ids(&ra), vec!["2"]);
        assert_eq!(ids(&ra), ids(&rb));

        // Applying twice gives the same set.
        let again = apply_filters(&ra, &a, 80.0);
        assert_eq!(ids(&again), ids(&ra));
    }

    #[test]
    fn test_result_is_subset_of_input() {
        let vehicles = fixtures::sample_inventory();
        let refs: Vec<&VehicleRecord> = vehicles.iter().take(3).collect();

        let result = apply_filters(&refs, &FilterSet::new().with(FilterField::Cor, "azul"), 80.0);
        assert!(result
            .iter()
            .all(|r| refs.iter().any(|orig| std::ptr::eq(*orig, *r))));
    }

    #[test]
    fn test_missing_field_never_matches() {
        let vehicle = VehicleRecord::default();
        let refs = vec![&vehicle];
        assert!(apply_filters(&refs, &FilterSet::new().with(FilterField::Placa, "abc1234"), 80.0).is_empty());
        assert!(apply_filters(&refs, &FilterSet::new().with(FilterField::Km, "0"), 80.0).is_empty());
    }

    #[test]
    fn test_empty_filter_set_keeps_everything() {
        let vehicles = fixtures::sample_inventory();
        let refs: Vec<&VehicleRecord> = vehicles.iter().collect();
        assert_eq!(apply_filters(&refs, &FilterSet::new(), 80.0).len(), vehicles.len());
    }
}
