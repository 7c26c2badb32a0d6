//! The search engine: strict query first, then progressive relaxation.
//!
//! A search runs the filter, range and exclusion stages against the
//! snapshot. When nothing survives, constraints are dropped one at a time
//! in a fixed order until something does:
//!
//! 1. A lone non-model filter is never relaxed; the search ends empty.
//! 2. A model that matches nothing in the whole inventory is dropped.
//! 3. Range bounds are cleared: mileage, then year, then price.
//! 4. Filters are dropped: color, year, mileage, then model, never going
//!    below two remaining filters.
//!
//! Every step removes exactly one constraint and nothing is ever re-added,
//! so a search makes at most `filters + ranges` retries.

use serde::Serialize;
use std::collections::HashSet;
use std::time::Instant;
use tracing::debug;

use crate::config::SearchConfig;
use crate::inventory::VehicleRecord;
use crate::metrics::{FALLBACK_REMOVALS, SEARCHES_TOTAL, SEARCH_DURATION};

use super::filters::{apply_filters, FilterField, FilterSet};
use super::fuzzy::model_exists;
use super::ranges::{apply_range_filters, RangeBounds, RangeKind};
use super::sort::sort_vehicles;

/// Record identifiers to leave out of the results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludedIds(HashSet<String>);

impl ExcludedIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma-separated list such as `"12, 40,77"`.
    pub fn from_csv(value: &str) -> Self {
        value
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .collect()
    }

    pub fn insert(&mut self, id: impl Into<String>) {
        self.0.insert(id.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Records without an identifier are never excluded.
    pub fn excludes(&self, record: &VehicleRecord) -> bool {
        !self.0.is_empty()
            && record
                .id_string()
                .is_some_and(|id| self.0.contains(&id))
    }
}

impl<S: Into<String>> FromIterator<S> for ExcludedIds {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// A search query.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub filters: FilterSet,
    pub ranges: RangeBounds,
    pub excluded: ExcludedIds,
}

impl SearchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: FilterField, value: impl Into<String>) -> Self {
        self.filters.insert(field, value);
        self
    }

    pub fn range(mut self, kind: RangeKind, value: impl Into<String>) -> Self {
        self.ranges = self.ranges.with(kind, value);
        self
    }

    pub fn exclude(mut self, id: impl Into<String>) -> Self {
        self.excluded.insert(id);
        self
    }
}

/// How a search was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOutcome {
    /// No filters or ranges: the whole inventory.
    Unfiltered,
    /// The query as given matched.
    Strict,
    /// Matched after dropping constraints.
    Relaxed,
    /// A single non-model filter matched nothing.
    SingleFilterNotModel,
    /// No relaxation produced results.
    Exhausted,
}

impl SearchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchOutcome::Unfiltered => "unfiltered",
            SearchOutcome::Strict => "strict",
            SearchOutcome::Relaxed => "relaxed",
            SearchOutcome::SingleFilterNotModel => "single_filter_not_model",
            SearchOutcome::Exhausted => "exhausted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalKind {
    Filter,
    Range,
}

impl RemovalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemovalKind::Filter => "filter",
            RemovalKind::Range => "range",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalReason {
    ModelNotFoundInDatabase,
    RangeRelaxed,
    FilterRelaxed,
}

impl RemovalReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemovalReason::ModelNotFoundInDatabase => "model_not_found_in_database",
            RemovalReason::RangeRelaxed => "range_relaxed",
            RemovalReason::FilterRelaxed => "filter_relaxed",
        }
    }
}

/// A constraint dropped during relaxation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedFilter {
    /// `name(value)`, e.g. `veiculo(civic)`.
    pub id: String,
    pub name: String,
    pub value: String,
    pub kind: RemovalKind,
    pub reason: RemovalReason,
}

impl RemovedFilter {
    fn new(name: &str, value: String, kind: RemovalKind, reason: RemovalReason) -> Self {
        Self {
            id: format!("{}({})", name, value),
            name: name.to_string(),
            value,
            kind,
            reason,
        }
    }
}

/// What was relaxed to reach a relaxed result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackInfo {
    pub removed: Vec<RemovedFilter>,
    pub remaining_filters: FilterSet,
    pub remaining_ranges: RangeBounds,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub vehicles: Vec<VehicleRecord>,
    /// Matches before the result limit was applied.
    pub total_found: usize,
    pub outcome: SearchOutcome,
    /// Present only for relaxed results.
    pub fallback_info: Option<FallbackInfo>,
    /// Identifiers of removed constraints, in removal order.
    pub removed_filters: Vec<String>,
}

impl SearchResult {
    fn empty(outcome: SearchOutcome, removed: &[RemovedFilter]) -> Self {
        Self {
            vehicles: Vec::new(),
            total_found: 0,
            outcome,
            fallback_info: None,
            removed_filters: removed.iter().map(|r| r.id.clone()).collect(),
        }
    }
}

/// Runs searches against an inventory snapshot.
///
/// The engine holds no per-query state and can be shared freely.
#[derive(Debug, Clone)]
pub struct SearchEngine {
    config: SearchConfig,
}

impl SearchEngine {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The same engine with a different result limit.
    pub fn with_result_limit(&self, result_limit: usize) -> Self {
        Self {
            config: SearchConfig {
                result_limit,
                ..self.config.clone()
            },
        }
    }

    pub fn search(&self, vehicles: &[VehicleRecord], request: &SearchRequest) -> SearchResult {
        let started = Instant::now();
        let result = self.resolve(vehicles, request);
        SEARCH_DURATION.observe(started.elapsed().as_secs_f64());
        SEARCHES_TOTAL
            .with_label_values(&[result.outcome.as_str()])
            .inc();
        debug!(
            outcome = result.outcome.as_str(),
            total_found = result.total_found,
            returned = result.vehicles.len(),
            removed = result.removed_filters.len(),
            "Search resolved"
        );
        result
    }

    fn resolve(&self, vehicles: &[VehicleRecord], request: &SearchRequest) -> SearchResult {
        let all: Vec<&VehicleRecord> = vehicles.iter().collect();
        let mut filters = request.filters.clone();
        let mut ranges = request.ranges.clone();
        let excluded = &request.excluded;

        if filters.is_empty() && !ranges.any_supplied() {
            let mut matches: Vec<&VehicleRecord> =
                all.into_iter().filter(|r| !excluded.excludes(r)).collect();
            sort_vehicles(&mut matches, &ranges);
            return SearchResult {
                total_found: matches.len(),
                vehicles: matches.into_iter().cloned().collect(),
                outcome: SearchOutcome::Unfiltered,
                fallback_info: None,
                removed_filters: Vec::new(),
            };
        }

        let matches = self.attempt(&all, &filters, &ranges, excluded);
        if !matches.is_empty() {
            return self.finish(matches, SearchOutcome::Strict, Vec::new(), &filters, &ranges);
        }

        if filters.len() == 1 && !filters.contains(FilterField::Veiculo) {
            debug!("Single non-model filter matched nothing, not relaxing");
            return SearchResult::empty(SearchOutcome::SingleFilterNotModel, &[]);
        }

        let mut removed = Vec::new();

        if let Some(model) = filters.get(FilterField::Veiculo).map(str::to_string) {
            if !model_exists(&all, &model, self.config.fuzzy_threshold) {
                debug!(model = %model, "Model not found in inventory, dropping it");
                filters.remove(FilterField::Veiculo);
                removed.push(self.record_removal(RemovedFilter::new(
                    FilterField::Veiculo.as_str(),
                    model,
                    RemovalKind::Filter,
                    RemovalReason::ModelNotFoundInDatabase,
                )));

                if !filters.is_empty() {
                    let matches = self.attempt(&all, &filters, &ranges, excluded);
                    if !matches.is_empty() {
                        return self.finish(matches, SearchOutcome::Relaxed, removed, &filters, &ranges);
                    }
                }
            }
        }

        for kind in RangeKind::RELAXATION_ORDER {
            if !ranges.is_active(kind) {
                continue;
            }
            let Some(value) = ranges.clear(kind) else {
                continue;
            };
            debug!(range = kind.as_str(), value = %value, "Relaxing range");
            removed.push(self.record_removal(RemovedFilter::new(
                kind.as_str(),
                value,
                RemovalKind::Range,
                RemovalReason::RangeRelaxed,
            )));

            let matches = self.attempt(&all, &filters, &ranges, excluded);
            if !matches.is_empty() {
                return self.finish(matches, SearchOutcome::Relaxed, removed, &filters, &ranges);
            }
        }

        for field in FilterField::RELAXATION_ORDER {
            if !filters.contains(field) {
                continue;
            }
            if filters.len() <= 2 {
                debug!(remaining = filters.len(), "Not relaxing below two filters");
                break;
            }
            let Some(value) = filters.remove(field) else {
                continue;
            };
            debug!(filter = field.as_str(), value = %value, "Relaxing filter");
            removed.push(self.record_removal(RemovedFilter::new(
                field.as_str(),
                value,
                RemovalKind::Filter,
                RemovalReason::FilterRelaxed,
            )));

            let matches = self.attempt(&all, &filters, &ranges, excluded);
            if !matches.is_empty() {
                return self.finish(matches, SearchOutcome::Relaxed, removed, &filters, &ranges);
            }
        }

        debug!(removed = removed.len(), "Search exhausted all relaxations");
        SearchResult::empty(SearchOutcome::Exhausted, &removed)
    }

    /// Filter, range and exclude; sorted when non-empty.
    fn attempt<'a>(
        &self,
        all: &[&'a VehicleRecord],
        filters: &FilterSet,
        ranges: &RangeBounds,
        excluded: &ExcludedIds,
    ) -> Vec<&'a VehicleRecord> {
        let filtered = apply_filters(all, filters, self.config.fuzzy_threshold);
        let mut matches = apply_range_filters(&filtered, ranges, &self.config);
        matches.retain(|r| !excluded.excludes(r));
        if !matches.is_empty() {
            sort_vehicles(&mut matches, ranges);
        }
        matches
    }

    fn finish(
        &self,
        matches: Vec<&VehicleRecord>,
        outcome: SearchOutcome,
        removed: Vec<RemovedFilter>,
        filters: &FilterSet,
        ranges: &RangeBounds,
    ) -> SearchResult {
        let total_found = matches.len();
        let vehicles = matches
            .into_iter()
            .take(self.config.result_limit)
            .cloned()
            .collect();
        let removed_filters = removed.iter().map(|r| r.id.clone()).collect();
        let fallback_info = (outcome == SearchOutcome::Relaxed).then(|| FallbackInfo {
            removed,
            remaining_filters: filters.clone(),
            remaining_ranges: ranges.clone(),
        });

        SearchResult {
            vehicles,
            total_found,
            outcome,
            fallback_info,
            removed_filters,
        }
    }

    fn record_removal(&self, removal: RemovedFilter) -> RemovedFilter {
        FALLBACK_REMOVALS
            .with_label_values(&[removal.kind.as_str(), removal.reason.as_str()])
            .inc();
        removal
    }
}
