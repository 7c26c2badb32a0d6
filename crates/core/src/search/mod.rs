//! Fuzzy vehicle search with progressive fallback.
//!
//! Leaves first: [`normalize`] canonicalizes text and numbers, [`fuzzy`]
//! compares words against field content, [`colors`] widens color words to
//! their feed spelling, [`filters`] and [`ranges`] narrow a candidate set,
//! [`sort`] orders it, and [`fallback`] drives the whole thing through the
//! relaxation sequence.

mod colors;
mod fallback;
mod filters;
mod fuzzy;
mod normalize;
mod ranges;
mod sort;

pub use colors::{canonical_color, color_mapping, expand_color_words, COLOR_SYNONYMS};
pub use fallback::{
    ExcludedIds, FallbackInfo, RemovalKind, RemovalReason, RemovedFilter, SearchEngine,
    SearchOutcome, SearchRequest, SearchResult,
};
pub use filters::{apply_filters, FilterField, FilterSet, UnknownFilter};
pub use fuzzy::{fuzzy_match, model_exists, partial_ratio, ratio, FuzzyOutcome, MatchReason};
pub use normalize::{
    normalize_text, parse_mileage, parse_mileage_text, parse_price, parse_price_text, parse_year,
    parse_year_text, split_multi_value, split_words,
};
pub use ranges::{apply_range_filters, RangeBounds, RangeKind};
pub use sort::sort_vehicles;
