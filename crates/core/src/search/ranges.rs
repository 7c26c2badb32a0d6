//! Numeric range bounds with tolerance bands.

use serde::Serialize;

use crate::config::SearchConfig;
use crate::inventory::VehicleRecord;

use super::normalize::{
    parse_mileage, parse_mileage_text, parse_price, parse_price_text, parse_year, parse_year_text,
};

/// One of the three range inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeKind {
    Valormax,
    Anomax,
    Kmmax,
}

impl RangeKind {
    /// Order in which ranges are cleared when relaxing a query.
    pub const RELAXATION_ORDER: [RangeKind; 3] =
        [RangeKind::Kmmax, RangeKind::Anomax, RangeKind::Valormax];

    pub fn as_str(&self) -> &'static str {
        match self {
            RangeKind::Valormax => "valormax",
            RangeKind::Anomax => "anomax",
            RangeKind::Kmmax => "kmmax",
        }
    }
}

/// Raw range inputs as supplied by the caller.
///
/// Each bound is kept as text and parsed on use, so a malformed bound only
/// disables itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RangeBounds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valormax: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomax: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kmmax: Option<String>,
}

impl RangeBounds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: RangeKind, value: impl Into<String>) -> Self {
        let value = value.into();
        let value = value.trim();
        *self.slot_mut(kind) = if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        };
        self
    }

    pub fn get(&self, kind: RangeKind) -> Option<&str> {
        match kind {
            RangeKind::Valormax => self.valormax.as_deref(),
            RangeKind::Anomax => self.anomax.as_deref(),
            RangeKind::Kmmax => self.kmmax.as_deref(),
        }
    }

    /// Clear a bound, returning its previous value.
    pub fn clear(&mut self, kind: RangeKind) -> Option<String> {
        self.slot_mut(kind).take()
    }

    /// A non-blank value was given, parseable or not.
    pub fn is_supplied(&self, kind: RangeKind) -> bool {
        self.get(kind).is_some_and(|v| !v.trim().is_empty())
    }

    /// The bound parses and therefore filters.
    pub fn is_active(&self, kind: RangeKind) -> bool {
        match kind {
            RangeKind::Valormax => self.price_ceiling().is_some(),
            RangeKind::Anomax => self.year_reference().is_some(),
            RangeKind::Kmmax => self.mileage_reference().is_some(),
        }
    }

    pub fn any_supplied(&self) -> bool {
        [RangeKind::Valormax, RangeKind::Anomax, RangeKind::Kmmax]
            .iter()
            .any(|k| self.is_supplied(*k))
    }

    pub fn price_ceiling(&self) -> Option<f64> {
        self.valormax.as_deref().and_then(parse_price_text)
    }

    pub fn year_reference(&self) -> Option<i32> {
        self.anomax.as_deref().and_then(parse_year_text)
    }

    pub fn mileage_reference(&self) -> Option<i64> {
        self.kmmax.as_deref().and_then(parse_mileage_text)
    }

    fn slot_mut(&mut self, kind: RangeKind) -> &mut Option<String> {
        match kind {
            RangeKind::Valormax => &mut self.valormax,
            RangeKind::Anomax => &mut self.anomax,
            RangeKind::Kmmax => &mut self.kmmax,
        }
    }
}

/// Apply price, year and mileage bounds, in that order.
pub fn apply_range_filters<'a>(
    records: &[&'a VehicleRecord],
    bounds: &RangeBounds,
    config: &SearchConfig,
) -> Vec<&'a VehicleRecord> {
    let mut candidates = records.to_vec();

    if let Some(ceiling) = bounds.price_ceiling() {
        let limit = ceiling + config.price_tolerance;
        candidates.retain(|r| {
            r.price_value()
                .and_then(parse_price)
                .is_some_and(|p| p <= limit)
        });
    }

    if let Some(reference) = bounds.year_reference() {
        let floor = reference.saturating_sub(config.year_lookback);
        candidates.retain(|r| r.ano.as_ref().and_then(parse_year).is_some_and(|y| y >= floor));
    }

    if let Some(target) = bounds.mileage_reference() {
        let nearest = candidates
            .iter()
            .filter_map(|r| r.km.as_ref().and_then(parse_mileage))
            .min();

        match nearest {
            Some(nearest) => {
                // Nothing at or under the target: anchor the band on the
                // closest mileage available.
                let (lower, upper) = if nearest > target {
                    (nearest, nearest.saturating_add(config.mileage_tolerance))
                } else {
                    (0, target.saturating_add(config.mileage_tolerance))
                };
                candidates.retain(|r| {
                    r.km.as_ref()
                        .and_then(parse_mileage)
                        .is_some_and(|km| km >= lower && km <= upper)
                });
            }
            None => candidates.clear(),
        }
    }

    candidates
}
