//! Result ordering driven by the supplied range bounds.

use std::cmp::Ordering;

use crate::inventory::VehicleRecord;

use super::normalize::{parse_mileage, parse_price, parse_year};
use super::ranges::{RangeBounds, RangeKind};

fn price_or_zero(record: &VehicleRecord) -> f64 {
    record.price_value().and_then(parse_price).unwrap_or(0.0)
}

/// Sort in place. The first applicable rule wins:
///
/// 1. `kmmax` supplied: ascending mileage, unknown mileage last.
/// 2. `valormax` parses: closest price first.
/// 3. `anomax` parses: closest year first.
/// 4. otherwise: most expensive first.
///
/// The sort is stable, so ties keep inventory order.
pub fn sort_vehicles(records: &mut [&VehicleRecord], bounds: &RangeBounds) {
    if bounds.is_supplied(RangeKind::Kmmax) {
        records.sort_by(|a, b| {
            let ka = a.km.as_ref().and_then(parse_mileage);
            let kb = b.km.as_ref().and_then(parse_mileage);
            match (ka, kb) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        });
    } else if let Some(target) = bounds.price_ceiling() {
        records.sort_by(|a, b| {
            let da = (price_or_zero(a) - target).abs();
            let db = (price_or_zero(b) - target).abs();
            da.total_cmp(&db)
        });
    } else if let Some(target) = bounds.year_reference() {
        records.sort_by_key(|r| {
            let year = r.ano.as_ref().and_then(parse_year).unwrap_or(0);
            (i64::from(year) - i64::from(target)).abs()
        });
    } else {
        records.sort_by(|a, b| price_or_zero(b).total_cmp(&price_or_zero(a)));
    }
}
