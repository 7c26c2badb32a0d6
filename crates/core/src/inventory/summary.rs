//! Inventory statistics and catalog rendering.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::search::{parse_mileage, parse_price, parse_year};

use super::types::{InventorySnapshot, VehicleRecord};

const NOT_INFORMED: &str = "NÃO INFORMADO";

/// Price statistics over vehicles with a parseable price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceStats {
    pub min: f64,
    pub max: f64,
    pub average: f64,
    /// Vehicles that contributed to the statistics.
    pub priced_vehicles: usize,
}

/// Aggregate view of the current inventory.
#[derive(Debug, Clone, Serialize)]
pub struct InventorySummary {
    pub total_vehicles: usize,
    pub by_color: BTreeMap<String, usize>,
    pub by_year: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
}

impl InventorySummary {
    pub fn from_snapshot(snapshot: &InventorySnapshot) -> Self {
        let mut by_color = BTreeMap::new();
        let mut by_year = BTreeMap::new();
        let mut prices = Vec::new();

        for vehicle in &snapshot.vehicles {
            let color = vehicle
                .cor
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_uppercase)
                .unwrap_or_else(|| NOT_INFORMED.to_string());
            *by_color.entry(color).or_insert(0) += 1;

            let year = vehicle
                .ano
                .as_ref()
                .and_then(parse_year)
                .map(|y| y.to_string())
                .unwrap_or_else(|| NOT_INFORMED.to_string());
            *by_year.entry(year).or_insert(0) += 1;

            if let Some(price) = vehicle.price_value().and_then(parse_price) {
                prices.push(price);
            }
        }

        let price = if prices.is_empty() {
            None
        } else {
            let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
            let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let average = prices.iter().sum::<f64>() / prices.len() as f64;
            Some(PriceStats {
                min,
                max,
                average,
                priced_vehicles: prices.len(),
            })
        };

        Self {
            total_vehicles: snapshot.vehicles.len(),
            by_color,
            by_year,
            price,
            generated_at: snapshot.generated_at.clone(),
        }
    }
}

/// Render a vehicle as `MODELO - ANO - KM`.
pub fn catalog_line(vehicle: &VehicleRecord) -> String {
    let model = vehicle
        .model_text()
        .map(str::to_string)
        .unwrap_or_else(|| format!("MODELO {}", NOT_INFORMED));
    let year = vehicle
        .ano
        .as_ref()
        .map(|a| a.as_text())
        .unwrap_or_else(|| format!("ANO {}", NOT_INFORMED));
    let km = match vehicle.km.as_ref().and_then(parse_mileage) {
        Some(0) => "0 KM".to_string(),
        Some(km) => format!("{} KM", group_thousands(km)),
        None => format!("KM {}", NOT_INFORMED),
    };
    format!("{} - {} - {}", model, year, km)
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    if value < 0 {
        grouped.insert(0, '-');
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{FieldValue, InventoryDocument};
    use crate::testing::fixtures;

    #[test]
    fn test_catalog_line_formats_mileage() {
        let vehicle = fixtures::vehicle(1, "TOYOTA COROLLA XEI", "PRATA", "2020/2021", 45000, 98500);
        assert_eq!(catalog_line(&vehicle), "TOYOTA COROLLA XEI - 2020/2021 - 45.000 KM");
    }

    #[test]
    fn test_catalog_line_zero_and_missing() {
        let mut vehicle = fixtures::vehicle(1, "FIAT MOBI", "BRANCO", "2024", 0, 70000);
        assert_eq!(catalog_line(&vehicle), "FIAT MOBI - 2024 - 0 KM");

        vehicle.km = None;
        vehicle.ano = None;
        vehicle.veiculo = None;
        assert_eq!(
            catalog_line(&vehicle),
            "MODELO NÃO INFORMADO - ANO NÃO INFORMADO - KM NÃO INFORMADO"
        );
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1.000");
        assert_eq!(group_thousands(1234567), "1.234.567");
    }

    #[test]
    fn test_summary_counts_and_prices() {
        let mut vehicles = vec![
            fixtures::vehicle(1, "HONDA FIT", "Branco", "2019", 60000, 70000),
            fixtures::vehicle(2, "HONDA CITY", "BRANCO", "2021/2022", 30000, 90000),
            fixtures::vehicle(3, "FIAT ARGO", "PRETO", "2021", 20000, 80000),
        ];
        vehicles[2].valor_ideal_venda = Some(FieldValue::Text("sob consulta".to_string()));

        let snapshot = InventorySnapshot::new(
            InventoryDocument {
                veiculos: vehicles,
                data_geracao: Some("2024-05-01".to_string()),
            },
            "test",
        );
        let summary = InventorySummary::from_snapshot(&snapshot);

        assert_eq!(summary.total_vehicles, 3);
        assert_eq!(summary.by_color.get("BRANCO"), Some(&2));
        assert_eq!(summary.by_color.get("PRETO"), Some(&1));
        assert_eq!(summary.by_year.get("2021"), Some(&2));

        let price = summary.price.unwrap();
        assert_eq!(price.priced_vehicles, 2);
        assert_eq!(price.min, 70000.0);
        assert_eq!(price.max, 90000.0);
        assert_eq!(price.average, 80000.0);
        assert_eq!(summary.generated_at.as_deref(), Some("2024-05-01"));
    }
}
