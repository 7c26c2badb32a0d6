//! Testing utilities: a controllable inventory source and fixture vehicles.
//!
//! # Example
//!
//! ```rust,ignore
//! use estoque_core::testing::{fixtures, MockInventorySource};
//!
//! let source = MockInventorySource::with_vehicles(fixtures::sample_inventory());
//! source.set_next_error(InventoryError::Fetch("feed down".into())).await;
//! ```

mod mock_inventory_source;

pub use mock_inventory_source::MockInventorySource;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::inventory::{FieldValue, RecordId, VehicleRecord};

    /// Create a vehicle with the fields searches look at.
    pub fn vehicle(id: i64, model: &str, color: &str, year: &str, km: i64, price: i64) -> VehicleRecord {
        VehicleRecord {
            sequencia: Some(RecordId::Int(id)),
            veiculo: Some(model.to_string()),
            cor: Some(color.to_string()),
            ano: Some(FieldValue::Text(year.to_string())),
            km: Some(FieldValue::Int(km)),
            valor_ideal_venda: Some(FieldValue::Int(price)),
            ..Default::default()
        }
    }

    /// A small, varied inventory.
    ///
    /// | id | model              | color    | year      | km     | price        |
    /// |----|--------------------|----------|-----------|--------|--------------|
    /// | 1  | TOYOTA COROLLA XEI | CINZA    | 2020/2021 | 45000  | 98500        |
    /// | 2  | TOYOTA COROLLA GLI | BRANCO   | 2019/2019 | 80000  | 85000        |
    /// | 3  | HONDA HR-V EXL     | AZUL     | 2021/2022 | 30000  | 120000       |
    /// | 4  | CHEVROLET ONIX LT  | AZUL     | 2022/2023 | 15000  | 75000        |
    /// | 5  | VOLKSWAGEN GOL 1.0 | BRANCO   | 2017/2018 | 95000  | 42000        |
    /// | 6  | FIAT TORO VOLCANO  | PRETO    | 2023/2023 | 10000  | 140000       |
    /// | 7  | JEEP RENEGADE      | VERMELHO | 2018/2019 | 70000  | 78000        |
    /// | 8  | HYUNDAI HB20       | CINZA    | 2020      | 50.000 | R$ 65.900,00 |
    pub fn sample_inventory() -> Vec<VehicleRecord> {
        let mut hb20 = vehicle(8, "HYUNDAI HB20", "CINZA", "2020", 0, 0);
        hb20.km = Some(FieldValue::Text("50.000".to_string()));
        hb20.valor_ideal_venda = Some(FieldValue::Text("R$ 65.900,00".to_string()));
        hb20.placa = Some("ABC1D23".to_string());

        vec![
            vehicle(1, "TOYOTA COROLLA XEI", "CINZA", "2020/2021", 45000, 98500),
            vehicle(2, "TOYOTA COROLLA GLI", "BRANCO", "2019/2019", 80000, 85000),
            vehicle(3, "HONDA HR-V EXL", "AZUL", "2021/2022", 30000, 120000),
            vehicle(4, "CHEVROLET ONIX LT", "AZUL", "2022/2023", 15000, 75000),
            vehicle(5, "VOLKSWAGEN GOL 1.0", "BRANCO", "2017/2018", 95000, 42000),
            vehicle(6, "FIAT TORO VOLCANO", "PRETO", "2023/2023", 10000, 140000),
            vehicle(7, "JEEP RENEGADE", "VERMELHO", "2018/2019", 70000, 78000),
            hb20,
        ]
    }
}
