//! Types for the vehicle inventory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;
use tracing::warn;

use crate::search::FilterField;

/// A scalar field as delivered by the upstream feed.
///
/// The feed is loosely typed: mileage and price show up both as numbers and
/// as locale-formatted strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Convert a JSON value, dropping anything that is not a scalar.
    fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(FieldValue::Text(s)),
            Value::Number(n) => n
                .as_i64()
                .map(FieldValue::Int)
                .or_else(|| n.as_f64().map(FieldValue::Float)),
            Value::Bool(_) | Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Textual form used for comparisons and display.
    pub fn as_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 => {
                write!(f, "{:.0}", v)
            }
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

/// Identifier of an inventory item (`sequencia`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(i) => write!(f, "{}", i),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

fn lenient_scalar<'de, D>(deserializer: D) -> Result<Option<FieldValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(FieldValue::from_json))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_scalar(deserializer)?.map(|v| v.as_text()))
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<RecordId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => Some(
            n.as_i64()
                .map(RecordId::Int)
                .unwrap_or_else(|| RecordId::Text(n.to_string())),
        ),
        Some(Value::String(s)) if !s.trim().is_empty() => Some(RecordId::Text(s)),
        _ => None,
    })
}

/// One inventory item.
///
/// Every field is optional; values of the wrong shape deserialize to `None`
/// rather than rejecting the record. Unknown upstream fields are kept in
/// `extra` and written back out unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub sequencia: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub veiculo: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub modelo: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub placa: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub cor: Option<String>,
    #[serde(default, deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub ano: Option<FieldValue>,
    #[serde(default, deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub km: Option<FieldValue>,
    #[serde(
        rename = "valorIdealVenda",
        default,
        deserialize_with = "lenient_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub valor_ideal_venda: Option<FieldValue>,
    #[serde(default, deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub preco: Option<FieldValue>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VehicleRecord {
    /// Identifier as a string, for exclusion checks and lookups.
    pub fn id_string(&self) -> Option<String> {
        self.sequencia.as_ref().map(|id| id.to_string())
    }

    /// Model description: `veiculo`, falling back to `modelo`.
    pub fn model_text(&self) -> Option<&str> {
        self.veiculo
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self.modelo.as_deref())
    }

    /// Price: `valorIdealVenda`, falling back to `preco`.
    pub fn price_value(&self) -> Option<&FieldValue> {
        self.valor_ideal_venda.as_ref().or(self.preco.as_ref())
    }

    /// Text content of the field a filter compares against.
    pub fn field_text(&self, field: FilterField) -> Option<String> {
        match field {
            FilterField::Veiculo => self.model_text().map(str::to_string),
            FilterField::Placa => self.placa.clone(),
            FilterField::Cor => self.cor.clone(),
            FilterField::Ano => self.ano.as_ref().map(FieldValue::as_text),
            FilterField::Km => self.km.as_ref().map(FieldValue::as_text),
        }
    }
}

/// A parsed feed document.
#[derive(Debug, Clone, Default)]
pub struct InventoryDocument {
    pub veiculos: Vec<VehicleRecord>,
    /// `dataGeracao` from the feed, if present.
    pub data_geracao: Option<String>,
}

/// Parse a JSON inventory document.
///
/// Accepts `{"veiculos": [...], "dataGeracao": "..."}` or a bare array.
/// Records that cannot be read are skipped with a warning.
pub fn parse_inventory(bytes: &[u8]) -> Result<InventoryDocument, InventoryError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| InventoryError::InvalidData(format!("not valid JSON: {}", e)))?;

    let (items, data_geracao) = match value {
        Value::Object(mut map) => {
            let items = match map.remove("veiculos") {
                Some(Value::Array(items)) => items,
                Some(_) => {
                    return Err(InventoryError::InvalidData(
                        "`veiculos` is not an array".to_string(),
                    ))
                }
                None => {
                    return Err(InventoryError::InvalidData(
                        "missing `veiculos` array".to_string(),
                    ))
                }
            };
            let data_geracao = map
                .get("dataGeracao")
                .and_then(Value::as_str)
                .map(str::to_string);
            (items, data_geracao)
        }
        Value::Array(items) => (items, None),
        _ => {
            return Err(InventoryError::InvalidData(
                "expected an object with `veiculos` or an array".to_string(),
            ))
        }
    };

    let mut veiculos = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<VehicleRecord>(item) {
            Ok(record) => veiculos.push(record),
            Err(e) => warn!(index, error = %e, "Skipping unreadable vehicle record"),
        }
    }

    Ok(InventoryDocument {
        veiculos,
        data_geracao,
    })
}

/// An immutable, fully-loaded view of the inventory.
#[derive(Debug, Clone, Serialize)]
pub struct InventorySnapshot {
    pub vehicles: Vec<VehicleRecord>,
    pub generated_at: Option<String>,
    pub loaded_at: DateTime<Utc>,
    /// Name of the source that produced this snapshot.
    pub source: String,
}

impl InventorySnapshot {
    pub fn new(document: InventoryDocument, source: impl Into<String>) -> Self {
        Self {
            vehicles: document.veiculos,
            generated_at: document.data_geracao,
            loaded_at: Utc::now(),
            source: source.into(),
        }
    }

    /// Find a vehicle by its `sequencia`.
    pub fn find(&self, id: &str) -> Option<&VehicleRecord> {
        self.vehicles
            .iter()
            .find(|v| v.id_string().as_deref() == Some(id))
    }
}

/// Refresh bookkeeping exposed over the API.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RefreshStatus {
    pub last_update: Option<DateTime<Utc>>,
    pub last_attempt: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub total_vehicles: usize,
    pub refresh_count: u64,
    pub failure_count: u64,
}

/// Errors that can occur while loading or reading the inventory.
#[derive(Debug, Clone, Error)]
pub enum InventoryError {
    #[error("Inventory data not available")]
    Unavailable,

    #[error("Invalid inventory data: {0}")]
    InvalidData(String),

    #[error("Failed to read inventory: {0}")]
    Io(String),

    #[error("Failed to fetch inventory: {0}")]
    Fetch(String),
}
