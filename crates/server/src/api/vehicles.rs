//! Inventory search and read API handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use estoque_core::{
    catalog_line, color_mapping, ExcludedIds, FilterField, FilterSet, InventoryError,
    InventorySummary, RangeBounds, RangeKind, RefreshStatus, SearchRequest, SearchResult,
    VehicleRecord,
};

use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

/// Query string shared by `/search` and `/catalog`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub veiculo: Option<String>,
    /// Alias of `veiculo`; `veiculo` wins when both are given.
    #[serde(default)]
    pub modelo: Option<String>,
    #[serde(default)]
    pub placa: Option<String>,
    #[serde(default)]
    pub cor: Option<String>,
    #[serde(default)]
    pub ano: Option<String>,
    #[serde(default)]
    pub km: Option<String>,
    #[serde(default)]
    pub valormax: Option<String>,
    #[serde(default)]
    pub anomax: Option<String>,
    #[serde(default)]
    pub kmmax: Option<String>,
    /// Comma-separated `sequencia` values to leave out.
    #[serde(default)]
    pub excluir: Option<String>,
}

impl SearchParams {
    pub fn into_request(self) -> SearchRequest {
        let model = self
            .veiculo
            .filter(|v| !v.trim().is_empty())
            .or(self.modelo);

        let filters: FilterSet = [
            (FilterField::Veiculo, model),
            (FilterField::Placa, self.placa),
            (FilterField::Cor, self.cor),
            (FilterField::Ano, self.ano),
            (FilterField::Km, self.km),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect();

        let mut ranges = RangeBounds::new();
        for (kind, value) in [
            (RangeKind::Valormax, self.valormax),
            (RangeKind::Anomax, self.anomax),
            (RangeKind::Kmmax, self.kmmax),
        ] {
            if let Some(value) = value {
                ranges = ranges.with(kind, value);
            }
        }

        SearchRequest {
            filters,
            ranges,
            excluded: self
                .excluir
                .as_deref()
                .map(ExcludedIds::from_csv)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CatalogParams {
    #[serde(default)]
    pub format: Option<String>,
    #[serde(flatten)]
    pub search: SearchParams,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub total: usize,
    pub vehicles: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    #[serde(flatten)]
    pub summary: InventorySummary,
    pub last_update: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct RefreshStatusResponse {
    #[serde(flatten)]
    pub status: RefreshStatus,
    pub running: bool,
}

#[derive(Debug, Serialize)]
pub struct ColorsResponse {
    pub color_mapping: BTreeMap<&'static str, &'static [&'static str]>,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn inventory_error(e: InventoryError) -> ApiError {
    let status = match e {
        InventoryError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        InventoryError::InvalidData(_) => StatusCode::BAD_GATEWAY,
        InventoryError::Io(_) | InventoryError::Fetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, e.to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/search
///
/// Run a search with fallback over the current snapshot.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResult>, ApiError> {
    let snapshot = state.store().current().await.map_err(inventory_error)?;
    let request = params.into_request();
    Ok(Json(state.engine().search(&snapshot.vehicles, &request)))
}

/// GET /api/v1/vehicles/{sequencia}
pub async fn get_vehicle(
    State(state): State<Arc<AppState>>,
    Path(sequencia): Path<String>,
) -> Result<Json<VehicleRecord>, ApiError> {
    let snapshot = state.store().current().await.map_err(inventory_error)?;
    snapshot
        .find(sequencia.trim())
        .cloned()
        .map(Json)
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "Vehicle not found"))
}

/// GET /api/v1/catalog
///
/// One `MODELO - ANO - KM` line per matching vehicle, as plain text (the
/// default) or JSON. Unlike `/search`, every match is listed.
pub async fn catalog(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CatalogParams>,
) -> Result<Response, ApiError> {
    let snapshot = state.store().current().await.map_err(inventory_error)?;
    let as_json = params
        .format
        .as_deref()
        .is_some_and(|f| f.eq_ignore_ascii_case("json"));

    let result = state
        .engine()
        .with_result_limit(usize::MAX)
        .search(&snapshot.vehicles, &params.search.into_request());
    let lines: Vec<String> = result.vehicles.iter().map(catalog_line).collect();

    if as_json {
        return Ok(Json(CatalogResponse {
            total: result.total_found,
            vehicles: lines,
        })
        .into_response());
    }

    let body = if lines.is_empty() {
        "Nenhum veículo encontrado com os filtros especificados.".to_string()
    } else {
        format!(
            "CATÁLOGO DE VEÍCULOS ({} veículos encontrados)\n{}\n\n{}",
            result.total_found,
            "=".repeat(50),
            lines.join("\n")
        )
    };
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response())
}

/// GET /api/v1/colors
///
/// Accepted spellings for each feed color.
pub async fn colors() -> Json<ColorsResponse> {
    Json(ColorsResponse {
        color_mapping: color_mapping(),
        description: "Any listed variation matches its color".to_string(),
    })
}

/// GET /api/v1/summary
pub async fn summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let snapshot = state.store().current().await.map_err(inventory_error)?;
    let status = state.store().status().await;
    Ok(Json(SummaryResponse {
        summary: InventorySummary::from_snapshot(&snapshot),
        last_update: status.last_update,
    }))
}

/// POST /api/v1/refresh
///
/// Start a refresh in the background.
pub async fn refresh(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<SuccessResponse>), ApiError> {
    let refresher = state
        .refresher()
        .cloned()
        .ok_or_else(|| error_response(StatusCode::SERVICE_UNAVAILABLE, "Refresher not configured"))?;

    tokio::spawn(async move {
        match refresher.refresh_now().await {
            Ok(count) => info!(vehicles = count, "Manual inventory refresh completed"),
            Err(e) => warn!(error = %e, "Manual inventory refresh failed"),
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(SuccessResponse {
            message: "Refresh started".to_string(),
        }),
    ))
}

/// GET /api/v1/refresh/status
pub async fn refresh_status(State(state): State<Arc<AppState>>) -> Json<RefreshStatusResponse> {
    Json(RefreshStatusResponse {
        status: state.store().status().await,
        running: state.refresher().is_some_and(|r| r.is_running()),
    })
}
