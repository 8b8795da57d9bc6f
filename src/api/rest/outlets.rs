use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post, put};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::api::rest::validate_point;
use crate::error::AppError;
use crate::models::outlet::{FeeSchedule, GeoPoint, Outlet, ServiceArea};
use crate::models::record::OutletRecord;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/outlets", post(upsert_outlet).get(list_outlets))
        .route("/outlets/sync", put(sync_outlets))
        .route("/outlets/:id", get(get_outlet).delete(delete_outlet))
        .route("/outlets/:id/status", patch(update_outlet_status))
}

#[derive(Deserialize)]
pub struct UpsertOutletRequest {
    pub id: Option<String>,
    pub name: String,
    pub location: GeoPoint,
    pub delivery_radius_km: f64,
    #[serde(default = "default_service_area")]
    pub service_area: ServiceArea,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub estimated_delivery_minutes: Option<f64>,
    pub delivery_fee: Option<f64>,
    #[serde(default)]
    pub fee_schedule: FeeSchedule,
}

fn default_service_area() -> ServiceArea {
    ServiceArea::Radius
}

fn default_active() -> bool {
    true
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub is_active: bool,
}

#[derive(Serialize)]
pub struct SyncResponse {
    pub synced: usize,
}

async fn upsert_outlet(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UpsertOutletRequest>,
) -> Result<Json<Outlet>, AppError> {
    let outlet = Outlet {
        id: payload
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        name: payload.name,
        location: payload.location,
        delivery_radius_km: payload.delivery_radius_km,
        service_area: payload.service_area,
        is_active: payload.is_active,
        estimated_delivery_minutes: payload.estimated_delivery_minutes,
        delivery_fee: payload.delivery_fee,
        fee_schedule: payload.fee_schedule,
        updated_at: Utc::now(),
    };
    validate_outlet(&outlet)?;

    let replaced = state.upsert(outlet.clone()).is_some();
    info!(outlet_id = %outlet.id, replaced, "outlet registered");

    Ok(Json(outlet))
}

async fn list_outlets(State(state): State<Arc<AppState>>) -> Json<Vec<Outlet>> {
    Json(state.snapshot())
}

async fn get_outlet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Outlet>, AppError> {
    let outlet = state
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("outlet {} not found", id)))?;

    Ok(Json(outlet))
}

async fn update_outlet_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Outlet>, AppError> {
    let outlet = state
        .set_active(&id, payload.is_active)
        .ok_or_else(|| AppError::NotFound(format!("outlet {} not found", id)))?;

    info!(outlet_id = %id, is_active = payload.is_active, "outlet status changed");

    Ok(Json(outlet))
}

async fn delete_outlet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .remove(&id)
        .ok_or_else(|| AppError::NotFound(format!("outlet {} not found", id)))?;

    info!(outlet_id = %id, "outlet removed");
    Ok(StatusCode::NO_CONTENT)
}

async fn sync_outlets(
    State(state): State<Arc<AppState>>,
    Json(records): Json<Vec<OutletRecord>>,
) -> Result<Json<SyncResponse>, AppError> {
    let outlets: Vec<Outlet> = records.into_iter().map(Outlet::from).collect();

    {
        let mut seen = HashSet::with_capacity(outlets.len());
        for outlet in &outlets {
            validate_outlet(outlet).map_err(|err| match err {
                AppError::BadRequest(msg) => {
                    AppError::BadRequest(format!("record {:?}: {msg}", outlet.id))
                }
                other => other,
            })?;

            if !seen.insert(outlet.id.as_str()) {
                return Err(AppError::BadRequest(format!(
                    "duplicate record id {:?}",
                    outlet.id
                )));
            }
        }
    }

    let synced = outlets.len();
    state.replace_all(outlets);
    info!(synced, "outlet directory synced");

    Ok(Json(SyncResponse { synced }))
}

/// Checks shared by single registration and directory sync.
fn validate_outlet(outlet: &Outlet) -> Result<(), AppError> {
    if outlet.id.trim().is_empty() {
        return Err(AppError::BadRequest("id cannot be empty".to_string()));
    }

    if outlet.name.trim().is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }

    if !outlet.delivery_radius_km.is_finite() || outlet.delivery_radius_km < 0.0 {
        return Err(AppError::BadRequest(
            "delivery_radius_km must be >= 0".to_string(),
        ));
    }

    validate_point(&outlet.location, "location")?;
    if let ServiceArea::Geofence { polygon } = &outlet.service_area {
        for vertex in polygon {
            validate_point(vertex, "service_area.polygon")?;
        }
    }

    Ok(())
}
