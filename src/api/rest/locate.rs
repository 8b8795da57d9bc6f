use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::routing::post;
use axum::Json;
use axum::Router;
use serde::Deserialize;
use tracing::info;

use crate::api::rest::validate_point;
use crate::engine::ranking::{find_nearest_outlets, validate_order_location, RankQuery};
use crate::error::AppError;
use crate::models::outlet::CustomerLocation;
use crate::models::ranking::{OrderValidation, RankedOutlet, RejectionReason};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/locate/nearest", post(nearest_outlets))
        .route("/outlets/:id/validate", post(validate_order))
}

#[derive(Deserialize)]
pub struct NearestRequest {
    pub customer: CustomerLocation,
    pub limit: Option<usize>,
    #[serde(default)]
    pub only_in_service_area: bool,
}

#[derive(Deserialize)]
pub struct ValidateRequest {
    pub customer: CustomerLocation,
}

async fn nearest_outlets(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NearestRequest>,
) -> Result<Json<Vec<RankedOutlet>>, AppError> {
    validate_point(&payload.customer.point, "customer")?;

    let limit = payload.limit.unwrap_or(state.settings.default_limit);
    if limit == 0 {
        return Err(AppError::BadRequest("limit must be > 0".to_string()));
    }

    let start = Instant::now();
    let outlets = state.snapshot();
    let ranked = find_nearest_outlets(
        &payload.customer,
        &outlets,
        RankQuery {
            limit,
            only_in_service_area: payload.only_in_service_area,
        },
        &state.settings,
    );
    state
        .metrics
        .observe_locate("nearest", start.elapsed().as_secs_f64());

    info!(
        returned = ranked.len(),
        in_service_area = ranked.iter().filter(|r| r.is_in_service_area).count(),
        "nearest outlets resolved"
    );

    Ok(Json(ranked))
}

async fn validate_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<ValidateRequest>,
) -> Result<Json<OrderValidation>, AppError> {
    validate_point(&payload.customer.point, "customer")?;

    let outlet = state
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("outlet {} not found", id)))?;

    let start = Instant::now();
    let validation = validate_order_location(&payload.customer, &outlet, &state.settings);
    state
        .metrics
        .observe_locate("validate", start.elapsed().as_secs_f64());

    let outcome = match validation.rejection {
        None => "allowed",
        Some(RejectionReason::OutletClosed) => "closed",
        Some(RejectionReason::OutOfServiceArea) => "out_of_area",
    };
    state
        .metrics
        .order_validations_total
        .with_label_values(&[outcome])
        .inc();

    info!(
        outlet_id = %id,
        outcome,
        distance_km = validation.distance_km,
        "order location validated"
    );

    Ok(Json(validation))
}
