use tracing::debug;

use crate::config::LocatorSettings;
use crate::engine::fees::calculate_delivery_fee;
use crate::engine::service_area::within_service_area;
use crate::geo::haversine_km;
use crate::models::outlet::{CustomerLocation, Outlet, ServiceArea};
use crate::models::ranking::{OrderValidation, RankedOutlet, RejectionReason};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankQuery {
    pub limit: usize,
    /// Drop outlets whose service area does not cover the customer before
    /// truncating. Off by default so the UI can badge out-of-area outlets.
    pub only_in_service_area: bool,
}

impl RankQuery {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            only_in_service_area: false,
        }
    }
}

impl Default for RankQuery {
    fn default() -> Self {
        Self::with_limit(LocatorSettings::default().default_limit)
    }
}

pub fn estimate_delivery_minutes(
    outlet: &Outlet,
    distance_km: f64,
    settings: &LocatorSettings,
) -> f64 {
    let baseline = outlet
        .estimated_delivery_minutes
        .unwrap_or(settings.baseline_eta_minutes);
    baseline + (distance_km * settings.travel_minutes_per_km).round()
}

pub fn find_nearest_outlets(
    customer: &CustomerLocation,
    outlets: &[Outlet],
    query: RankQuery,
    settings: &LocatorSettings,
) -> Vec<RankedOutlet> {
    let mut ranked: Vec<RankedOutlet> = outlets
        .iter()
        .filter(|outlet| outlet.is_active)
        .map(|outlet| {
            let distance_km = haversine_km(&customer.point, &outlet.location);
            RankedOutlet {
                outlet: outlet.clone(),
                distance_km,
                is_in_service_area: within_service_area(customer, outlet, distance_km),
                eta_minutes: estimate_delivery_minutes(
                    outlet,
                    distance_km,
                    settings,
                ),
                quoted_delivery_fee: calculate_delivery_fee(outlet, distance_km),
            }
        })
        .filter(|ranked| !query.only_in_service_area || ranked.is_in_service_area)
        .collect();

    let candidates = ranked.len();
    // `sort_by` is stable, so ties keep input order.
    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked.truncate(query.limit);

    debug!(
        candidates,
        returned = ranked.len(),
        only_in_service_area = query.only_in_service_area,
        "ranked outlets"
    );

    ranked
}

pub fn validate_order_location(
    customer: &CustomerLocation,
    outlet: &Outlet,
    settings: &LocatorSettings,
) -> OrderValidation {
    let distance_km = haversine_km(&customer.point, &outlet.location);
    let eta_minutes = estimate_delivery_minutes(outlet, distance_km, settings);

    let rejection = if !outlet.is_active {
        Some(RejectionReason::OutletClosed)
    } else if !within_service_area(customer, outlet, distance_km) {
        Some(RejectionReason::OutOfServiceArea)
    } else {
        None
    };

    OrderValidation {
        can_order: rejection.is_none(),
        reason: rejection.map(|r| rejection_message(r, outlet)),
        rejection,
        distance_km,
        eta_minutes,
    }
}

fn rejection_message(rejection: RejectionReason, outlet: &Outlet) -> String {
    match (rejection, &outlet.service_area) {
        (RejectionReason::OutletClosed, _) => "outlet currently closed".to_string(),
        (RejectionReason::OutOfServiceArea, ServiceArea::Geofence { polygon })
            if !polygon.is_empty() =>
        {
            format!("{} does not deliver to this location", outlet.name)
        }
        (RejectionReason::OutOfServiceArea, _) => format!(
            "{} only delivers within {} km",
            outlet.name, outlet.delivery_radius_km
        ),
    }
}
