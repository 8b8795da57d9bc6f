use crate::geo::{haversine_km, point_in_polygon};
use crate::models::outlet::{CustomerLocation, Outlet, ServiceArea};

pub fn is_in_service_area(customer: &CustomerLocation, outlet: &Outlet) -> bool {
    if !outlet.is_active {
        return false;
    }

    let distance_km = haversine_km(&customer.point, &outlet.location);
    within_service_area(customer, outlet, distance_km)
}

/// Geometry check only; callers handle `is_active`.
pub(crate) fn within_service_area(
    customer: &CustomerLocation,
    outlet: &Outlet,
    distance_km: f64,
) -> bool {
    match &outlet.service_area {
        ServiceArea::Geofence { polygon } if !polygon.is_empty() => {
            point_in_polygon(&customer.point, polygon)
        }
        // An undrawn geofence must not exclude every customer.
        ServiceArea::Geofence { .. } | ServiceArea::Radius => {
            distance_km <= outlet.delivery_radius_km
        }
    }
}
