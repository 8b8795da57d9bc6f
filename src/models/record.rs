//! Flat outlet shape as served by the outlet directory.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::models::outlet::{FeeSchedule, GeoPoint, Outlet, ServiceArea, TieredFee};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutletRecord {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub delivery_radius: f64,
    #[serde(default)]
    pub service_area_type: Option<String>,
    #[serde(default)]
    pub geofence_coordinates: Vec<GeoPoint>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub estimated_delivery_time: Option<f64>,
    #[serde(default)]
    pub delivery_fee_type: Option<String>,
    #[serde(default)]
    pub delivery_fee: Option<f64>,
    #[serde(default)]
    pub base_delivery_distance_km: Option<f64>,
    #[serde(default)]
    pub base_delivery_fee: Option<f64>,
    #[serde(default)]
    pub per_km_delivery_fee: Option<f64>,
}

impl From<OutletRecord> for Outlet {
    fn from(record: OutletRecord) -> Self {
        let service_area = match record.service_area_type.as_deref() {
            Some("geofence") => ServiceArea::Geofence {
                polygon: record.geofence_coordinates,
            },
            _ => ServiceArea::Radius,
        };

        let fee_schedule = match record.delivery_fee_type.as_deref() {
            Some("tiered") => FeeSchedule::Tiered(TieredFee {
                base_distance_km: record.base_delivery_distance_km,
                base_fee: record.base_delivery_fee,
                per_km_fee: record.per_km_delivery_fee,
            }),
            _ => FeeSchedule::Flat,
        };

        Outlet {
            id: record.id,
            name: record.name,
            location: GeoPoint {
                lat: record.latitude,
                lng: record.longitude,
            },
            delivery_radius_km: record.delivery_radius,
            service_area,
            is_active: record.is_active,
            estimated_delivery_minutes: record.estimated_delivery_time,
            delivery_fee: record.delivery_fee,
            fee_schedule,
            updated_at: Utc::now(),
        }
    }
}
