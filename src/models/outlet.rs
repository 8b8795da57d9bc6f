use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerLocation {
    #[serde(flatten)]
    pub point: GeoPoint,
    /// Display text only, never parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl CustomerLocation {
    pub fn at(lat: f64, lng: f64) -> Self {
        Self {
            point: GeoPoint { lat, lng },
            address: None,
        }
    }
}

/// Region an outlet delivers to.
///
/// A `Geofence` with an empty polygon falls back to the outlet's
/// `delivery_radius_km`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServiceArea {
    Radius,
    Geofence { polygon: Vec<GeoPoint> },
}

/// Partially configured tiered schedule. Only honored when all three parts are
/// present and non-negative.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TieredFee {
    pub base_distance_km: Option<f64>,
    pub base_fee: Option<f64>,
    pub per_km_fee: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierRates {
    pub base_distance_km: f64,
    pub base_fee: f64,
    pub per_km_fee: f64,
}

impl TieredFee {
    pub fn rates(&self) -> Option<TierRates> {
        let rates = TierRates {
            base_distance_km: self.base_distance_km?,
            base_fee: self.base_fee?,
            per_km_fee: self.per_km_fee?,
        };

        let usable = |v: f64| v.is_finite() && v >= 0.0;
        if usable(rates.base_distance_km) && usable(rates.base_fee) && usable(rates.per_km_fee) {
            Some(rates)
        } else {
            None
        }
    }

    pub fn is_honored(&self) -> bool {
        self.rates().is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeeSchedule {
    #[default]
    Flat,
    Tiered(TieredFee),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outlet {
    pub id: String,
    pub name: String,
    pub location: GeoPoint,
    pub delivery_radius_km: f64,
    pub service_area: ServiceArea,
    pub is_active: bool,
    /// Prep and dispatch minutes, excluding travel.
    pub estimated_delivery_minutes: Option<f64>,
    /// Flat fee, also the fallback when a tiered schedule is incomplete.
    pub delivery_fee: Option<f64>,
    #[serde(default)]
    pub fee_schedule: FeeSchedule,
    pub updated_at: DateTime<Utc>,
}
