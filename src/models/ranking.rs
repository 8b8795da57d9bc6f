use serde::{Deserialize, Serialize};

use crate::models::outlet::Outlet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedOutlet {
    #[serde(flatten)]
    pub outlet: Outlet,
    pub distance_km: f64,
    pub is_in_service_area: bool,
    /// Baseline plus travel minutes.
    pub eta_minutes: f64,
    /// Fee for this customer's distance; `outlet.delivery_fee` is the configured flat fee.
    pub quoted_delivery_fee: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    OutletClosed,
    OutOfServiceArea,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderValidation {
    pub can_order: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection: Option<RejectionReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub distance_km: f64,
    pub eta_minutes: f64,
}
