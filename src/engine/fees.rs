use crate::models::outlet::{FeeSchedule, Outlet};

pub fn calculate_delivery_fee(outlet: &Outlet, distance_km: f64) -> f64 {
    let rates = match &outlet.fee_schedule {
        FeeSchedule::Tiered(tiers) => tiers.rates(),
        FeeSchedule::Flat => None,
    };

    let Some(rates) = rates else {
        return outlet.delivery_fee.unwrap_or(0.0);
    };

    if distance_km <= rates.base_distance_km {
        return rates.base_fee;
    }

    let fee = rates.base_fee + (distance_km - rates.base_distance_km) * rates.per_km_fee;
    round_to_cents(fee)
}

/// Half away from zero.
fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
