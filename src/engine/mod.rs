pub mod fees;
pub mod ranking;
pub mod service_area;
