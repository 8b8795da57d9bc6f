pub mod outlet;
pub mod ranking;
pub mod record;
