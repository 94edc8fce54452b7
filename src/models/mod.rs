pub mod anomaly;
pub mod commission;
pub mod expense;
pub mod trip;
