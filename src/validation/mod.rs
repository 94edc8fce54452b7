pub mod anomalies;
