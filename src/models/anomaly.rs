use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyLevel {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anomaly {
    pub message: String,
    pub count: usize,
    pub level: AnomalyLevel,
    pub details: Vec<String>,
    pub suggestion: String,
}
