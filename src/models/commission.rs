use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::trip::RevenueField;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub consumption_score: f64,
    pub revenue_score: f64,
    pub idle_penalty: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionResult {
    pub trip_id: String,
    pub vehicle: String,
    pub driver: Option<String>,
    pub revenue_field: RevenueField,
    pub actual_efficiency: f64,
    pub efficiency_baseline: f64,
    pub actual_revenue_per_day: f64,
    pub revenue_per_day_baseline: f64,
    pub comparison_size: usize,
    pub idle_days: i64,
    pub breakdown: ScoreBreakdown,
    pub final_note: f64,
    pub commission: f64,
    pub computed_at: DateTime<Utc>,
}
