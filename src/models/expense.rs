use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExpenseKind {
    Trip,
    Fixed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub kind: ExpenseKind,
    pub trip_id: Option<String>,
    pub vehicle: Option<String>,
    pub description: String,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
    pub amount: f64,
    /// Price per litre, only set on fuel purchases.
    pub fuel_price: Option<f64>,
}
