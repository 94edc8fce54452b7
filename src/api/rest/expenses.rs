use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::anomaly::Anomaly;
use crate::models::expense::{Expense, ExpenseKind};
use crate::state::AppState;
use crate::validation::anomalies::{check_anomalies, DEFAULT_PREVIEW_ROWS};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/expenses", post(create_expense).get(list_expenses))
        .route("/anomalies", get(list_anomalies))
}

#[derive(Deserialize)]
pub struct CreateExpenseRequest {
    pub kind: ExpenseKind,
    pub trip_id: Option<String>,
    pub vehicle: Option<String>,
    pub description: String,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
    pub amount: f64,
    pub fuel_price: Option<f64>,
}

#[derive(Deserialize)]
pub struct AnomalyQuery {
    pub max_rows: Option<usize>,
}

async fn create_expense(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateExpenseRequest>,
) -> Result<Json<Expense>, AppError> {
    if payload.description.trim().is_empty() {
        return Err(AppError::BadRequest("description cannot be empty".to_string()));
    }

    if !payload.amount.is_finite() {
        return Err(AppError::BadRequest("amount must be finite".to_string()));
    }

    if let Some(trip_id) = &payload.trip_id {
        if !state.trips.contains_key(trip_id) {
            return Err(AppError::NotFound(format!("trip {} not found", trip_id)));
        }
    }

    let expense = Expense {
        id: Uuid::new_v4(),
        kind: payload.kind,
        trip_id: payload.trip_id,
        vehicle: payload.vehicle,
        description: payload.description,
        category: payload.category,
        date: payload.date,
        amount: payload.amount,
        fuel_price: payload.fuel_price,
    };

    state.expenses.insert(expense.id, expense.clone());
    Ok(Json(expense))
}

async fn list_expenses(State(state): State<Arc<AppState>>) -> Json<Vec<Expense>> {
    Json(state.expense_snapshot())
}

async fn list_anomalies(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnomalyQuery>,
) -> Json<Vec<Anomaly>> {
    let trips = state.trip_snapshot();
    let expenses = state.expense_snapshot();
    let max_rows = query.max_rows.unwrap_or(DEFAULT_PREVIEW_ROWS);

    Json(check_anomalies(&trips, &expenses, max_rows))
}
