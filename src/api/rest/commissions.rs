use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::Json;
use axum::Router;

use crate::config::{CommissionConfig, CommissionOverrides};
use crate::engine::commission::{compute_commission, compute_report};
use crate::error::AppError;
use crate::models::commission::CommissionResult;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/trips/:id/commission",
            get(trip_commission).post(trip_commission_with_overrides),
        )
        .route("/commissions", get(list_commissions))
        .route("/commissions/report", get(commission_report))
}

async fn trip_commission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CommissionResult>, AppError> {
    score_trip(&state, &id, &state.commission_config).map(Json)
}

async fn trip_commission_with_overrides(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(overrides): Json<CommissionOverrides>,
) -> Result<Json<CommissionResult>, AppError> {
    let config = state.commission_config.with_overrides(&overrides);
    config.validate()?;

    score_trip(&state, &id, &config).map(Json)
}

async fn list_commissions(State(state): State<Arc<AppState>>) -> Json<Vec<CommissionResult>> {
    let mut commissions: Vec<CommissionResult> = state
        .commissions
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    commissions.sort_by(|a, b| a.trip_id.cmp(&b.trip_id));

    Json(commissions)
}

async fn commission_report(State(state): State<Arc<AppState>>) -> Json<Vec<CommissionResult>> {
    let trips = state.trip_snapshot();
    Json(compute_report(&trips, &state.commission_config))
}

fn score_trip(
    state: &AppState,
    trip_id: &str,
    config: &CommissionConfig,
) -> Result<CommissionResult, AppError> {
    let trip = state
        .trips
        .get(trip_id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound(format!("trip {trip_id} not found")))?;

    let history = state.trip_snapshot();
    compute_commission(&trip, &history, config)
}
