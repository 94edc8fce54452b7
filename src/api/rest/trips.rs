use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::queue::enqueue_trip;
use crate::error::AppError;
use crate::ingest::csv::parse_trips;
use crate::models::trip::Trip;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/trips", post(create_trip).get(list_trips))
        .route("/trips/import", post(import_trips))
        .route("/trips/:id", get(get_trip))
}

#[derive(Deserialize)]
pub struct CreateTripRequest {
    pub id: String,
    pub vehicle: String,
    pub driver: Option<String>,
    pub status: Option<String>,
    pub departed_at: DateTime<Utc>,
    pub returned_at: DateTime<Utc>,
    pub km_total: Option<f64>,
    pub fuel_liters: Option<f64>,
    pub fuel_efficiency: Option<f64>,
    pub gross_profit: Option<f64>,
    pub freight_outbound: Option<f64>,
    pub freight_return: Option<f64>,
    pub freight_extra: Option<f64>,
}

#[derive(Serialize)]
pub struct ImportResponse {
    pub imported: usize,
    pub skipped: usize,
}

async fn create_trip(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateTripRequest>,
) -> Result<Json<Trip>, AppError> {
    if payload.id.trim().is_empty() {
        return Err(AppError::BadRequest("id cannot be empty".to_string()));
    }

    if payload.vehicle.trim().is_empty() {
        return Err(AppError::BadRequest("vehicle cannot be empty".to_string()));
    }

    let numbers = [
        ("km_total", payload.km_total),
        ("fuel_liters", payload.fuel_liters),
        ("fuel_efficiency", payload.fuel_efficiency),
        ("gross_profit", payload.gross_profit),
        ("freight_outbound", payload.freight_outbound),
        ("freight_return", payload.freight_return),
        ("freight_extra", payload.freight_extra),
    ];
    if let Some((name, _)) = numbers
        .iter()
        .find(|(_, value)| value.is_some_and(|v| !v.is_finite()))
    {
        return Err(AppError::BadRequest(format!("{name} must be finite")));
    }

    let trip = Trip {
        id: payload.id.trim().to_string(),
        vehicle: payload.vehicle.trim().to_string(),
        driver: payload.driver,
        status: payload.status,
        departed_at: payload.departed_at,
        returned_at: payload.returned_at,
        km_total: payload.km_total,
        fuel_liters: payload.fuel_liters,
        fuel_efficiency: payload.fuel_efficiency,
        gross_profit: payload.gross_profit,
        freight_outbound: payload.freight_outbound,
        freight_return: payload.freight_return,
        freight_extra: payload.freight_extra,
    };

    match state.trips.entry(trip.id.clone()) {
        Entry::Occupied(_) => {
            return Err(AppError::Conflict(format!("trip {} already exists", trip.id)));
        }
        Entry::Vacant(slot) => {
            slot.insert(trip.clone());
        }
    }

    enqueue_trip(&state, trip.id.clone()).await?;

    Ok(Json(trip))
}

async fn import_trips(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<ImportResponse>, AppError> {
    let import = parse_trips(body.as_bytes())?;
    let mut imported = 0;
    let mut skipped = import.skipped;

    for trip in import.trips {
        let trip_id = trip.id.clone();
        match state.trips.entry(trip_id.clone()) {
            Entry::Occupied(_) => {
                skipped += 1;
                continue;
            }
            Entry::Vacant(slot) => {
                slot.insert(trip);
            }
        }

        enqueue_trip(&state, trip_id).await?;
        imported += 1;
    }

    info!(imported, skipped, "trip csv imported");
    Ok(Json(ImportResponse { imported, skipped }))
}

async fn list_trips(State(state): State<Arc<AppState>>) -> Json<Vec<Trip>> {
    let mut trips = state.trip_snapshot();
    trips.sort_by(|a, b| a.departed_at.cmp(&b.departed_at));
    Json(trips)
}

async fn get_trip(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Trip>, AppError> {
    let trip = state
        .trips
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("trip {} not found", id)))?;

    Ok(Json(trip.value().clone()))
}
