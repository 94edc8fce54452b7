use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::engine::commission::compute_commission;
use crate::error::AppError;
use crate::models::commission::CommissionResult;
use crate::state::AppState;

pub async fn run_commission_engine(state: Arc<AppState>, mut trip_rx: mpsc::Receiver<String>) {
    info!("commission engine started");

    while let Some(trip_id) = trip_rx.recv().await {
        state.metrics.trips_in_queue.dec();

        let start = Instant::now();
        let outcome = match process_trip(&state, &trip_id) {
            Ok(result) => {
                state.metrics.commission_amount.observe(result.commission);
                state
                    .metrics
                    .vehicle_idle_penalty
                    .with_label_values(&[&result.vehicle])
                    .set(result.breakdown.idle_penalty);
                "success"
            }
            Err(err) => {
                error!(trip_id = %trip_id, error = %err, "failed to score trip");
                "error"
            }
        };

        state
            .metrics
            .commission_latency_seconds
            .with_label_values(&[outcome])
            .observe(start.elapsed().as_secs_f64());
        state
            .metrics
            .commissions_total
            .with_label_values(&[outcome])
            .inc();
    }

    warn!("commission engine stopped: queue channel closed");
}

fn process_trip(state: &AppState, trip_id: &str) -> Result<CommissionResult, AppError> {
    let trip = state
        .trips
        .get(trip_id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound(format!("trip {trip_id} not found")))?;

    let history = state.trip_snapshot();
    let result = compute_commission(&trip, &history, &state.commission_config)?;

    state.commissions.insert(result.trip_id.clone(), result.clone());
    let _ = state.commission_events_tx.send(result.clone());

    info!(
        trip_id = %result.trip_id,
        vehicle = %result.vehicle,
        final_note = result.final_note,
        commission = result.commission,
        "trip commission settled"
    );

    Ok(result)
}
