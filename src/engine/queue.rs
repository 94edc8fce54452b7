use crate::error::AppError;
use crate::state::AppState;

pub async fn enqueue_trip(state: &AppState, trip_id: String) -> Result<(), AppError> {
    state
        .trip_tx
        .send(trip_id)
        .await
        .map_err(|err| AppError::Internal(format!("trip queue send failed: {err}")))?;

    state.metrics.trips_in_queue.inc();
    Ok(())
}
