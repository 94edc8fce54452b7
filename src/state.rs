use dashmap::DashMap;
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use crate::config::CommissionConfig;
use crate::models::commission::CommissionResult;
use crate::models::expense::Expense;
use crate::models::trip::Trip;
use crate::observability::metrics::Metrics;

pub struct AppState {
    pub trips: DashMap<String, Trip>,
    pub expenses: DashMap<Uuid, Expense>,
    pub commissions: DashMap<String, CommissionResult>,
    pub commission_config: CommissionConfig,
    pub trip_tx: mpsc::Sender<String>,
    pub commission_events_tx: broadcast::Sender<CommissionResult>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        commission_config: CommissionConfig,
        trip_queue_size: usize,
        event_buffer_size: usize,
    ) -> (Self, mpsc::Receiver<String>) {
        let (trip_tx, trip_rx) = mpsc::channel(trip_queue_size);
        let (commission_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        (
            Self {
                trips: DashMap::new(),
                expenses: DashMap::new(),
                commissions: DashMap::new(),
                commission_config,
                trip_tx,
                commission_events_tx,
                metrics: Metrics::new(),
            },
            trip_rx,
        )
    }

    /// Point-in-time copy of the trip store for history resolution.
    pub fn trip_snapshot(&self) -> Vec<Trip> {
        self.trips.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn expense_snapshot(&self) -> Vec<Expense> {
        self.expenses
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}
