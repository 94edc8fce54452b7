use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::engine::stats::{mean, median};
use crate::error::AppError;
use crate::models::trip::{RevenueField, Trip};

/// Reference figures a trip is scored against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalReference {
    pub efficiency_baseline: f64,
    pub revenue_per_day_baseline: f64,
    pub idle_days: i64,
    pub comparison_size: usize,
}

/// Same-vehicle trips that departed inside the lookback window, excluding
/// the trip being scored. Borrowed from the caller's snapshot and dropped
/// with the scoring call.
#[derive(Debug)]
pub struct TripWindow<'a> {
    trips: Vec<&'a Trip>,
}

impl<'a> TripWindow<'a> {
    pub fn for_trip(trip: &Trip, history: &'a [Trip], lookback_days: i64) -> Self {
        // None when the offset leaves chrono's range: the window is unbounded.
        let window_start = Duration::try_days(lookback_days)
            .and_then(|lookback| trip.departed_at.checked_sub_signed(lookback));

        let trips = history
            .iter()
            .filter(|other| {
                other.vehicle == trip.vehicle
                    && window_start.is_none_or(|start| other.departed_at >= start)
                    && other.id != trip.id
            })
            .collect();

        Self { trips }
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    pub fn mean_efficiency(&self) -> Option<f64> {
        mean(self.trips.iter().filter_map(|t| t.efficiency()))
    }

    pub fn median_revenue_per_day(&self, field: RevenueField) -> Option<f64> {
        median(self.trips.iter().filter_map(|t| t.revenue_per_day(field)))
    }

    /// Latest return strictly before `start`, if any.
    pub fn last_return_before(&self, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.trips
            .iter()
            .map(|t| t.returned_at)
            .filter(|returned_at| *returned_at < start)
            .max()
    }
}

/// Derives the efficiency and revenue-per-day baselines for `trip` from
/// `history`, plus the idle gap since the vehicle's previous return.
///
/// With no usable history both baselines fall back to the trip's own
/// figures, which scores it as exactly average. Fails only when the trip
/// itself lacks the efficiency or revenue figure.
pub fn resolve_references(
    trip: &Trip,
    history: &[Trip],
    lookback_days: i64,
    revenue_field: RevenueField,
) -> Result<HistoricalReference, AppError> {
    let own_efficiency = trip.require_efficiency()?;
    let own_revenue_per_day = trip.require_revenue_per_day(revenue_field)?;

    let window = TripWindow::for_trip(trip, history, lookback_days);

    let efficiency_baseline = match window.mean_efficiency() {
        Some(baseline) => baseline,
        None => own_efficiency,
    };

    let revenue_per_day_baseline = match window.median_revenue_per_day(revenue_field) {
        Some(baseline) => baseline,
        None => own_revenue_per_day,
    };

    let idle_days = match window.last_return_before(trip.departed_at) {
        Some(last_return) => (trip.departed_at - last_return).num_days().max(0),
        None => 0,
    };

    Ok(HistoricalReference {
        efficiency_baseline,
        revenue_per_day_baseline,
        idle_days,
        comparison_size: window.len(),
    })
}
