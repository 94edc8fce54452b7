use tracing::{debug, warn};

use crate::config::CommissionConfig;
use crate::engine::history::resolve_references;
use crate::engine::scoring::score_and_commission;
use crate::error::AppError;
use crate::models::commission::CommissionResult;
use crate::models::trip::Trip;

/// Scores `trip` against an immutable snapshot of trip history.
pub fn compute_commission(
    trip: &Trip,
    history: &[Trip],
    config: &CommissionConfig,
) -> Result<CommissionResult, AppError> {
    let reference = resolve_references(trip, history, config.lookback_days, config.revenue_field)?;
    let result = score_and_commission(trip, &reference, config)?;

    debug!(
        trip_id = %trip.id,
        vehicle = %trip.vehicle,
        comparison_size = reference.comparison_size,
        final_note = result.final_note,
        commission = result.commission,
        "commission computed"
    );

    Ok(result)
}

/// Scores every trip in `trips`, each against the whole snapshot. Trips
/// missing a required figure are logged and left out of the report.
pub fn compute_report(trips: &[Trip], config: &CommissionConfig) -> Vec<CommissionResult> {
    let mut results: Vec<CommissionResult> = trips
        .iter()
        .filter_map(|trip| match compute_commission(trip, trips, config) {
            Ok(result) => Some(result),
            Err(err) => {
                warn!(trip_id = %trip.id, error = %err, "trip skipped in commission report");
                None
            }
        })
        .collect();

    results.sort_by(|a, b| a.vehicle.cmp(&b.vehicle).then_with(|| a.trip_id.cmp(&b.trip_id)));
    results
}

#[cfg(test)]
mod tests {
    use super::{compute_commission, compute_report};
    use crate::config::CommissionConfig;
    use crate::models::trip::fixtures::trip;
    use crate::models::trip::{RevenueField, Trip};

    fn fleet_history() -> Vec<Trip> {
        vec![
            trip("h1", "V", 40, 42, 2.0, 1_000.0),
            trip("h2", "V", 48, 50, 2.0, 1_040.0),
            trip("h3", "V", 56, 58, 2.2, 960.0),
        ]
    }

    #[test]
    fn worked_example_pays_expected_commission() {
        let config = CommissionConfig::default();
        let current = trip("cur", "V", 60, 63, 2.2, 1_800.0);
        let mut history = fleet_history();
        history.push(current.clone());

        let result = compute_commission(&current, &history, &config).unwrap();

        assert!((result.efficiency_baseline - 2.0667).abs() < 1e-4);
        assert!((result.breakdown.consumption_score - 0.2151).abs() < 1e-3);
        assert_eq!(result.revenue_per_day_baseline, 500.0);
        assert_eq!(result.actual_revenue_per_day, 600.0);
        assert!((result.breakdown.revenue_score - 0.6667).abs() < 1e-3);
        assert_eq!(result.idle_days, 2);
        assert_eq!(result.breakdown.idle_penalty, 0.0);
        assert!((result.final_note - 0.6753).abs() < 1e-3);
        assert_eq!(result.commission, 337.63);
    }

    #[test]
    fn lone_trip_earns_half_of_the_ceiling() {
        let config = CommissionConfig::default();
        let current = trip("only", "Z", 0, 3, 2.7, 4_200.0);

        let result = compute_commission(&current, &[current.clone()], &config).unwrap();

        assert_eq!(result.comparison_size, 0);
        assert_eq!(result.breakdown.consumption_score, 0.0);
        assert_eq!(result.breakdown.revenue_score, 0.0);
        assert_eq!(result.final_note, 0.50);
        assert_eq!(result.commission, 250.0);
    }

    #[test]
    fn poor_trip_after_long_idle_gets_the_floor() {
        let config = CommissionConfig::default();
        let current = trip("bad", "V", 90, 92, 1.0, 100.0);

        let result = compute_commission(&current, &fleet_history(), &config).unwrap();

        assert_eq!(result.breakdown.consumption_score, -1.0);
        assert_eq!(result.breakdown.revenue_score, -1.0);
        assert_eq!(result.idle_days, 32);
        assert!(result.final_note < 1e-9);
        assert_eq!(result.commission, config.min_commission);
    }

    #[test]
    fn revenue_field_switch_changes_baseline_source() {
        let config = CommissionConfig {
            revenue_field: RevenueField::FreightTotal,
            ..Default::default()
        };
        let mut previous = trip("prev", "V", 0, 2, 2.0, 0.0);
        previous.freight_outbound = Some(2_000.0);
        let mut current = trip("cur", "V", 5, 7, 2.0, 0.0);
        current.freight_outbound = Some(2_000.0);
        current.freight_return = Some(600.0);

        let result = compute_commission(&current, &[previous], &config).unwrap();

        assert_eq!(result.revenue_per_day_baseline, 1_000.0);
        assert_eq!(result.actual_revenue_per_day, 1_300.0);
        assert!((result.breakdown.revenue_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn report_skips_trips_missing_figures() {
        let config = CommissionConfig::default();
        let mut trips = fleet_history();
        let mut broken = trip("broken", "V", 70, 72, 2.0, 1_000.0);
        broken.fuel_efficiency = None;
        trips.push(broken);

        let report = compute_report(&trips, &config);

        assert_eq!(report.len(), 3);
        assert!(report.iter().all(|r| r.trip_id != "broken"));
    }

    #[test]
    fn repeated_calls_are_idempotent() {
        let config = CommissionConfig::default();
        let current = trip("cur", "V", 60, 63, 2.2, 1_800.0);
        let history = fleet_history();

        let first = compute_commission(&current, &history, &config).unwrap();
        let second = compute_commission(&current, &history, &config).unwrap();

        assert_eq!(first.final_note, second.final_note);
        assert_eq!(first.commission, second.commission);
    }
}
