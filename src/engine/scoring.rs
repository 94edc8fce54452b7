use chrono::Utc;

use crate::config::CommissionConfig;
use crate::engine::history::HistoricalReference;
use crate::error::AppError;
use crate::models::commission::{CommissionResult, ScoreBreakdown};
use crate::models::trip::Trip;

/// Note of a trip that exactly matches its history in both dimensions.
const BASELINE_NOTE: f64 = 0.50;
/// Share of the note the weighted sub-scores can move in either direction.
const NOTE_SWING: f64 = 0.50;

pub fn score_and_commission(
    trip: &Trip,
    reference: &HistoricalReference,
    config: &CommissionConfig,
) -> Result<CommissionResult, AppError> {
    let actual_efficiency = trip.require_efficiency()?;
    let actual_revenue_per_day = trip.require_revenue_per_day(config.revenue_field)?;

    let breakdown = ScoreBreakdown {
        consumption_score: consumption_score(
            actual_efficiency,
            reference.efficiency_baseline,
            config.consumption_increment_ceiling,
        ),
        revenue_score: revenue_score(
            actual_revenue_per_day,
            reference.revenue_per_day_baseline,
            config.revenue_increment_ceiling,
        ),
        idle_penalty: idle_penalty(reference.idle_days, config),
    };

    let final_note = composite_note(&breakdown, config);
    let commission = commission_amount(final_note, config);

    Ok(CommissionResult {
        trip_id: trip.id.clone(),
        vehicle: trip.vehicle.clone(),
        driver: trip.driver.clone(),
        revenue_field: config.revenue_field,
        actual_efficiency,
        efficiency_baseline: reference.efficiency_baseline,
        actual_revenue_per_day,
        revenue_per_day_baseline: reference.revenue_per_day_baseline,
        comparison_size: reference.comparison_size,
        idle_days: reference.idle_days,
        breakdown,
        final_note,
        commission,
        computed_at: Utc::now(),
    })
}

/// Efficiency gain relative to the baseline; `ceiling` is the fractional
/// gain (0.30 = +30%) that earns a full score.
pub fn consumption_score(actual: f64, baseline: f64, ceiling: f64) -> f64 {
    (relative_change(actual, baseline) / ceiling).clamp(-1.0, 1.0)
}

/// Revenue-per-day gain relative to the baseline; `ceiling` is a
/// multiplier (1.30 = 130% of baseline) that earns a full score.
pub fn revenue_score(actual: f64, baseline: f64, ceiling: f64) -> f64 {
    (relative_change(actual, baseline) / (ceiling - 1.0)).clamp(-1.0, 1.0)
}

pub fn idle_penalty(idle_days: i64, config: &CommissionConfig) -> f64 {
    if idle_days <= config.idle_days_normal {
        return 0.0;
    }

    let span = (config.idle_days_full - config.idle_days_normal).max(1);
    let fraction = (idle_days - config.idle_days_normal) as f64 / span as f64;
    fraction.clamp(0.0, 1.0) * config.max_idle_penalty
}

/// Weighted sub-scores around the neutral note, clamped to [0, 1], then
/// reduced by the idle penalty.
pub fn composite_note(breakdown: &ScoreBreakdown, config: &CommissionConfig) -> f64 {
    let delta = NOTE_SWING
        * (config.weight_consumption * breakdown.consumption_score
            + config.weight_revenue * breakdown.revenue_score);

    let raw_note = (BASELINE_NOTE + delta).clamp(0.0, 1.0);
    raw_note * (1.0 - breakdown.idle_penalty)
}

/// Maps a note to money, rounded to cents. The floor applies to every
/// trip, so a note of 0 still pays `min_commission`.
pub fn commission_amount(final_note: f64, config: &CommissionConfig) -> f64 {
    let raw = round_cents(final_note * config.max_commission);
    raw.clamp(config.min_commission, config.max_commission)
}

fn relative_change(actual: f64, baseline: f64) -> f64 {
    if baseline == 0.0 {
        return 0.0;
    }

    let change = actual / baseline - 1.0;
    if change.is_finite() { change } else { 0.0 }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
