use std::env;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::AppError;
use crate::models::trip::RevenueField;

/// Roughly a century; longer windows cannot be represented as a timestamp
/// offset.
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub trip_queue_size: usize,
    pub event_buffer_size: usize,
    pub commission: CommissionConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            trip_queue_size: parse_or_default("TRIP_QUEUE_SIZE", 1024)?,
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", 1024)?,
            commission: CommissionConfig::from_env()?,
        })
    }
}

/// Parameters of the commission formula. Immutable per run; per-call
/// variations go through [`CommissionConfig::with_overrides`], which
/// returns a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionConfig {
    /// Fractional efficiency gain that maps to a consumption score of 1.
    pub consumption_increment_ceiling: f64,
    /// Revenue-per-day multiplier that maps to a revenue score of 1.
    pub revenue_increment_ceiling: f64,
    pub weight_consumption: f64,
    pub weight_revenue: f64,
    pub idle_days_normal: i64,
    pub idle_days_full: i64,
    pub max_idle_penalty: f64,
    pub min_commission: f64,
    pub max_commission: f64,
    pub lookback_days: i64,
    pub revenue_field: RevenueField,
}

impl Default for CommissionConfig {
    fn default() -> Self {
        Self {
            consumption_increment_ceiling: 0.30,
            revenue_increment_ceiling: 1.30,
            weight_consumption: 0.70,
            weight_revenue: 0.30,
            idle_days_normal: 4,
            idle_days_full: 10,
            max_idle_penalty: 0.30,
            min_commission: 150.00,
            max_commission: 500.00,
            lookback_days: 90,
            revenue_field: RevenueField::GrossProfit,
        }
    }
}

/// Optional per-call replacements for [`CommissionConfig`] fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommissionOverrides {
    pub consumption_increment_ceiling: Option<f64>,
    pub revenue_increment_ceiling: Option<f64>,
    pub weight_consumption: Option<f64>,
    pub weight_revenue: Option<f64>,
    pub idle_days_normal: Option<i64>,
    pub idle_days_full: Option<i64>,
    pub max_idle_penalty: Option<f64>,
    pub min_commission: Option<f64>,
    pub max_commission: Option<f64>,
    pub lookback_days: Option<i64>,
    pub revenue_field: Option<RevenueField>,
}

impl CommissionConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();

        let config = Self {
            consumption_increment_ceiling: parse_or_default(
                "COMMISSION_CONSUMPTION_CEILING",
                defaults.consumption_increment_ceiling,
            )?,
            revenue_increment_ceiling: parse_or_default(
                "COMMISSION_REVENUE_CEILING",
                defaults.revenue_increment_ceiling,
            )?,
            weight_consumption: parse_or_default(
                "COMMISSION_WEIGHT_CONSUMPTION",
                defaults.weight_consumption,
            )?,
            weight_revenue: parse_or_default("COMMISSION_WEIGHT_REVENUE", defaults.weight_revenue)?,
            idle_days_normal: parse_or_default(
                "COMMISSION_IDLE_DAYS_NORMAL",
                defaults.idle_days_normal,
            )?,
            idle_days_full: parse_or_default("COMMISSION_IDLE_DAYS_FULL", defaults.idle_days_full)?,
            max_idle_penalty: parse_or_default(
                "COMMISSION_MAX_IDLE_PENALTY",
                defaults.max_idle_penalty,
            )?,
            min_commission: parse_or_default("COMMISSION_MIN_AMOUNT", defaults.min_commission)?,
            max_commission: parse_or_default("COMMISSION_MAX_AMOUNT", defaults.max_commission)?,
            lookback_days: parse_or_default("COMMISSION_LOOKBACK_DAYS", defaults.lookback_days)?,
            revenue_field: parse_or_default("COMMISSION_REVENUE_FIELD", defaults.revenue_field)?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn with_overrides(&self, overrides: &CommissionOverrides) -> Self {
        Self {
            consumption_increment_ceiling: overrides
                .consumption_increment_ceiling
                .unwrap_or(self.consumption_increment_ceiling),
            revenue_increment_ceiling: overrides
                .revenue_increment_ceiling
                .unwrap_or(self.revenue_increment_ceiling),
            weight_consumption: overrides.weight_consumption.unwrap_or(self.weight_consumption),
            weight_revenue: overrides.weight_revenue.unwrap_or(self.weight_revenue),
            idle_days_normal: overrides.idle_days_normal.unwrap_or(self.idle_days_normal),
            idle_days_full: overrides.idle_days_full.unwrap_or(self.idle_days_full),
            max_idle_penalty: overrides.max_idle_penalty.unwrap_or(self.max_idle_penalty),
            min_commission: overrides.min_commission.unwrap_or(self.min_commission),
            max_commission: overrides.max_commission.unwrap_or(self.max_commission),
            lookback_days: overrides.lookback_days.unwrap_or(self.lookback_days),
            revenue_field: overrides.revenue_field.unwrap_or(self.revenue_field),
        }
    }

    /// Rejects parameter sets the scorer would divide by zero on or whose
    /// bounds are inverted. The scorer itself assumes a validated config.
    pub fn validate(&self) -> Result<(), AppError> {
        let finite = [
            ("consumption_increment_ceiling", self.consumption_increment_ceiling),
            ("revenue_increment_ceiling", self.revenue_increment_ceiling),
            ("weight_consumption", self.weight_consumption),
            ("weight_revenue", self.weight_revenue),
            ("max_idle_penalty", self.max_idle_penalty),
            ("min_commission", self.min_commission),
            ("max_commission", self.max_commission),
        ];
        if let Some((name, _)) = finite.iter().find(|(_, value)| !value.is_finite()) {
            return Err(AppError::InvalidConfig(format!("{name} must be finite")));
        }

        if self.consumption_increment_ceiling == 0.0 {
            return Err(AppError::InvalidConfig(
                "consumption_increment_ceiling must be non-zero".to_string(),
            ));
        }
        if self.revenue_increment_ceiling == 1.0 {
            return Err(AppError::InvalidConfig(
                "revenue_increment_ceiling must differ from 1.0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.max_idle_penalty) {
            return Err(AppError::InvalidConfig(
                "max_idle_penalty must be within [0, 1]".to_string(),
            ));
        }
        if self.min_commission > self.max_commission {
            return Err(AppError::InvalidConfig(format!(
                "min_commission {} exceeds max_commission {}",
                self.min_commission, self.max_commission
            )));
        }
        if !(1..=MAX_LOOKBACK_DAYS).contains(&self.lookback_days) {
            return Err(AppError::InvalidConfig(format!(
                "lookback_days must be within [1, {MAX_LOOKBACK_DAYS}]"
            )));
        }
        if self.idle_days_normal < 0 || self.idle_days_full < self.idle_days_normal {
            return Err(AppError::InvalidConfig(format!(
                "idle thresholds must satisfy 0 <= normal ({}) <= full ({})",
                self.idle_days_normal, self.idle_days_full
            )));
        }

        let weight_sum = self.weight_consumption + self.weight_revenue;
        if (weight_sum - 1.0).abs() > 1e-9 {
            warn!(
                weight_sum,
                "commission weights do not sum to 1.0; notes leave the documented scale"
            );
        }

        Ok(())
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
