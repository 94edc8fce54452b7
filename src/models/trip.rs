use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Which trip figure the commission engine treats as revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevenueField {
    GrossProfit,
    FreightTotal,
}

impl RevenueField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevenueField::GrossProfit => "gross_profit",
            RevenueField::FreightTotal => "freight_total",
        }
    }
}

impl fmt::Display for RevenueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RevenueField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "gross_profit" => Ok(RevenueField::GrossProfit),
            "freight_total" => Ok(RevenueField::FreightTotal),
            other => Err(format!(
                "unknown revenue field: {other}, expected gross_profit/freight_total"
            )),
        }
    }
}

/// A finished dispatch of a vehicle, already joined with its driver and
/// plate upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: String,
    pub vehicle: String,
    #[serde(default)]
    pub driver: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    pub departed_at: DateTime<Utc>,
    pub returned_at: DateTime<Utc>,
    #[serde(default)]
    pub km_total: Option<f64>,
    #[serde(default)]
    pub fuel_liters: Option<f64>,
    /// Kilometres per litre.
    #[serde(default)]
    pub fuel_efficiency: Option<f64>,
    #[serde(default)]
    pub gross_profit: Option<f64>,
    #[serde(default)]
    pub freight_outbound: Option<f64>,
    #[serde(default)]
    pub freight_return: Option<f64>,
    #[serde(default)]
    pub freight_extra: Option<f64>,
}

impl Trip {
    /// Whole days between departure and return, never less than one.
    pub fn duration_days(&self) -> i64 {
        (self.returned_at - self.departed_at).num_days().max(1)
    }

    pub fn freight_total(&self) -> Option<f64> {
        let parts = [self.freight_outbound, self.freight_return, self.freight_extra];
        if parts.iter().all(Option::is_none) {
            return None;
        }
        Some(parts.iter().map(|part| part.unwrap_or(0.0)).sum())
    }

    pub fn revenue(&self, field: RevenueField) -> Option<f64> {
        let value = match field {
            RevenueField::GrossProfit => self.gross_profit,
            RevenueField::FreightTotal => self.freight_total(),
        };
        value.filter(|v| v.is_finite())
    }

    pub fn revenue_per_day(&self, field: RevenueField) -> Option<f64> {
        self.revenue(field)
            .map(|revenue| revenue / self.duration_days() as f64)
    }

    pub fn efficiency(&self) -> Option<f64> {
        self.fuel_efficiency.filter(|v| v.is_finite())
    }

    pub fn require_efficiency(&self) -> Result<f64, AppError> {
        self.efficiency().ok_or_else(|| AppError::MissingField {
            trip_id: self.id.clone(),
            field: "fuel_efficiency",
        })
    }

    pub fn require_revenue_per_day(&self, field: RevenueField) -> Result<f64, AppError> {
        self.revenue_per_day(field)
            .ok_or_else(|| AppError::MissingField {
                trip_id: self.id.clone(),
                field: field.as_str(),
            })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::Trip;

    pub fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap() + Duration::days(n)
    }

    pub fn trip(id: &str, vehicle: &str, start: i64, end: i64, efficiency: f64, profit: f64) -> Trip {
        Trip {
            id: id.to_string(),
            vehicle: vehicle.to_string(),
            driver: Some("driver".to_string()),
            status: None,
            departed_at: day(start),
            returned_at: day(end),
            km_total: Some(1_000.0),
            fuel_liters: Some(1_000.0 / efficiency),
            fuel_efficiency: Some(efficiency),
            gross_profit: Some(profit),
            freight_outbound: None,
            freight_return: None,
            freight_extra: None,
        }
    }
}
