use std::io::Read;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

use crate::error::AppError;
use crate::models::trip::Trip;

/// Trip statuses that are not finished yet and are never scored.
const UNFINISHED_STATUSES: [&str; 2] = ["NOT_STARTED", "IN_TRANSIT"];

#[derive(Debug)]
pub struct TripImport {
    pub trips: Vec<Trip>,
    pub skipped: usize,
}

pub fn parse_trips<R: Read>(reader: R) -> Result<TripImport, AppError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut trips = Vec::new();
    let mut skipped = 0;

    for (index, record) in csv_reader.deserialize::<TripRow>().enumerate() {
        let line = index + 2;
        let row = record.map_err(|err| AppError::BadRequest(format!("line {line}: {err}")))?;

        if row
            .status
            .as_deref()
            .is_some_and(|status| UNFINISHED_STATUSES.contains(&status))
        {
            skipped += 1;
            continue;
        }

        trips.push(row.into_trip(line)?);
    }

    Ok(TripImport { trips, skipped })
}

#[derive(Debug, Deserialize)]
struct TripRow {
    id: String,
    vehicle: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    driver: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    status: Option<String>,
    departed_at: String,
    returned_at: String,
    #[serde(default)]
    km_total: Option<f64>,
    #[serde(default)]
    fuel_liters: Option<f64>,
    #[serde(default)]
    fuel_efficiency: Option<f64>,
    #[serde(default)]
    gross_profit: Option<f64>,
    #[serde(default)]
    freight_outbound: Option<f64>,
    #[serde(default)]
    freight_return: Option<f64>,
    #[serde(default)]
    freight_extra: Option<f64>,
}

impl TripRow {
    fn into_trip(self, line: usize) -> Result<Trip, AppError> {
        if self.id.is_empty() || self.vehicle.is_empty() {
            return Err(AppError::BadRequest(format!(
                "line {line}: id and vehicle are required"
            )));
        }

        let departed_at = parse_timestamp(&self.departed_at).ok_or_else(|| {
            AppError::BadRequest(format!(
                "line {line}: invalid departed_at `{}`",
                self.departed_at
            ))
        })?;
        let returned_at = parse_timestamp(&self.returned_at).ok_or_else(|| {
            AppError::BadRequest(format!(
                "line {line}: invalid returned_at `{}`",
                self.returned_at
            ))
        })?;

        let fuel_efficiency = self.fuel_efficiency.or(match (self.km_total, self.fuel_liters) {
            (Some(km), Some(liters)) if liters > 0.0 => Some(km / liters),
            _ => None,
        });

        Ok(Trip {
            id: self.id,
            vehicle: self.vehicle,
            driver: self.driver,
            status: self.status,
            departed_at,
            returned_at,
            km_total: self.km_total,
            fuel_liters: self.fuel_liters,
            fuel_efficiency,
            gross_profit: self.gross_profit,
            freight_outbound: self.freight_outbound,
            freight_return: self.freight_return,
            freight_extra: self.freight_extra,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::parse_trips;
    use crate::error::AppError;

    const HEADER: &str = "id,vehicle,driver,status,departed_at,returned_at,km_total,fuel_liters,fuel_efficiency,gross_profit,freight_outbound,freight_return,freight_extra\n";

    #[test]
    fn parses_finished_trips_and_skips_open_ones() {
        let csv = format!(
            "{HEADER}\
             1,ABC1D23,Ana,FINISHED,2024-02-01,2024-02-04,1200,500,2.4,3000,4000,1500,\n\
             2,ABC1D23,Ana,IN_TRANSIT,2024-02-10,2024-02-12,,,,,,,\n\
             3,XYZ9K87,,,2024-02-05T06:30:00Z,2024-02-06T18:00:00Z,800,400,,900,,,\n"
        );

        let import = parse_trips(csv.as_bytes()).unwrap();

        assert_eq!(import.skipped, 1);
        assert_eq!(import.trips.len(), 2);

        let first = &import.trips[0];
        assert_eq!(first.driver.as_deref(), Some("Ana"));
        assert_eq!(first.duration_days(), 3);
        assert_eq!(first.freight_extra, None);

        let second = &import.trips[1];
        assert_eq!(second.driver, None);
        assert_eq!(second.fuel_efficiency, Some(2.0));
    }

    #[test]
    fn bad_timestamp_reports_the_line() {
        let csv = format!("{HEADER}1,ABC1D23,Ana,,01/02/2024,2024-02-04,,,2.0,100,,,\n");

        match parse_trips(csv.as_bytes()) {
            Err(AppError::BadRequest(message)) => assert!(message.starts_with("line 2:")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn non_numeric_cell_is_rejected() {
        let csv = format!("{HEADER}1,ABC1D23,Ana,,2024-02-01,2024-02-04,lots,,2.0,100,,,\n");

        assert!(matches!(
            parse_trips(csv.as_bytes()),
            Err(AppError::BadRequest(_))
        ));
    }
}
