use crate::models::anomaly::{Anomaly, AnomalyLevel};
use crate::models::expense::{Expense, ExpenseKind};
use crate::models::trip::Trip;

const MIN_EFFICIENCY_KM_L: f64 = 1.0;
const MAX_EFFICIENCY_KM_L: f64 = 3.5;
const MIN_DIESEL_PRICE: f64 = 3.0;
const MAX_DIESEL_PRICE: f64 = 8.0;

pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Runs every data-quality check over the trip and expense snapshots.
/// Checks with no offending rows contribute nothing.
pub fn check_anomalies(trips: &[Trip], expenses: &[Expense], max_rows: usize) -> Vec<Anomaly> {
    let trip_expenses: Vec<&Expense> = expenses
        .iter()
        .filter(|e| e.kind == ExpenseKind::Trip)
        .collect();
    let fixed_expenses: Vec<&Expense> = expenses
        .iter()
        .filter(|e| e.kind == ExpenseKind::Fixed)
        .collect();

    let mut anomalies = Vec::new();

    anomalies.extend(report(
        trips.iter().filter(|t| t.km_total.is_some_and(|km| km <= 0.0)),
        "Trips with km_total <= 0",
        AnomalyLevel::Error,
        "Check the odometer reading or the typed km_total.",
        max_rows,
        |t| format!("{} | {}", t.id, fmt_opt(t.km_total)),
    ));

    anomalies.extend(report(
        trips.iter().filter(|t| t.returned_at < t.departed_at),
        "Return date before departure date",
        AnomalyLevel::Error,
        "Fix the departure or return date.",
        max_rows,
        |t| format!("{} | {} | {}", t.id, t.departed_at, t.returned_at),
    ));

    anomalies.extend(report(
        trips
            .iter()
            .filter(|t| t.efficiency().is_some_and(|e| e > MAX_EFFICIENCY_KM_L)),
        &format!("Efficiency > {MAX_EFFICIENCY_KM_L} km/L"),
        AnomalyLevel::Warning,
        "Review refuelled litres or km_total.",
        max_rows,
        efficiency_preview,
    ));

    anomalies.extend(report(
        trips
            .iter()
            .filter(|t| t.efficiency().is_some_and(|e| e < MIN_EFFICIENCY_KM_L)),
        &format!("Efficiency < {MIN_EFFICIENCY_KM_L} km/L"),
        AnomalyLevel::Warning,
        "Check for a refuelling or reading error.",
        max_rows,
        efficiency_preview,
    ));

    anomalies.extend(report(
        trips.iter().filter(|t| {
            t.km_total.is_some_and(|km| km > 0.0) && t.fuel_liters.unwrap_or(0.0) == 0.0
        }),
        "Distance driven without fuel litres",
        AnomalyLevel::Warning,
        "Record the matching refuelling.",
        max_rows,
        |t| format!("{} | {} | {}", t.id, fmt_opt(t.km_total), fmt_opt(t.fuel_liters)),
    ));

    anomalies.extend(report(
        trip_expenses
            .iter()
            .copied()
            .filter(|e| e.fuel_price.is_some_and(|p| p < MIN_DIESEL_PRICE)),
        &format!("Diesel < {MIN_DIESEL_PRICE:.2} per litre"),
        AnomalyLevel::Info,
        "Confirm whether this is ARLA or another product.",
        max_rows,
        fuel_price_preview,
    ));

    anomalies.extend(report(
        trip_expenses
            .iter()
            .copied()
            .filter(|e| e.fuel_price.is_some_and(|p| p > MAX_DIESEL_PRICE)),
        &format!("Diesel > {MAX_DIESEL_PRICE:.2} per litre"),
        AnomalyLevel::Info,
        "Check for a mistyped entry.",
        max_rows,
        fuel_price_preview,
    ));

    for (group, name) in [(&trip_expenses, "trip_expenses"), (&fixed_expenses, "fixed_expenses")] {
        anomalies.extend(report(
            group.iter().copied().filter(|e| e.amount <= 0.0),
            &format!("Amounts <= 0 in {name}"),
            AnomalyLevel::Warning,
            "Fix the sign or remove duplicates.",
            max_rows,
            |e| {
                format!(
                    "{} | {} | {} | {}",
                    e.description,
                    e.date.map(|d| d.to_string()).unwrap_or_default(),
                    e.amount,
                    e.id
                )
            },
        ));
    }

    for (group, name) in [(&trip_expenses, "trip_expenses"), (&fixed_expenses, "fixed_expenses")] {
        anomalies.extend(report(
            group.iter().copied().filter(|e| e.date.is_none()),
            &format!("Records without a date in {name}"),
            AnomalyLevel::Warning,
            "Provide a valid date so the record shows up in history.",
            max_rows,
            |e| {
                format!(
                    "{} | {} | {} | {}",
                    e.description,
                    e.category.as_deref().unwrap_or_default(),
                    e.amount,
                    e.id
                )
            },
        ));
    }

    anomalies
}

fn report<'a, T, I, F>(
    matches: I,
    message: &str,
    level: AnomalyLevel,
    suggestion: &str,
    max_rows: usize,
    preview: F,
) -> Option<Anomaly>
where
    T: 'a,
    I: Iterator<Item = &'a T>,
    F: Fn(&T) -> String,
{
    let matched: Vec<&T> = matches.collect();
    if matched.is_empty() {
        return None;
    }

    Some(Anomaly {
        message: message.to_string(),
        count: matched.len(),
        level,
        details: matched.iter().take(max_rows).map(|&row| preview(row)).collect(),
        suggestion: suggestion.to_string(),
    })
}

fn efficiency_preview(trip: &Trip) -> String {
    format!("{} | {}", trip.id, fmt_opt(trip.fuel_efficiency))
}

fn fuel_price_preview(expense: &Expense) -> String {
    format!(
        "{} | {} | {} | {}",
        expense.description,
        expense.date.map(|d| d.to_string()).unwrap_or_default(),
        fmt_opt(expense.fuel_price),
        expense.id
    )
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::check_anomalies;
    use crate::models::anomaly::AnomalyLevel;
    use crate::models::expense::{Expense, ExpenseKind};
    use crate::models::trip::fixtures::{day, trip};

    fn expense(kind: ExpenseKind, amount: f64, fuel_price: Option<f64>, dated: bool) -> Expense {
        Expense {
            id: Uuid::new_v4(),
            kind,
            trip_id: None,
            vehicle: Some("V".to_string()),
            description: "DIESEL".to_string(),
            category: Some("COMBUSTIVEL".to_string()),
            date: dated.then(|| NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
            amount,
            fuel_price,
        }
    }

    #[test]
    fn clean_data_reports_nothing() {
        let trips = vec![trip("t1", "V", 0, 2, 2.2, 1_000.0)];
        let expenses = vec![
            expense(ExpenseKind::Trip, 800.0, Some(5.9), true),
            expense(ExpenseKind::Fixed, 1_200.0, None, true),
        ];

        assert!(check_anomalies(&trips, &expenses, 5).is_empty());
    }

    #[test]
    fn trip_checks_run_in_order() {
        let mut zero_km = trip("zero", "V", 0, 2, 2.0, 1_000.0);
        zero_km.km_total = Some(0.0);
        let mut inverted = trip("inv", "V", 5, 5, 2.0, 1_000.0);
        inverted.returned_at = day(3);
        let thirsty = trip("thirsty", "V", 10, 12, 0.6, 1_000.0);
        let mut dry = trip("dry", "V", 20, 22, 2.0, 1_000.0);
        dry.fuel_liters = None;

        let anomalies = check_anomalies(&[zero_km, inverted, thirsty, dry], &[], 5);
        let messages: Vec<&str> = anomalies.iter().map(|a| a.message.as_str()).collect();

        assert_eq!(
            messages,
            vec![
                "Trips with km_total <= 0",
                "Return date before departure date",
                "Efficiency < 1 km/L",
                "Distance driven without fuel litres",
            ]
        );
        assert_eq!(anomalies[0].level, AnomalyLevel::Error);
        assert_eq!(anomalies[0].details, vec!["zero | 0".to_string()]);
        assert_eq!(anomalies[2].level, AnomalyLevel::Warning);
    }

    #[test]
    fn details_are_capped_but_count_is_not() {
        let trips: Vec<_> = (0..8)
            .map(|i| trip(&format!("t{i}"), "V", i, i + 1, 4.2, 1_000.0))
            .collect();

        let anomalies = check_anomalies(&trips, &[], 3);

        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].message, "Efficiency > 3.5 km/L");
        assert_eq!(anomalies[0].count, 8);
        assert_eq!(anomalies[0].details.len(), 3);
    }

    #[test]
    fn expense_checks_split_trip_and_fixed_groups() {
        let expenses = vec![
            expense(ExpenseKind::Trip, 100.0, Some(2.1), true),
            expense(ExpenseKind::Trip, 100.0, Some(9.5), true),
            expense(ExpenseKind::Trip, -40.0, None, true),
            expense(ExpenseKind::Fixed, 0.0, None, true),
            expense(ExpenseKind::Fixed, 300.0, None, false),
        ];

        let anomalies = check_anomalies(&[], &expenses, 5);
        let summary: Vec<(&str, AnomalyLevel)> = anomalies
            .iter()
            .map(|a| (a.message.as_str(), a.level))
            .collect();

        assert_eq!(
            summary,
            vec![
                ("Diesel < 3.00 per litre", AnomalyLevel::Info),
                ("Diesel > 8.00 per litre", AnomalyLevel::Info),
                ("Amounts <= 0 in trip_expenses", AnomalyLevel::Warning),
                ("Amounts <= 0 in fixed_expenses", AnomalyLevel::Warning),
                ("Records without a date in fixed_expenses", AnomalyLevel::Warning),
            ]
        );
    }
}
