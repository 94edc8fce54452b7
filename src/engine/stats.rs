//! Summary statistics over trip metrics. Non-finite samples are skipped;
//! an empty sample has no statistic.

pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

pub fn median<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }

    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;

    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::{mean, median};

    #[test]
    fn mean_of_empty_sample_is_undefined() {
        assert_eq!(mean(Vec::new()), None);
        assert_eq!(mean(vec![f64::NAN]), None);
    }

    #[test]
    fn mean_skips_nan() {
        assert_eq!(mean(vec![2.0, f64::NAN, 4.0]), Some(3.0));
    }

    #[test]
    fn median_of_odd_and_even_samples() {
        assert_eq!(median(vec![520.0, 480.0, 500.0]), Some(500.0));
        assert_eq!(median(vec![4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn median_ignores_order() {
        let a = median(vec![1.0, 9.0, 5.0, 7.0, 3.0]);
        let b = median(vec![9.0, 7.0, 5.0, 3.0, 1.0]);
        assert_eq!(a, b);
    }

    #[test]
    fn single_outlier_moves_median_at_most_one_rank() {
        let base = vec![480.0, 500.0, 520.0];
        let before = median(base.clone()).unwrap();

        let mut with_outlier = base;
        with_outlier.push(1_000_000.0);
        let after = median(with_outlier).unwrap();

        assert_eq!(before, 500.0);
        assert_eq!(after, 510.0);
    }
}
