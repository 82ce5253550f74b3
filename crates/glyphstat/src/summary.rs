//! Mean, median and sample standard deviation over score series.
//!
//! None of these return a placeholder for empty input: an empty series is an
//! error, and the standard deviation needs two points.

use serde::Serialize;

use crate::error::MetricError;

pub fn mean(values: &[f64]) -> Result<f64, MetricError> {
    if values.is_empty() {
        return Err(MetricError::EmptySeries { metric: "mean" });
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Middle value, or the mean of the two middle values for even lengths.
pub fn median(values: &[f64]) -> Result<f64, MetricError> {
    if values.is_empty() {
        return Err(MetricError::EmptySeries { metric: "median" });
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Ok(sorted[mid])
    } else {
        Ok((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// Sample (n - 1) standard deviation.
pub fn sample_stdev(values: &[f64]) -> Result<f64, MetricError> {
    if values.len() < 2 {
        return Err(MetricError::InsufficientData {
            metric: "stdev",
            needed: 2,
            got: values.len(),
        });
    }
    let m = mean(values)?;
    let sq: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Ok((sq / (values.len() - 1) as f64).sqrt())
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Absent for a single-value series.
    pub stdev: Option<f64>,
}

impl SeriesSummary {
    pub fn of(values: &[f64]) -> Result<Self, MetricError> {
        Ok(Self {
            count: values.len(),
            mean: mean(values)?,
            median: median(values)?,
            stdev: sample_stdev(values).ok(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_series_fails_explicitly() {
        assert_eq!(
            mean(&[]),
            Err(MetricError::EmptySeries { metric: "mean" })
        );
        assert!(median(&[]).is_err());
        assert!(SeriesSummary::of(&[]).is_err());
    }

    #[test]
    fn summarizes_known_series() {
        let s = SeriesSummary::of(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(s.count, 8);
        assert_eq!(s.mean, 5.0);
        assert_eq!(s.median, 4.5);
        let stdev = s.stdev.unwrap();
        assert!((stdev - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn single_value_has_no_stdev() {
        let s = SeriesSummary::of(&[0.25]).unwrap();
        assert_eq!(s.median, 0.25);
        assert!(s.stdev.is_none());
        assert_eq!(
            sample_stdev(&[0.25]),
            Err(MetricError::InsufficientData {
                metric: "stdev",
                needed: 2,
                got: 1
            })
        );
    }

    #[test]
    fn median_of_odd_series_is_middle() {
        assert_eq!(median(&[0.9, 0.1, 0.5]), Ok(0.5));
    }
}
