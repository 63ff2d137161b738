//! Acute workload, chronic workload and acute/chronic workload ratio (ACR).
//!
//! Snapshots are treated as a sparse set of days with recorded data. Days missing from
//! the input are skipped rather than zero-filled, and a day's weight is chosen by its
//! recency rank among the days present, not by calendar distance from the end date.
//!
//! Both windows use dynamic divisors: the divisor grows with the number of days
//! available so that a short history does not inflate the estimate.
//!
//! References:
//! - <https://www.drivelinebaseball.com/2020/04/what-is-throwing-workload/>
//! - "Optimized acute workload computation for baseball pitchers: coupled 9-day
//!   exponentially weighted averages with dynamic divisors" (Driveline, 2019).

use std::collections::BTreeMap;

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::Serialize;
use thiserror::Error;

use crate::{DailySnapshot, ThrowEvent};

/// Length in days of the acute window.
pub const ACUTE_LENGTH: usize = 9;

/// Acute weights by recency rank, most recent day first.
pub const ACUTE_WEIGHTS: [f64; ACUTE_LENGTH] =
    [1.3, 1.225, 1.15, 1.075, 1.0, 0.925, 0.85, 0.775, 0.7];

/// Length in days of the chronic window.
pub const CHRONIC_LENGTH: usize = 28;

/// Acute divisor indexed by `min(days_available, ACUTE_LENGTH) - 1`.
const ACUTE_DIVISORS: [f64; ACUTE_LENGTH] = [3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 9.0, 9.0];

/// Chronic divisor indexed by `min(days_available, CHRONIC_LENGTH) - 1`.
const CHRONIC_DIVISORS: [f64; CHRONIC_LENGTH] = [
    5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0, 17.0, 18.0, 19.0,
    20.0, 21.0, 22.0, 23.0, 24.0, 25.0, 26.0, 27.0, 28.0, 28.0, 28.0, 28.0, 28.0,
];

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WorkloadError {
    #[error("end date {end_date} precedes every snapshot (earliest is {earliest})")]
    InvalidRange {
        end_date: NaiveDate,
        earliest: NaiveDate,
    },
    #[error("acute/chronic workload ratio is undefined: chronic workload is zero")]
    DivisionUndefined,
}

/// Workload figures for a single day.
#[derive(Clone, Debug, Serialize, PartialEq, JsonSchema)]
pub struct WorkloadMetrics {
    pub date: NaiveDate,
    pub acute: f64,
    pub chronic: f64,
    /// `None` when chronic workload is zero.
    pub ratio: Option<f64>,
}

/// Acute divisor for the given number of days with data (3 for one day, up to 9).
///
/// `None` without any data: there is nothing to average.
pub fn acute_divisor(days_available: usize) -> Option<f64> {
    let index = days_available.min(ACUTE_LENGTH).checked_sub(1)?;
    Some(ACUTE_DIVISORS[index])
}

/// Chronic divisor for the given number of days with data (5 for one day, up to 28).
///
/// `None` without any data.
pub fn chronic_divisor(days_available: usize) -> Option<f64> {
    let index = days_available.min(CHRONIC_LENGTH).checked_sub(1)?;
    Some(CHRONIC_DIVISORS[index])
}

/// Total workload of the given events. No filtering is applied here.
pub fn sum_workload(events: &[ThrowEvent], normalized: bool) -> f64 {
    events.iter().map(|e| e.workload_value(normalized)).sum()
}

/// Recency-weighted average over the 9 most recent days on or before `end_date`.
///
/// `end_date` defaults to the newest snapshot. An empty series yields 0.
pub fn compute_acute_workload(
    snapshots: &[DailySnapshot],
    end_date: Option<NaiveDate>,
    normalized: bool,
) -> Result<f64, WorkloadError> {
    let series = DailySeries::new(snapshots, normalized);
    Ok(acute(series.window(end_date)?))
}

/// Plain average over the 28 most recent days on or before `end_date`.
///
/// `end_date` defaults to the newest snapshot. An empty series yields 0.
pub fn compute_chronic_workload(
    snapshots: &[DailySnapshot],
    end_date: Option<NaiveDate>,
    normalized: bool,
) -> Result<f64, WorkloadError> {
    let series = DailySeries::new(snapshots, normalized);
    Ok(chronic(series.window(end_date)?))
}

/// Acute workload divided by chronic workload over the same window.
///
/// Fails with [`WorkloadError::DivisionUndefined`] when chronic workload is exactly 0,
/// which includes the empty series.
pub fn compute_acr(
    snapshots: &[DailySnapshot],
    end_date: Option<NaiveDate>,
    normalized: bool,
) -> Result<f64, WorkloadError> {
    let series = DailySeries::new(snapshots, normalized);
    let window = series.window(end_date)?;
    ratio(acute(window), chronic(window)).ok_or(WorkloadError::DivisionUndefined)
}

/// Acute, chronic and ratio for one day.
///
/// Returns `Ok(None)` when the series holds no snapshots at all.
pub fn workload_metrics(
    snapshots: &[DailySnapshot],
    end_date: Option<NaiveDate>,
    normalized: bool,
) -> Result<Option<WorkloadMetrics>, WorkloadError> {
    let series = DailySeries::new(snapshots, normalized);
    let Some(newest) = series.newest() else {
        return Ok(None);
    };
    let window = series.window(end_date)?;
    Ok(Some(metrics(end_date.unwrap_or(newest), window)))
}

/// Metrics for every distinct day in the series, oldest first.
pub fn workload_history(snapshots: &[DailySnapshot], normalized: bool) -> Vec<WorkloadMetrics> {
    let series = DailySeries::new(snapshots, normalized);
    let mut history: Vec<WorkloadMetrics> = (0..series.days.len())
        .map(|rank| {
            let window = &series.days[rank..];
            metrics(window[0].0, window)
        })
        .collect();
    history.reverse();
    history
}

/// Daily values keyed by date, newest first. A later duplicate date replaces an
/// earlier one.
struct DailySeries {
    days: Vec<(NaiveDate, f64)>,
}

impl DailySeries {
    fn new(snapshots: &[DailySnapshot], normalized: bool) -> Self {
        let mut by_date = BTreeMap::new();
        for snapshot in snapshots {
            by_date.insert(snapshot.date, snapshot.daily_value(normalized));
        }
        Self {
            days: by_date.into_iter().rev().collect(),
        }
    }

    fn newest(&self) -> Option<NaiveDate> {
        self.days.first().map(|(date, _)| *date)
    }

    /// Days on or before `end_date`, newest first.
    fn window(&self, end_date: Option<NaiveDate>) -> Result<&[(NaiveDate, f64)], WorkloadError> {
        let (Some(end_date), Some(&(earliest, _))) = (end_date, self.days.last()) else {
            return Ok(&self.days);
        };
        if end_date < earliest {
            return Err(WorkloadError::InvalidRange { end_date, earliest });
        }
        let start = self.days.partition_point(|(date, _)| *date > end_date);
        Ok(&self.days[start..])
    }
}

fn acute(window: &[(NaiveDate, f64)]) -> f64 {
    let days = window.len().min(ACUTE_LENGTH);
    let Some(divisor) = acute_divisor(days) else {
        return 0.0;
    };
    let numerator: f64 = window
        .iter()
        .zip(ACUTE_WEIGHTS)
        .map(|((_, value), weight)| weight * value)
        .sum();
    tracing::trace!(days, divisor, numerator, "acute workload");
    numerator / divisor
}

fn chronic(window: &[(NaiveDate, f64)]) -> f64 {
    let days = window.len().min(CHRONIC_LENGTH);
    let Some(divisor) = chronic_divisor(days) else {
        return 0.0;
    };
    let total: f64 = window[..days].iter().map(|(_, value)| value).sum();
    tracing::trace!(days, divisor, total, "chronic workload");
    total / divisor
}

fn ratio(acute: f64, chronic: f64) -> Option<f64> {
    (chronic != 0.0).then(|| acute / chronic)
}

fn metrics(date: NaiveDate, window: &[(NaiveDate, f64)]) -> WorkloadMetrics {
    let acute = acute(window);
    let chronic = chronic(window);
    WorkloadMetrics {
        date,
        acute,
        chronic,
        ratio: ratio(acute, chronic),
    }
}
