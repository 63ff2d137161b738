//! Event filtering and workload summaries behind the workload tools.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use pulse_throw_client::filters::{filter_by_tag, filter_high_effort, filter_simulated};
use pulse_throw_client::workload::{self, WorkloadMetrics};
use pulse_throw_client::{DailySnapshot, DateRange, ThrowEvent};
use schemars::JsonSchema;
use serde::Serialize;

use crate::error::{McpError, McpResult};

/// Days of snapshots fetched for workload tools unless the caller asks otherwise.
/// Chronic workload needs 28 days of data; rest days make the calendar span longer.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 42;

/// Optional event filters; `None` leaves that criterion unfiltered.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventFilter {
    pub tags: Option<Vec<String>>,
    pub blacklist: bool,
    pub simulated: Option<bool>,
    pub high_effort: Option<bool>,
}

#[derive(Clone, Debug, Serialize, PartialEq, JsonSchema)]
pub struct WorkloadSum {
    pub throws: usize,
    pub high_effort_throws: usize,
    pub workload: f64,
}

pub fn apply_filters(events: &[ThrowEvent], filter: &EventFilter) -> Vec<ThrowEvent> {
    let mut selected = match &filter.tags {
        Some(tags) => filter_by_tag(events, tags, filter.blacklist),
        None => events.to_vec(),
    };
    if let Some(simulated) = filter.simulated {
        selected = filter_simulated(&selected, simulated);
    }
    if let Some(high_effort) = filter.high_effort {
        selected = filter_high_effort(&selected, high_effort);
    }
    selected
}

/// Filtered throw count and workload per athlete.
pub fn summarize_events(
    events: &BTreeMap<String, Vec<ThrowEvent>>,
    filter: &EventFilter,
    normalized: bool,
) -> BTreeMap<String, WorkloadSum> {
    events
        .iter()
        .map(|(user, throws)| {
            let selected = apply_filters(throws, filter);
            let sum = WorkloadSum {
                throws: selected.len(),
                high_effort_throws: selected.iter().filter(|e| e.high_effort).count(),
                workload: workload::sum_workload(&selected, normalized),
            };
            (user.clone(), sum)
        })
        .collect()
}

/// Range of `days_back` days ending at `end` (or today).
pub fn lookback_range(
    end: Option<NaiveDate>,
    days_back: u32,
    today: NaiveDate,
) -> McpResult<DateRange> {
    let end = end.unwrap_or(today);
    let start = end
        .checked_sub_days(Days::new(days_back.into()))
        .ok_or_else(|| McpError::Validation(format!("days_back too large: {days_back}")))?;
    Ok(DateRange::new(Some(start), Some(end)))
}

/// Metrics on `end_date` (or each athlete's latest day) per athlete.
pub fn metrics_by_user(
    snapshots: &BTreeMap<String, Vec<DailySnapshot>>,
    end_date: Option<NaiveDate>,
    normalized: bool,
) -> McpResult<BTreeMap<String, Option<WorkloadMetrics>>> {
    snapshots
        .iter()
        .map(|(user, days)| {
            let metrics = workload::workload_metrics(days, end_date, normalized)
                .map_err(pulse_throw_client::PulseError::from)?;
            Ok::<_, McpError>((user.clone(), metrics))
        })
        .collect()
}

pub fn history_by_user(
    snapshots: &BTreeMap<String, Vec<DailySnapshot>>,
    normalized: bool,
) -> BTreeMap<String, Vec<WorkloadMetrics>> {
    snapshots
        .iter()
        .map(|(user, days)| (user.clone(), workload::workload_history(days, normalized)))
        .collect()
}
