//! Date range and user id helpers for the range-based endpoints.

use chrono::{Days, NaiveDate, Utc};

use crate::PulseError;

/// Days covered before `end` when no start date is given.
pub const DEFAULT_LOOKBACK_DAYS: u64 = 8;

/// Inclusive date range for the snapshot and event endpoints.
///
/// Either bound may be left open; [`DateRange::resolve`] fills in the defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Range ending today (UTC) and starting eight days earlier.
    pub fn recent() -> Self {
        Self::default()
    }

    /// Parse optional `YYYY-MM-DD` strings.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, PulseError> {
        Ok(Self {
            start: start.map(parse_date).transpose()?,
            end: end.map(parse_date).transpose()?,
        })
    }

    /// Concrete `(start, end)` relative to today's date.
    pub fn resolve(&self) -> Result<(NaiveDate, NaiveDate), PulseError> {
        self.resolve_at(Utc::now().date_naive())
    }

    /// Concrete `(start, end)` with an explicit "today", so callers and tests don't
    /// depend on the clock. `end` defaults to `today`, `start` to eight days before `end`.
    pub fn resolve_at(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), PulseError> {
        let end = self.end.unwrap_or(today);
        let start = match self.start {
            Some(start) => start,
            None => end
                .checked_sub_days(Days::new(DEFAULT_LOOKBACK_DAYS))
                .ok_or_else(|| PulseError::InvalidInput(format!("end date out of range: {end}")))?,
        };
        if start > end {
            return Err(PulseError::InvalidInput(format!(
                "start date greater than end date: {start} > {end}"
            )));
        }
        Ok((start, end))
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate, PulseError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| PulseError::InvalidInput(format!("invalid date {s:?}: {e}")))
}

/// Requested user ids, or the session owner when none were given.
pub fn resolve_user_ids(user_ids: &[String], session_user: &str) -> Vec<String> {
    if user_ids.is_empty() {
        vec![session_user.to_string()]
    } else {
        user_ids.to_vec()
    }
}
