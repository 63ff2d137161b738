//! `PulseClient` trait, Pulse data model, and the throwing workload engine.
//!
//! Pulse is a wearable sensor that tracks throwing workload for baseball players. This
//! crate fetches throw events and daily snapshots from the Pulse third-party API and
//! derives acute workload, chronic workload and the acute/chronic workload ratio from
//! them. The [`filters`] and [`workload`] modules are pure and never touch the network.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub mod config;
pub mod filters;
pub mod http_client;
pub mod utils;
pub mod workload;

pub use utils::DateRange;
pub use workload::{WorkloadError, WorkloadMetrics};

#[derive(Debug, Error)]
pub enum PulseError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("api error (status {status}): {body}")]
    Api { status: u16, body: String },
    #[error("decoding response: {0}")]
    Decode(String),
    #[error("client is not authenticated; call authenticate() first")]
    Unauthenticated,
    #[error(transparent)]
    Workload(#[from] WorkloadError),
}

impl PulseError {
    pub fn from_status(status: u16, body: String) -> Self {
        PulseError::Api { status, body }
    }
}

/// Owner of the OAuth session.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, JsonSchema)]
pub struct TeamInfo {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub user_id: String,
    pub team_member_id: Option<String>,
    pub athlete_profile_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

/// Team of the session owner and its members.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, JsonSchema)]
pub struct Team {
    pub team: TeamInfo,
    #[serde(default)]
    pub members: Vec<TeamMember>,
}

/// One throw recorded by the sensor.
///
/// Only `tag`, `simulated`, `high_effort`, `workload` and `normalized_workload` feed the
/// workload engine; the biomechanical fields are carried through untouched.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThrowEvent {
    pub event_id: String,
    #[serde(rename = "datetime")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub simulated: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_null_as_false")]
    pub high_effort: bool,
    #[serde(deserialize_with = "deserialize_workload")]
    pub workload: f64,
    #[serde(deserialize_with = "deserialize_workload")]
    pub normalized_workload: f64,
    #[serde(default)]
    pub scaler: Option<f64>,
    #[serde(default)]
    pub arm_slot: Option<f64>,
    #[serde(default)]
    pub arm_speed: Option<f64>,
    #[serde(default)]
    pub shoulder_rotation: Option<f64>,
    #[serde(default)]
    pub torque: Option<f64>,
    #[serde(default)]
    pub ball_velocity: Option<f64>,
    #[serde(default, rename = "ballWeight (oz)")]
    pub ball_weight_oz: Option<f64>,
    #[serde(default)]
    pub preferred_ball_weight_unit: Option<String>,
}

impl ThrowEvent {
    /// Workload contribution, normalized by ball weight when `normalized` is set.
    pub fn workload_value(&self, normalized: bool) -> f64 {
        if normalized {
            self.normalized_workload
        } else {
            self.workload
        }
    }

    pub fn is_simulated(&self) -> bool {
        self.simulated.unwrap_or(false)
    }
}

/// Aggregated throwing for one athlete on one calendar day.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailySnapshot {
    pub date: NaiveDate,
    #[serde(default)]
    pub throw_count: u32,
    #[serde(default)]
    pub high_effort_throw_count: u32,
    #[serde(default, deserialize_with = "deserialize_workload")]
    pub daily_workload: f64,
    #[serde(default, deserialize_with = "deserialize_workload")]
    pub norm_daily_workload: f64,
    #[serde(default)]
    pub acute_workload: Option<f64>,
    #[serde(default)]
    pub chronic_workload: Option<f64>,
    #[serde(default)]
    pub norm_acute_workload: Option<f64>,
    #[serde(default)]
    pub norm_chronic_workload: Option<f64>,
    #[serde(default)]
    pub workload_ratio: Option<f64>,
    #[serde(default, rename = "baseballProjectedOneDayWorkloads")]
    pub projected_one_day_workloads: Vec<f64>,
}

impl DailySnapshot {
    pub fn daily_value(&self, normalized: bool) -> f64 {
        if normalized {
            self.norm_daily_workload
        } else {
            self.daily_workload
        }
    }
}

fn deserialize_null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

fn deserialize_workload<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() || value < 0.0 {
        return Err(D::Error::custom(format!(
            "workload must be a non-negative number, got {value}"
        )));
    }
    Ok(value)
}

/// Source of Pulse data keyed by athlete (Pulse user) id.
///
/// An empty `user_ids` slice asks for the owner of the session.
#[async_trait]
pub trait PulseClient: Send + Sync + 'static {
    /// Profile of the owner of the session.
    async fn get_profile(&self) -> Result<Profile, PulseError>;

    /// Team of the owner of the session.
    async fn get_team(&self) -> Result<Team, PulseError>;

    /// Daily snapshots per user over an inclusive date range.
    async fn get_snapshots(
        &self,
        range: DateRange,
        user_ids: &[String],
    ) -> Result<BTreeMap<String, Vec<DailySnapshot>>, PulseError>;

    /// Individual throw events per user over an inclusive date range.
    async fn get_events(
        &self,
        range: DateRange,
        user_ids: &[String],
    ) -> Result<BTreeMap<String, Vec<ThrowEvent>>, PulseError>;
}
