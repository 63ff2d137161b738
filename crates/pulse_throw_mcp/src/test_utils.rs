//! Mock `PulseClient` and sample data shared by unit tests.
#![cfg(test)]

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};

use pulse_throw_client::{
    DailySnapshot, DateRange, Profile, PulseClient, PulseError, Team, TeamInfo, TeamMember,
    ThrowEvent,
};

const OWNER: &str = "owner1";

fn event(
    id: &str,
    tag: Option<&str>,
    simulated: Option<bool>,
    high_effort: bool,
    workload: f64,
    normalized_workload: f64,
) -> ThrowEvent {
    ThrowEvent {
        event_id: id.to_string(),
        timestamp: Utc.with_ymd_and_hms(2022, 8, 20, 15, 0, 0).unwrap(),
        tag: tag.map(str::to_string),
        simulated,
        high_effort,
        workload,
        normalized_workload,
        scaler: None,
        arm_slot: None,
        arm_speed: None,
        shoulder_rotation: None,
        torque: None,
        ball_velocity: None,
        ball_weight_oz: None,
        preferred_ball_weight_unit: None,
    }
}

pub fn sample_events() -> Vec<ThrowEvent> {
    vec![
        event("a", Some("Pre-Game"), Some(false), false, 8.5, 0.01),
        event("b", Some("Plyo"), Some(true), true, 117.5, 0.25),
        event("c", None, Some(false), true, 121.5, 0.25),
    ]
}

fn snapshot(date: NaiveDate, daily: f64) -> DailySnapshot {
    DailySnapshot {
        date,
        throw_count: 10,
        high_effort_throw_count: 2,
        daily_workload: daily,
        norm_daily_workload: daily / 10.0,
        acute_workload: None,
        chronic_workload: None,
        norm_acute_workload: None,
        norm_chronic_workload: None,
        workload_ratio: None,
        projected_one_day_workloads: Vec::new(),
    }
}

/// Three consecutive days with daily workloads 10, 20 and 30.
pub fn sample_snapshots() -> Vec<DailySnapshot> {
    let first = NaiveDate::from_ymd_opt(2022, 8, 20).unwrap();
    [10.0, 20.0, 30.0]
        .into_iter()
        .zip(first.iter_days())
        .map(|(daily, date)| snapshot(date, daily))
        .collect()
}

fn owner_or(user_ids: &[String]) -> Vec<String> {
    if user_ids.is_empty() {
        vec![OWNER.to_string()]
    } else {
        user_ids.to_vec()
    }
}

/// Serves the sample data for the owner and nothing for other users.
#[derive(Default)]
pub struct MockPulseClient;

#[async_trait]
impl PulseClient for MockPulseClient {
    async fn get_profile(&self) -> Result<Profile, PulseError> {
        Ok(Profile {
            id: OWNER.to_string(),
            first_name: Some("Pat".to_string()),
            last_name: Some("Pitcher".to_string()),
            email: None,
        })
    }

    async fn get_team(&self) -> Result<Team, PulseError> {
        Ok(Team {
            team: TeamInfo {
                id: "team1".to_string(),
                name: Some("Test Team".to_string()),
            },
            members: vec![TeamMember {
                user_id: OWNER.to_string(),
                team_member_id: None,
                athlete_profile_id: None,
                first_name: Some("Pat".to_string()),
                last_name: Some("Pitcher".to_string()),
                email: None,
            }],
        })
    }

    async fn get_snapshots(
        &self,
        range: DateRange,
        user_ids: &[String],
    ) -> Result<BTreeMap<String, Vec<DailySnapshot>>, PulseError> {
        range.resolve()?;
        Ok(owner_or(user_ids)
            .into_iter()
            .map(|id| {
                let snaps = if id == OWNER {
                    sample_snapshots()
                } else {
                    Vec::new()
                };
                (id, snaps)
            })
            .collect())
    }

    async fn get_events(
        &self,
        range: DateRange,
        user_ids: &[String],
    ) -> Result<BTreeMap<String, Vec<ThrowEvent>>, PulseError> {
        range.resolve()?;
        Ok(owner_or(user_ids)
            .into_iter()
            .map(|id| {
                let events = if id == OWNER {
                    sample_events()
                } else {
                    Vec::new()
                };
                (id, events)
            })
            .collect())
    }
}
