use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rmcp::Json;
use rmcp::RoleServer;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    GetPromptRequestParams, GetPromptResult, ListPromptsResult, PaginatedRequestParams,
};
use rmcp::service::RequestContext;
use rmcp::{prompt, prompt_handler, prompt_router, tool, tool_handler, tool_router};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use pulse_throw_client::utils::parse_date;
use pulse_throw_client::{
    DailySnapshot, DateRange, Profile, PulseClient, Team, ThrowEvent, WorkloadMetrics,
};

pub mod domains;
pub mod error;
mod prompts;
pub mod telemetry;
mod test_utils;

use domains::workload::{self as workload_domain, DEFAULT_LOOKBACK_DAYS, EventFilter, WorkloadSum};
use error::{McpError, McpResult};

#[derive(Clone)]
pub struct PulseMcpHandler {
    client: Arc<dyn PulseClient>,
    tool_router: rmcp::handler::server::tool::ToolRouter<PulseMcpHandler>,
    prompt_router: rmcp::handler::server::router::prompt::PromptRouter<PulseMcpHandler>,
}

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct RangeParams {
    /// Inclusive start date (YYYY-MM-DD); defaults to 8 days before `end_date`.
    pub start_date: Option<String>,
    /// Inclusive end date (YYYY-MM-DD); defaults to today.
    pub end_date: Option<String>,
    /// Pulse user ids; defaults to the account owner.
    pub user_ids: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct SumWorkloadParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub user_ids: Option<Vec<String>>,
    /// Keep only events with one of these tags (or drop them with `blacklist`).
    pub tags: Option<Vec<String>>,
    pub blacklist: Option<bool>,
    /// `true` keeps only simulated throws, `false` only real ones.
    pub simulated: Option<bool>,
    /// `true` keeps only high-effort throws, `false` only the rest.
    pub high_effort: Option<bool>,
    pub normalized: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct WorkloadParams {
    /// Day the metrics are computed for (YYYY-MM-DD); defaults to the latest day with data.
    pub end_date: Option<String>,
    /// Days of snapshots to fetch before `end_date` (default 42).
    pub days_back: Option<u32>,
    pub user_ids: Option<Vec<String>>,
    pub normalized: Option<bool>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct WorkloadCheckParams {
    pub user_id: Option<String>,
    pub days_back: Option<u32>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ProfileResult {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct SnapshotsResult {
    pub snapshots: BTreeMap<String, Vec<DailySnapshot>>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct EventsResult {
    pub events: BTreeMap<String, Vec<ThrowEvent>>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct WorkloadSumsResult {
    pub normalized: bool,
    pub users: BTreeMap<String, WorkloadSum>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct WorkloadMetricsResult {
    pub normalized: bool,
    /// `null` for athletes without snapshots in the range.
    pub users: BTreeMap<String, Option<WorkloadMetrics>>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct WorkloadHistoryResult {
    pub normalized: bool,
    pub users: BTreeMap<String, Vec<WorkloadMetrics>>,
}

fn full_name(profile: &Profile) -> Option<String> {
    match (&profile.first_name, &profile.last_name) {
        (Some(first), Some(last)) => Some(format!("{first} {last}")),
        (Some(name), None) | (None, Some(name)) => Some(name.clone()),
        (None, None) => None,
    }
}

fn parse_optional_date(value: Option<&str>) -> McpResult<Option<NaiveDate>> {
    value
        .map(|s| parse_date(s).map_err(|e| McpError::Validation(e.to_string())))
        .transpose()
}

#[tool_router]
#[prompt_router]
impl PulseMcpHandler {
    pub fn new(client: Arc<dyn PulseClient>) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
            prompt_router: Self::prompt_router(),
        }
    }

    pub fn tool_count(&self) -> usize {
        self.tool_router.list_all().len()
    }

    pub fn prompt_count(&self) -> usize {
        self.prompt_router.list_all().len()
    }

    async fn fetch_workload_snapshots(
        &self,
        params: &WorkloadParams,
    ) -> McpResult<(Option<NaiveDate>, BTreeMap<String, Vec<DailySnapshot>>)> {
        let end_date = parse_optional_date(params.end_date.as_deref())?;
        let range = workload_domain::lookback_range(
            end_date,
            params.days_back.unwrap_or(DEFAULT_LOOKBACK_DAYS),
            Utc::now().date_naive(),
        )?;
        let user_ids = params.user_ids.clone().unwrap_or_default();
        let snapshots = self.client.get_snapshots(range, &user_ids).await?;
        Ok((end_date, snapshots))
    }

    #[tool(
        name = "get_profile",
        description = "Get the Pulse account owner's profile"
    )]
    async fn get_profile(&self) -> Result<Json<ProfileResult>, String> {
        let p = self.client.get_profile().await.map_err(|e| e.to_string())?;
        Ok(Json(ProfileResult {
            name: full_name(&p),
            id: p.id,
            email: p.email,
        }))
    }

    #[tool(
        name = "get_team",
        description = "Get the account owner's team and its athletes"
    )]
    async fn get_team(&self) -> Result<Json<Team>, String> {
        let team = self.client.get_team().await.map_err(|e| e.to_string())?;
        Ok(Json(team))
    }

    #[tool(
        name = "get_snapshots",
        description = "Daily throwing summaries per athlete over a date range"
    )]
    async fn get_snapshots(
        &self,
        params: Parameters<RangeParams>,
    ) -> Result<Json<SnapshotsResult>, String> {
        let p = params.0;
        let range = DateRange::parse(p.start_date.as_deref(), p.end_date.as_deref())
            .map_err(|e| e.to_string())?;
        let user_ids = p.user_ids.unwrap_or_default();
        let snapshots = self
            .client
            .get_snapshots(range, &user_ids)
            .await
            .map_err(|e| e.to_string())?;
        Ok(Json(SnapshotsResult { snapshots }))
    }

    #[tool(
        name = "get_events",
        description = "Individual throw events per athlete over a date range"
    )]
    async fn get_events(
        &self,
        params: Parameters<RangeParams>,
    ) -> Result<Json<EventsResult>, String> {
        let p = params.0;
        let range = DateRange::parse(p.start_date.as_deref(), p.end_date.as_deref())
            .map_err(|e| e.to_string())?;
        let user_ids = p.user_ids.unwrap_or_default();
        let events = self
            .client
            .get_events(range, &user_ids)
            .await
            .map_err(|e| e.to_string())?;
        Ok(Json(EventsResult { events }))
    }

    #[tool(
        name = "sum_workload",
        description = "Sum throw workload per athlete, optionally filtered by tag, simulated and high-effort throws"
    )]
    async fn sum_workload(
        &self,
        params: Parameters<SumWorkloadParams>,
    ) -> Result<Json<WorkloadSumsResult>, String> {
        let p = params.0;
        let range = DateRange::parse(p.start_date.as_deref(), p.end_date.as_deref())
            .map_err(|e| e.to_string())?;
        let user_ids = p.user_ids.unwrap_or_default();
        let events = self
            .client
            .get_events(range, &user_ids)
            .await
            .map_err(|e| e.to_string())?;

        let filter = EventFilter {
            tags: p.tags,
            blacklist: p.blacklist.unwrap_or(false),
            simulated: p.simulated,
            high_effort: p.high_effort,
        };
        let normalized = p.normalized.unwrap_or(true);
        let users = workload_domain::summarize_events(&events, &filter, normalized);
        tracing::debug!(users = users.len(), normalized, "summed workload");
        Ok(Json(WorkloadSumsResult { normalized, users }))
    }

    #[tool(
        name = "get_workload_metrics",
        description = "Acute workload, chronic workload and acute:chronic ratio per athlete"
    )]
    async fn get_workload_metrics(
        &self,
        params: Parameters<WorkloadParams>,
    ) -> Result<Json<WorkloadMetricsResult>, String> {
        let p = params.0;
        let normalized = p.normalized.unwrap_or(true);
        let (end_date, snapshots) = self.fetch_workload_snapshots(&p).await?;
        let users = workload_domain::metrics_by_user(&snapshots, end_date, normalized)?;
        Ok(Json(WorkloadMetricsResult { normalized, users }))
    }

    #[tool(
        name = "get_workload_history",
        description = "Daily acute/chronic workload series per athlete, oldest first"
    )]
    async fn get_workload_history(
        &self,
        params: Parameters<WorkloadParams>,
    ) -> Result<Json<WorkloadHistoryResult>, String> {
        let p = params.0;
        let normalized = p.normalized.unwrap_or(true);
        let (_, snapshots) = self.fetch_workload_snapshots(&p).await?;
        let users = workload_domain::history_by_user(&snapshots, normalized);
        Ok(Json(WorkloadHistoryResult { normalized, users }))
    }

    #[prompt(
        name = "workload-check",
        description = "Review an athlete's recent throwing workload and acute:chronic ratio"
    )]
    async fn workload_check(&self, params: Parameters<WorkloadCheckParams>) -> GetPromptResult {
        let days_back = params.0.days_back.unwrap_or(DEFAULT_LOOKBACK_DAYS);
        prompts::workload_check_prompt(params.0.user_id.as_deref(), days_back)
    }
}

#[tool_handler]
#[prompt_handler(router = self.prompt_router)]
impl rmcp::ServerHandler for PulseMcpHandler {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo::new(
            rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .build(),
        )
        .with_instructions(
            "Pulse throwing workload MCP server - provides tools for throw events, \
             daily snapshots, workload sums and acute:chronic workload monitoring.",
        )
    }
}
