use std::sync::Arc;

use pulse_throw_client::config::Config;
use pulse_throw_client::http_client::ReqwestPulseClient;
use pulse_throw_mcp::{PulseMcpHandler, telemetry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Configure logging from env var `PULSE_LOG_LEVEL` (or fallback to `RUST_LOG`, default `info`).
    let log_env = telemetry::log_level_with(|k| std::env::var(k).ok());
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(telemetry::env_filter(&log_env))
        .init();
    tracing::info!("pulse_throw_mcp: log filter: {}", log_env);

    let metrics = telemetry::install_metrics_recorder()?;

    let config = Config::from_env()?;
    let client = ReqwestPulseClient::from_config(&config);
    client.authenticate().await?;
    tracing::info!("pulse_throw_mcp: authenticated as {}", client);

    let handler = PulseMcpHandler::new(Arc::new(client));
    tracing::info!(
        "pulse_throw_mcp: registered {} tools and {} prompts",
        handler.tool_count(),
        handler.prompt_count()
    );

    // Serve over stdio so the binary is usable directly from MCP clients
    tracing::info!("pulse_throw_mcp: starting stdio MCP server...");
    let transport = (tokio::io::stdin(), tokio::io::stdout());
    let server = rmcp::serve_server(handler, transport).await?;

    tracing::info!("pulse_throw_mcp: service initialized as server");

    server.waiting().await?;
    tracing::info!(metrics = %metrics.render(), "pulse_throw_mcp: stopped");

    Ok(())
}
