use pulse_throw_client::{
    DateRange, PulseClient, config::Config, filters, http_client::ReqwestPulseClient, workload,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example: expects PULSE_CLIENT_ID, PULSE_CLIENT_SECRET and PULSE_REFRESH_TOKEN in env
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            return Ok(());
        }
    };
    let client = ReqwestPulseClient::from_config(&cfg);
    client.authenticate().await?;
    println!("{client}");

    let owner = client.user_id().unwrap_or_default();
    let events = client.get_events(DateRange::recent(), &[]).await?;
    let throws = events.get(&owner).map(Vec::as_slice).unwrap_or_default();
    let real = filters::filter_simulated(throws, false);
    println!(
        "throws: {} (high effort: {}), workload: {:.2}",
        real.len(),
        filters::filter_high_effort(&real, true).len(),
        workload::sum_workload(&real, true)
    );
    Ok(())
}
