use chrono::{Days, Utc};
use pulse_throw_client::{DateRange, PulseClient, config::Config, http_client::ReqwestPulseClient, workload};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::from_env()?;
    let client = ReqwestPulseClient::from_config(&cfg);
    client.authenticate().await?;

    // Chronic workload looks back 28 days; fetch a little more than that.
    let today = Utc::now().date_naive();
    let range = DateRange::new(today.checked_sub_days(Days::new(35)), Some(today));
    let snapshots = client.get_snapshots(range, &[]).await?;

    for (user, days) in &snapshots {
        println!("{user}");
        for m in workload::workload_history(days, true) {
            let ratio = m
                .ratio
                .map(|r| format!("{r:.2}"))
                .unwrap_or_else(|| "-".into());
            println!("  {}  acute {:>7.2}  chronic {:>7.2}  acr {}", m.date, m.acute, m.chronic, ratio);
        }
    }
    Ok(())
}
