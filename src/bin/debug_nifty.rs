// src/bin/debug_nifty.rs
use mf_vs_nifty::config::AppConfig;
use mf_vs_nifty::services::calculations::daily_changes;
use mf_vs_nifty::services::nifty::fetch_nifty_history;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env()?;
    let (start, end) = config.window();
    println!(
        "Fetching {} closes from {} to {}",
        config.benchmark_ticker, start, end
    );

    let points = fetch_nifty_history(&config.benchmark_ticker, start, end).await?;
    for p in &points {
        println!("{}  close={:.2}", p.date, p.value);
    }

    println!("\nDaily changes:");
    for c in daily_changes(&points) {
        println!("{}  {:.2} -> {:.2}  ({:+.3}%)", c.date, c.start, c.end, c.pct_change);
    }
    Ok(())
}
