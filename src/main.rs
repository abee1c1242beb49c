use dotenv::dotenv;
use env_logger;
use log::{error, info};

use mf_vs_nifty::config::AppConfig;
use mf_vs_nifty::pipeline;

#[tokio::main]
async fn main() {
    dotenv().ok();

    // Initialize the logger
    env_logger::init();
    info!("Logger initialized. Starting the application...");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        "Using {} queries, {}-day lookback, benchmark {}",
        config.queries.len(),
        config.lookback_days,
        config.benchmark_ticker
    );

    match pipeline::run(&config).await {
        Ok(path) => info!("Done. Excel saved to: {}", path.display()),
        Err(e) => {
            error!("Run failed: {}", e);
            std::process::exit(1);
        }
    }
}
