// src/bin/test_lookup.rs
use mf_vs_nifty::config::AppConfig;
use mf_vs_nifty::services::matching::find_best_scheme;
use mf_vs_nifty::services::mfapi::fetch_scheme_list;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env()?;
    let catalog = fetch_scheme_list().await?;
    println!("Catalog holds {} schemes\n", catalog.len());

    for query in &config.queries {
        match find_best_scheme(&catalog, query) {
            Some(m) => println!(
                "{:<60} -> [{}] {} (score={:.3})",
                query, m.scheme.scheme_code, m.scheme.scheme_name, m.score
            ),
            None => println!("{:<60} -> NO MATCH", query),
        }
    }
    Ok(())
}
