// src/config.rs
use chrono::{Duration, NaiveDate, Utc};
use chrono_tz::Asia::Kolkata;
use log::warn;
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::BoxError;

pub const MF_LIST_URL: &str = "https://api.mfapi.in/mf";
pub const MF_DETAIL_URL: &str = "https://api.mfapi.in/mf"; // + /{scheme_code}
pub const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
pub const DEFAULT_BENCHMARK_TICKER: &str = "^NSEI";

pub const REQUEST_TIMEOUT_SECS: u64 = 20;
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Minimum Jaro-Winkler similarity for a catalog match. Design parameter,
/// not a derived constant.
pub const MIN_MATCH_SCORE: f64 = 0.75;

// Behavior classification thresholds. Design parameters, not derived
// constants.
pub const WITH_MARKET_MIN_CORR: f64 = 0.6;
pub const WITH_MARKET_MIN_PCT: f64 = 60.0;
pub const AGAINST_MARKET_MAX_CORR: f64 = -0.3;

// Market-tolerance capture-ratio bands. Placeholder values pending domain
// confirmation.
pub const CAPTURE_TIGHT_BAND: f64 = 20.0;
pub const CAPTURE_DIVERGENCE_BAND: f64 = 50.0;

const DEFAULT_LOOKBACK_DAYS: i64 = 30;

/// Fallback queries when no QUERIES_FILE is configured.
const DEFAULT_QUERIES: &[&str] = &[
    "Parag Parikh ELSS Tax Saver Fund - Direct Growth",
    "Mirae Asset ELSS Tax Saver - Direct plan - Growth",
    "Canara Robeco ELSS Tax Saver - Direct plan - Growth Option",
    "Motilal Oswal Small Cap Fund - Direct - Growth",
    "Axis Small Cap Fund - Direct plan - Growth",
    "Kotak Nifty Next 50 Index  - Direct Plan - Growth Option",
    "DSP Natural Resources and New Energy Fund - Direct plan - Growth",
    "PGIM India Flexi Cap - Direct plan - Growth Option",
    "ICICI Prudential Nifty Smallcap 250 Index - Direct plan - Growth",
    "SBI MNC Fund - Direct plan - Growth",
];

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub queries: Vec<String>,
    pub lookback_days: i64,
    pub benchmark_ticker: String,
    pub output_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, BoxError> {
        let lookback_days = match env::var("LOOKBACK_DAYS") {
            Ok(raw) => raw
                .parse::<i64>()
                .map_err(|e| format!("LOOKBACK_DAYS must be a number: {}", e))?,
            Err(_) => {
                warn!("$LOOKBACK_DAYS not set, defaulting to {}", DEFAULT_LOOKBACK_DAYS);
                DEFAULT_LOOKBACK_DAYS
            }
        };
        if lookback_days < 1 {
            return Err("LOOKBACK_DAYS must be at least 1".into());
        }

        let benchmark_ticker = env::var("BENCHMARK_TICKER").unwrap_or_else(|_| {
            DEFAULT_BENCHMARK_TICKER.to_string()
        });

        let output_dir = env::var("OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        let queries = match env::var("QUERIES_FILE") {
            Ok(path) => load_queries_file(&path)?,
            Err(_) => {
                warn!("$QUERIES_FILE not set, using the built-in query list");
                DEFAULT_QUERIES.iter().map(|q| q.to_string()).collect()
            }
        };
        if queries.is_empty() {
            return Err("No fund queries configured".into());
        }

        Ok(AppConfig {
            queries,
            lookback_days,
            benchmark_ticker,
            output_dir,
        })
    }

    /// Lookback window as IST calendar dates: NAVs are published against
    /// the Indian trading day, so "today" is taken in Asia/Kolkata.
    pub fn window(&self) -> (NaiveDate, NaiveDate) {
        let end = Utc::now().with_timezone(&Kolkata).date_naive();
        let start = end - Duration::days(self.lookback_days);
        (start, end)
    }
}

/// One query per line; blank lines and `#` comments are skipped.
fn load_queries_file(path: &str) -> Result<Vec<String>, BoxError> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Cannot read queries file '{}': {}", path, e))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_spans_lookback_days() {
        let config = AppConfig {
            queries: vec!["x".to_string()],
            lookback_days: 30,
            benchmark_ticker: DEFAULT_BENCHMARK_TICKER.to_string(),
            output_dir: PathBuf::from("."),
        };
        let (start, end) = config.window();
        assert_eq!(end - start, Duration::days(30));
    }

    #[test]
    fn queries_file_skips_blanks_and_comments() {
        let dir = std::env::temp_dir();
        let path = dir.join("mf_vs_nifty_queries_test.txt");
        fs::write(&path, "# funds under watch\nAxis Small Cap\n\n  Parag Parikh Flexi Cap  \n").unwrap();
        let queries = load_queries_file(path.to_str().unwrap()).unwrap();
        assert_eq!(queries, vec!["Axis Small Cap", "Parag Parikh Flexi Cap"]);
        fs::remove_file(&path).ok();
    }
}
