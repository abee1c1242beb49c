// src/services/mfapi.rs
use chrono::NaiveDate;
use log::{info, warn};
use reqwest::Client;
use serde::Deserialize;
use std::error::Error as StdError;
use std::time::Duration;

use crate::config::{MF_DETAIL_URL, MF_LIST_URL, REQUEST_TIMEOUT_SECS, USER_AGENT};
use crate::models::{PricePoint, SchemeInfo, SchemeMeta};

pub type Result<T> = std::result::Result<T, Box<dyn StdError + Send + Sync>>;

#[derive(Debug, Deserialize)]
struct SchemeDetailResponse {
    #[serde(default)]
    meta: Option<SchemeMeta>,
    #[serde(default)]
    data: Vec<RawNavEntry>,
}

#[derive(Debug, Deserialize)]
struct RawNavEntry {
    date: String,
    nav: String,
}

fn client() -> Result<Client> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()?;
    Ok(client)
}

/// Fetch the full scheme catalog (schemeCode & schemeName).
pub async fn fetch_scheme_list() -> Result<Vec<SchemeInfo>> {
    info!("Fetching full scheme catalog from {}", MF_LIST_URL);
    let schemes: Vec<SchemeInfo> = client()?
        .get(MF_LIST_URL)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    if schemes.is_empty() {
        return Err("Scheme catalog came back empty".into());
    }
    info!("Catalog holds {} schemes", schemes.len());
    Ok(schemes)
}

/// Fetch a scheme's full NAV history, oldest first.
pub async fn fetch_nav_history(scheme_code: u32) -> Result<(SchemeMeta, Vec<PricePoint>)> {
    let url = format!("{}/{}", MF_DETAIL_URL, scheme_code);
    info!("Fetching NAV history from {}", url);
    let detail: SchemeDetailResponse = client()?
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let points = parse_nav_entries(&detail.data);
    if points.is_empty() {
        return Err(format!("No NAV data for scheme {}", scheme_code).into());
    }
    Ok((detail.meta.unwrap_or_default(), points))
}

/// mfapi serves NAVs newest-first as strings ("DD-MM-YYYY", "81.2345").
/// Rows that fail to parse are dropped; the rest come back sorted
/// ascending with duplicate dates removed.
fn parse_nav_entries(entries: &[RawNavEntry]) -> Vec<PricePoint> {
    let mut points: Vec<PricePoint> = entries
        .iter()
        .filter_map(|e| {
            let date = NaiveDate::parse_from_str(e.date.trim(), "%d-%m-%Y").ok();
            let value = e.nav.trim().parse::<f64>().ok();
            match (date, value) {
                (Some(date), Some(value)) => Some(PricePoint { date, value }),
                _ => {
                    warn!("Skipping malformed NAV row: date='{}' nav='{}'", e.date, e.nav);
                    None
                }
            }
        })
        .collect();
    points.sort_by_key(|p| p.date);
    points.dedup_by_key(|p| p.date);
    points
}

/// Points falling inside the inclusive lookback window.
pub fn points_in_window(points: &[PricePoint], start: NaiveDate, end: NaiveDate) -> Vec<PricePoint> {
    points
        .iter()
        .copied()
        .filter(|p| p.date >= start && p.date <= end)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(date: &str, nav: &str) -> RawNavEntry {
        RawNavEntry {
            date: date.to_string(),
            nav: nav.to_string(),
        }
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn parses_and_sorts_ascending() {
        let raw = vec![
            entry("03-01-2025", "102.50"),
            entry("02-01-2025", "101.00"),
            entry("01-01-2025", "100.00"),
        ];
        let points = parse_nav_entries(&raw);
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].date, d("2025-01-01"));
        assert_eq!(points[2].date, d("2025-01-03"));
        assert!((points[2].value - 102.50).abs() < 1e-12);
    }

    #[test]
    fn coerces_malformed_rows() {
        let raw = vec![
            entry("01-01-2025", "100.00"),
            entry("not-a-date", "101.00"),
            entry("02-01-2025", "N.A."),
            entry("03-01-2025", "102.00"),
        ];
        let points = parse_nav_entries(&raw);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, d("2025-01-01"));
        assert_eq!(points[1].date, d("2025-01-03"));
    }

    #[test]
    fn drops_duplicate_dates() {
        let raw = vec![
            entry("01-01-2025", "100.00"),
            entry("01-01-2025", "100.00"),
        ];
        assert_eq!(parse_nav_entries(&raw).len(), 1);
    }

    #[test]
    fn window_filter_is_inclusive() {
        let points = vec![
            PricePoint { date: d("2025-01-01"), value: 1.0 },
            PricePoint { date: d("2025-01-02"), value: 2.0 },
            PricePoint { date: d("2025-01-03"), value: 3.0 },
        ];
        let kept = points_in_window(&points, d("2025-01-02"), d("2025-01-03"));
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].date, d("2025-01-02"));
    }
}
