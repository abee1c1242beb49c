// src/services/nifty.rs
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Asia::Kolkata;
use log::{info, warn};
use reqwest::Client;
use serde::Deserialize;
use std::error::Error as StdError;
use std::time::Duration;

use crate::config::{REQUEST_TIMEOUT_SECS, USER_AGENT, YAHOO_CHART_URL};
use crate::models::PricePoint;

pub type Result<T> = std::result::Result<T, Box<dyn StdError + Send + Sync>>;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Option<Vec<Option<f64>>>,
}

/// Fetch the benchmark's daily close series for the window, oldest first.
/// An error payload or an empty series is a hard error: every comparison
/// in the run depends on this data.
pub async fn fetch_nifty_history(
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<PricePoint>> {
    let period1 = ist_midnight_epoch(start)?;
    let period2 = ist_midnight_epoch(end.succ_opt().ok_or("Window end date out of range")?)?;
    let url = format!(
        "{}/{}?period1={}&period2={}&interval=1d",
        YAHOO_CHART_URL,
        urlencode_ticker(ticker),
        period1,
        period2
    );
    info!("Fetching benchmark ({}) from {}", ticker, url);

    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()?;
    let response: ChartResponse = client
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let points = points_from_chart(response)?;
    info!("Benchmark series holds {} trading days", points.len());
    Ok(points)
}

/// Epoch seconds of midnight IST on the given date. The exchange trades on
/// the Indian calendar, so window bounds are anchored there.
fn ist_midnight_epoch(date: NaiveDate) -> Result<i64> {
    let midnight = date.and_time(NaiveTime::MIN);
    let stamped = Kolkata
        .from_local_datetime(&midnight)
        .single()
        .ok_or_else(|| format!("Cannot anchor {} to IST", date))?;
    Ok(stamped.timestamp())
}

fn urlencode_ticker(ticker: &str) -> String {
    // only '^' occurs in index tickers
    ticker.replace('^', "%5E")
}

fn points_from_chart(response: ChartResponse) -> Result<Vec<PricePoint>> {
    if let Some(err) = response.chart.error {
        if !err.is_null() {
            return Err(format!("Benchmark provider returned an error: {}", err).into());
        }
    }
    let result = response
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
        .ok_or("Benchmark response carries no result")?;

    let timestamps = result.timestamp.unwrap_or_default();
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .and_then(|q| q.close)
        .unwrap_or_default();

    let mut points = Vec::with_capacity(timestamps.len());
    for (ts, close) in timestamps.iter().zip(closes.iter()) {
        let Some(close) = close else {
            // holidays and half-sessions surface as null closes
            continue;
        };
        match DateTime::from_timestamp(*ts, 0) {
            Some(utc) => points.push(PricePoint {
                date: utc.with_timezone(&Kolkata).date_naive(),
                value: *close,
            }),
            None => warn!("Skipping out-of-range benchmark timestamp {}", ts),
        }
    }
    points.sort_by_key(|p| p.date);
    points.dedup_by_key(|p| p.date);

    if points.is_empty() {
        return Err("Benchmark series came back empty for the requested window".into());
    }
    Ok(points)
}
