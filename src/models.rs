// src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry of the mfapi scheme catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemeInfo {
    #[serde(rename = "schemeCode")]
    pub scheme_code: u32,
    #[serde(rename = "schemeName")]
    pub scheme_name: String,
}

/// Best catalog entry for a user query, with its similarity score.
#[derive(Debug, Clone)]
pub struct SchemeMatch {
    pub scheme: SchemeInfo,
    pub score: f64,
}

/// Scheme metadata from the NAV-history endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemeMeta {
    #[serde(default)]
    pub fund_house: String,
}

/// A single dated observation: a fund NAV or a benchmark close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Change of a series versus its previous available point.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DailyChange {
    pub date: NaiveDate,
    pub start: f64,
    pub end: f64,
    pub pct_change: f64,
}

/// Fund and benchmark changes joined on a shared date.
/// `nav` is the day's published NAV and equals `fund_end`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DailyRow {
    pub date: NaiveDate,
    pub nav: f64,
    pub fund_start: f64,
    pub fund_end: f64,
    pub fund_pct_change: f64,
    pub nifty_start: f64,
    pub nifty_end: f64,
    pub nifty_pct_change: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Behavior {
    WithMarket,
    AgainstMarket,
    LowCorr,
    InsufficientData,
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            Behavior::WithMarket => "With Market",
            Behavior::AgainstMarket => "Against Market",
            Behavior::LowCorr => "Low Corr",
            Behavior::InsufficientData => "Insufficient Data",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarketTolerance {
    High,
    Medium,
    Low,
    Unknown,
}

impl fmt::Display for MarketTolerance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            MarketTolerance::High => "High",
            MarketTolerance::Medium => "Medium",
            MarketTolerance::Low => "Low",
            MarketTolerance::Unknown => "Unknown",
        };
        write!(f, "{}", label)
    }
}

/// Aggregated statistics over a fund's aligned daily rows.
/// Statistical fields are `None` when undefined (fewer than 2 aligned
/// days, or no qualifying up/down days for the capture ratios).
#[derive(Debug, Clone, Serialize)]
pub struct FundMetrics {
    pub data_points: usize,
    pub correlation: Option<f64>,
    pub with_market_pct: Option<f64>,
    pub avg_fund_return: Option<f64>,
    pub avg_nifty_return: Option<f64>,
    pub up_capture_pct: Option<f64>,
    pub down_capture_pct: Option<f64>,
    pub behavior: Behavior,
    pub market_tolerance: MarketTolerance,
}

/// One Summary-sheet row per user query. Degraded rows (unresolved query,
/// failed or empty NAV fetch) carry `None` in every field the failure made
/// unavailable; the run keeps going.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow {
    pub query: String,
    pub matched_name: Option<String>,
    pub scheme_code: Option<u32>,
    pub fund_house: Option<String>,
    pub data_points: usize,
    pub correlation: Option<f64>,
    pub with_market_pct: Option<f64>,
    pub avg_fund_return: Option<f64>,
    pub avg_nifty_return: Option<f64>,
    pub up_capture_pct: Option<f64>,
    pub down_capture_pct: Option<f64>,
    pub behavior: Option<Behavior>,
    pub market_tolerance: Option<MarketTolerance>,
    pub nifty_start: Option<f64>,
    pub nifty_end: Option<f64>,
    pub nifty_pct_change: Option<f64>,
}

impl SummaryRow {
    /// Row for a query that matched nothing in the catalog.
    pub fn unresolved(query: &str) -> Self {
        SummaryRow {
            query: query.to_string(),
            matched_name: None,
            scheme_code: None,
            fund_house: None,
            data_points: 0,
            correlation: None,
            with_market_pct: None,
            avg_fund_return: None,
            avg_nifty_return: None,
            up_capture_pct: None,
            down_capture_pct: None,
            behavior: None,
            market_tolerance: None,
            nifty_start: None,
            nifty_end: None,
            nifty_pct_change: None,
        }
    }

    /// Row for a matched scheme whose NAV data could not be used.
    pub fn matched_without_data(query: &str, scheme: &SchemeInfo) -> Self {
        SummaryRow {
            matched_name: Some(scheme.scheme_name.clone()),
            scheme_code: Some(scheme.scheme_code),
            ..SummaryRow::unresolved(query)
        }
    }
}

/// Detail sheet payload for one resolved fund.
#[derive(Debug, Clone)]
pub struct FundSheet {
    pub scheme_code: u32,
    pub scheme_name: String,
    pub rows: Vec<DailyRow>,
}
