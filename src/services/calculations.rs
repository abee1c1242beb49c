// src/services/calculations.rs
use anyhow::Result;
use std::collections::BTreeMap;

use crate::config::{
    AGAINST_MARKET_MAX_CORR, CAPTURE_DIVERGENCE_BAND, CAPTURE_TIGHT_BAND, WITH_MARKET_MIN_CORR,
    WITH_MARKET_MIN_PCT,
};
use crate::models::{Behavior, DailyChange, DailyRow, FundMetrics, MarketTolerance, PricePoint};

/// Change of each point versus the previous available point in the same
/// series. The first point has no predecessor and produces no change;
/// a zero start value is skipped rather than divided by.
pub fn daily_changes(series: &[PricePoint]) -> Vec<DailyChange> {
    series
        .windows(2)
        .filter(|w| w[0].value != 0.0)
        .map(|w| DailyChange {
            date: w[1].date,
            start: w[0].value,
            end: w[1].value,
            pct_change: (w[1].value - w[0].value) / w[0].value * 100.0,
        })
        .collect()
}

/// Inner join of fund and benchmark change sequences on date. Output dates
/// are exactly the intersection of the two inputs' dates, ascending.
pub fn align_daily(fund: &[DailyChange], nifty: &[DailyChange]) -> Vec<DailyRow> {
    let by_date: BTreeMap<_, _> = nifty.iter().map(|c| (c.date, c)).collect();
    fund.iter()
        .filter_map(|f| {
            by_date.get(&f.date).map(|n| DailyRow {
                date: f.date,
                nav: f.end,
                fund_start: f.start,
                fund_end: f.end,
                fund_pct_change: f.pct_change,
                nifty_start: n.start,
                nifty_end: n.end,
                nifty_pct_change: n.pct_change,
            })
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn sign(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

/// Pearson correlation coefficient. `None` under 2 points or when either
/// series has no variance.
pub fn pearson_correlation(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let n_f = n as f64;
    let sum_x: f64 = xs[..n].iter().sum();
    let sum_y: f64 = ys[..n].iter().sum();
    let sum_xy: f64 = xs[..n].iter().zip(&ys[..n]).map(|(x, y)| x * y).sum();
    let sum_x2: f64 = xs[..n].iter().map(|x| x * x).sum();
    let sum_y2: f64 = ys[..n].iter().map(|y| y * y).sum();

    let denom = ((n_f * sum_x2 - sum_x * sum_x) * (n_f * sum_y2 - sum_y * sum_y)).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    Some((n_f * sum_xy - sum_x * sum_y) / denom)
}

/// Capture ratio: mean fund change over mean benchmark change on the
/// qualifying days, as a percentage.
fn capture_ratio(fund: &[f64], nifty: &[f64]) -> Option<f64> {
    if fund.is_empty() || nifty.is_empty() {
        return None;
    }
    let nifty_mean = mean(nifty);
    if nifty_mean == 0.0 {
        return None;
    }
    Some(mean(fund) / nifty_mean * 100.0)
}

fn classify_behavior(correlation: Option<f64>, with_market_pct: Option<f64>) -> Behavior {
    let Some(corr) = correlation else {
        return Behavior::InsufficientData;
    };
    let with_pct = with_market_pct.unwrap_or(0.0);
    if corr >= WITH_MARKET_MIN_CORR && with_pct >= WITH_MARKET_MIN_PCT {
        Behavior::WithMarket
    } else if corr <= AGAINST_MARKET_MAX_CORR {
        Behavior::AgainstMarket
    } else {
        Behavior::LowCorr
    }
}

/// Coarse three-bucket read of how tightly the fund tracks the index:
/// both capture ratios near 100 and close together reads High, either one
/// far from 100 reads Low.
fn classify_tolerance(up_capture: Option<f64>, down_capture: Option<f64>) -> MarketTolerance {
    let (Some(up), Some(down)) = (up_capture, down_capture) else {
        return MarketTolerance::Unknown;
    };
    let up_dev = (up - 100.0).abs();
    let down_dev = (down - 100.0).abs();
    let spread = (up - down).abs();
    if up_dev <= CAPTURE_TIGHT_BAND && down_dev <= CAPTURE_TIGHT_BAND && spread <= CAPTURE_TIGHT_BAND
    {
        MarketTolerance::High
    } else if up_dev >= CAPTURE_DIVERGENCE_BAND || down_dev >= CAPTURE_DIVERGENCE_BAND {
        MarketTolerance::Low
    } else {
        MarketTolerance::Medium
    }
}

/// Reduce the aligned daily rows to summary statistics. Pure and
/// deterministic: the same rows always produce the same metrics.
pub fn compute_fund_metrics(rows: &[DailyRow]) -> Result<FundMetrics> {
    let fund: Vec<f64> = rows.iter().map(|r| r.fund_pct_change).collect();
    let nifty: Vec<f64> = rows.iter().map(|r| r.nifty_pct_change).collect();

    let correlation = pearson_correlation(&fund, &nifty);

    let with_market_pct = if rows.is_empty() {
        None
    } else {
        let agreeing = rows
            .iter()
            .filter(|r| sign(r.fund_pct_change) == sign(r.nifty_pct_change))
            .count();
        Some(agreeing as f64 / rows.len() as f64 * 100.0)
    };

    let (avg_fund_return, avg_nifty_return) = if rows.is_empty() {
        (None, None)
    } else {
        (Some(mean(&fund)), Some(mean(&nifty)))
    };

    let up_fund: Vec<f64> = rows
        .iter()
        .filter(|r| r.nifty_pct_change > 0.0)
        .map(|r| r.fund_pct_change)
        .collect();
    let up_nifty: Vec<f64> = rows
        .iter()
        .filter(|r| r.nifty_pct_change > 0.0)
        .map(|r| r.nifty_pct_change)
        .collect();
    let down_fund: Vec<f64> = rows
        .iter()
        .filter(|r| r.nifty_pct_change < 0.0)
        .map(|r| r.fund_pct_change)
        .collect();
    let down_nifty: Vec<f64> = rows
        .iter()
        .filter(|r| r.nifty_pct_change < 0.0)
        .map(|r| r.nifty_pct_change)
        .collect();

    let up_capture_pct = capture_ratio(&up_fund, &up_nifty);
    let down_capture_pct = capture_ratio(&down_fund, &down_nifty);

    Ok(FundMetrics {
        data_points: rows.len(),
        correlation,
        with_market_pct,
        avg_fund_return,
        avg_nifty_return,
        up_capture_pct,
        down_capture_pct,
        behavior: classify_behavior(correlation, with_market_pct),
        market_tolerance: classify_tolerance(up_capture_pct, down_capture_pct),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    fn point(day: u32, value: f64) -> PricePoint {
        PricePoint { date: d(day), value }
    }

    fn row(date: NaiveDate, fund_pct: f64, nifty_pct: f64) -> DailyRow {
        DailyRow {
            date,
            nav: 100.0,
            fund_start: 100.0,
            fund_end: 100.0 + fund_pct,
            fund_pct_change: fund_pct,
            nifty_start: 18000.0,
            nifty_end: 18000.0 * (1.0 + nifty_pct / 100.0),
            nifty_pct_change: nifty_pct,
        }
    }

    fn aligned(fund: &[PricePoint], nifty: &[PricePoint]) -> Vec<DailyRow> {
        align_daily(&daily_changes(fund), &daily_changes(nifty))
    }

    #[test]
    fn daily_changes_walk_consecutive_points() {
        let changes = daily_changes(&[point(1, 100.0), point(2, 102.0), point(3, 101.0)]);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].date, d(2));
        assert!((changes[0].start - 100.0).abs() < 1e-12);
        assert!((changes[0].end - 102.0).abs() < 1e-12);
        assert!((changes[0].pct_change - 2.0).abs() < 1e-9);
        assert!((changes[1].pct_change - (-0.980392156862745)).abs() < 1e-9);
    }

    #[test]
    fn daily_changes_skip_zero_start() {
        let changes = daily_changes(&[point(1, 0.0), point(2, 102.0), point(3, 101.0)]);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].date, d(3));
    }

    #[test]
    fn alignment_is_exactly_the_date_intersection() {
        // fund trades on 2,3,4; nifty on 2,4,5 → change dates share only day 4
        let fund = [point(2, 100.0), point(3, 101.0), point(4, 102.0)];
        let nifty = [point(2, 18000.0), point(4, 18100.0), point(5, 18200.0)];
        let rows = aligned(&fund, &nifty);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, d(4));
    }

    #[test]
    fn worked_scenario_two_aligned_days() {
        let fund = [point(1, 100.0), point(2, 102.0), point(3, 101.0)];
        let nifty = [point(1, 18000.0), point(2, 18200.0), point(3, 18100.0)];
        let rows = aligned(&fund, &nifty);
        assert_eq!(rows.len(), 2);
        assert!((rows[0].fund_pct_change - 2.0).abs() < 1e-9);
        assert!((rows[0].nifty_pct_change - 1.1111111111).abs() < 1e-6);
        assert!((rows[1].fund_pct_change - (-0.9803921569)).abs() < 1e-6);
        assert!((rows[1].nifty_pct_change - (-0.5494505495)).abs() < 1e-6);

        let metrics = compute_fund_metrics(&rows).unwrap();
        assert_eq!(metrics.data_points, 2);
        assert!((metrics.with_market_pct.unwrap() - 100.0).abs() < 1e-9);
        assert!(metrics.correlation.unwrap() > 0.0);
    }

    #[test]
    fn correlation_is_symmetric_and_bounded() {
        let xs = [2.0, -0.98, 0.5, -1.2, 0.7];
        let ys = [1.11, -0.55, 0.2, -0.9, 1.4];
        let a = pearson_correlation(&xs, &ys).unwrap();
        let b = pearson_correlation(&ys, &xs).unwrap();
        assert!((a - b).abs() < 1e-12);
        assert!((-1.0..=1.0).contains(&a));
    }

    #[test]
    fn correlation_undefined_under_two_points() {
        assert!(pearson_correlation(&[1.0], &[2.0]).is_none());
        assert!(pearson_correlation(&[], &[]).is_none());
    }

    #[test]
    fn correlation_undefined_without_variance() {
        assert!(pearson_correlation(&[1.0, 1.0, 1.0], &[0.5, 0.7, 0.2]).is_none());
    }

    #[test]
    fn metrics_are_null_with_fewer_than_two_rows() {
        let metrics = compute_fund_metrics(&[]).unwrap();
        assert_eq!(metrics.data_points, 0);
        assert!(metrics.correlation.is_none());
        assert!(metrics.with_market_pct.is_none());
        assert!(metrics.avg_fund_return.is_none());
        assert!(metrics.up_capture_pct.is_none());
        assert_eq!(metrics.behavior, Behavior::InsufficientData);
        assert_eq!(metrics.market_tolerance, MarketTolerance::Unknown);

        let one = aligned(
            &[point(1, 100.0), point(2, 101.0)],
            &[point(1, 18000.0), point(2, 18100.0)],
        );
        assert_eq!(one.len(), 1);
        let metrics = compute_fund_metrics(&one).unwrap();
        assert!(metrics.correlation.is_none());
        assert_eq!(metrics.behavior, Behavior::InsufficientData);
    }

    #[test]
    fn with_market_pct_stays_within_bounds() {
        let fund = [point(1, 100.0), point(2, 101.0), point(3, 100.0), point(4, 102.0)];
        let nifty = [point(1, 18000.0), point(2, 17900.0), point(3, 18100.0), point(4, 18300.0)];
        let rows = aligned(&fund, &nifty);
        let pct = compute_fund_metrics(&rows).unwrap().with_market_pct.unwrap();
        assert!((0.0..=100.0).contains(&pct));
    }

    #[test]
    fn aggregation_is_idempotent() {
        let fund = [point(1, 100.0), point(2, 102.0), point(3, 101.0), point(4, 103.0)];
        let nifty = [point(1, 18000.0), point(2, 18200.0), point(3, 18100.0), point(4, 18350.0)];
        let rows = aligned(&fund, &nifty);
        let first = compute_fund_metrics(&rows).unwrap();
        let second = compute_fund_metrics(&rows).unwrap();
        assert_eq!(first.correlation, second.correlation);
        assert_eq!(first.with_market_pct, second.with_market_pct);
        assert_eq!(first.up_capture_pct, second.up_capture_pct);
        assert_eq!(first.down_capture_pct, second.down_capture_pct);
        assert_eq!(first.behavior, second.behavior);
        assert_eq!(first.market_tolerance, second.market_tolerance);
    }

    #[test]
    fn capture_ratios_follow_the_benchmark_split() {
        // up days: fund +1.0 vs nifty +2.0 → 50%; down days likewise
        let rows = vec![
            row(d(2), 1.0, 2.0),
            row(d(3), -1.0, -2.0),
            row(d(4), 1.0, 2.0),
        ];
        let metrics = compute_fund_metrics(&rows).unwrap();
        assert!((metrics.up_capture_pct.unwrap() - 50.0).abs() < 1e-9);
        assert!((metrics.down_capture_pct.unwrap() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn capture_undefined_without_qualifying_days() {
        // benchmark never falls → down capture undefined
        let rows = vec![row(d(2), 1.0, 2.0), row(d(3), 0.5, 1.0)];
        let metrics = compute_fund_metrics(&rows).unwrap();
        assert!(metrics.up_capture_pct.is_some());
        assert!(metrics.down_capture_pct.is_none());
        assert_eq!(metrics.market_tolerance, MarketTolerance::Unknown);
    }

    #[test]
    fn behavior_classification_thresholds() {
        assert_eq!(classify_behavior(Some(0.8), Some(90.0)), Behavior::WithMarket);
        // high correlation but weak directional agreement is not With Market
        assert_eq!(classify_behavior(Some(0.8), Some(40.0)), Behavior::LowCorr);
        assert_eq!(classify_behavior(Some(-0.5), Some(20.0)), Behavior::AgainstMarket);
        assert_eq!(classify_behavior(Some(0.1), Some(55.0)), Behavior::LowCorr);
        assert_eq!(classify_behavior(None, None), Behavior::InsufficientData);
    }

    #[test]
    fn tolerance_classification_bands() {
        assert_eq!(classify_tolerance(Some(102.0), Some(95.0)), MarketTolerance::High);
        assert_eq!(classify_tolerance(Some(170.0), Some(95.0)), MarketTolerance::Low);
        assert_eq!(classify_tolerance(Some(35.0), Some(90.0)), MarketTolerance::Low);
        assert_eq!(classify_tolerance(Some(125.0), Some(95.0)), MarketTolerance::Medium);
        assert_eq!(classify_tolerance(None, Some(95.0)), MarketTolerance::Unknown);
    }
}
