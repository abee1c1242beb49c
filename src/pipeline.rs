// src/pipeline.rs
use chrono::Utc;
use chrono_tz::Asia::Kolkata;
use log::{info, warn};
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::models::{FundSheet, SummaryRow};
use crate::services::{calculations, excel, matching, mfapi, nifty};
use crate::BoxError;

/// Run the whole comparison: catalog once, benchmark once, then one
/// resolve → fetch → align → aggregate pass per query, and the workbook
/// at the end. Per-query failures degrade to partial summary rows; a
/// failed catalog or benchmark fetch aborts before anything is written.
pub async fn run(config: &AppConfig) -> Result<PathBuf, BoxError> {
    let catalog = mfapi::fetch_scheme_list().await?;

    let (start, end) = config.window();
    info!(
        "Comparing {} queries against {} from {} to {}",
        config.queries.len(),
        config.benchmark_ticker,
        start,
        end
    );

    let nifty_points = nifty::fetch_nifty_history(&config.benchmark_ticker, start, end).await?;
    let nifty_changes = calculations::daily_changes(&nifty_points);

    // window-level benchmark movement, repeated on every summary row
    let bench_start = nifty_points.first().map(|p| p.value);
    let bench_end = nifty_points.last().map(|p| p.value);
    let bench_pct = match (bench_start, bench_end) {
        (Some(s), Some(e)) if s != 0.0 => Some((e - s) / s * 100.0),
        _ => None,
    };

    let mut summary_rows: Vec<SummaryRow> = Vec::with_capacity(config.queries.len());
    let mut fund_sheets: Vec<FundSheet> = Vec::new();

    for query in &config.queries {
        info!("Processing query: '{}'", query);

        let Some(matched) = matching::find_best_scheme(&catalog, query) else {
            warn!("No catalog match for '{}'; recording an unresolved row", query);
            summary_rows.push(SummaryRow::unresolved(query));
            continue;
        };
        info!(
            "Best match: '{}' (schemeCode={}), score={:.3}",
            matched.scheme.scheme_name, matched.scheme.scheme_code, matched.score
        );

        let (meta, nav_points) = match mfapi::fetch_nav_history(matched.scheme.scheme_code).await {
            Ok(detail) => detail,
            Err(e) => {
                warn!(
                    "NAV fetch failed for '{}' ({}): {}",
                    matched.scheme.scheme_name, matched.scheme.scheme_code, e
                );
                summary_rows.push(SummaryRow::matched_without_data(query, &matched.scheme));
                continue;
            }
        };
        let fund_house = (!meta.fund_house.is_empty()).then(|| meta.fund_house.clone());

        let windowed = mfapi::points_in_window(&nav_points, start, end);
        if windowed.is_empty() {
            warn!(
                "No NAV points in the last {} days for '{}'",
                config.lookback_days, matched.scheme.scheme_name
            );
            summary_rows.push(SummaryRow {
                fund_house,
                ..SummaryRow::matched_without_data(query, &matched.scheme)
            });
            continue;
        }

        let fund_changes = calculations::daily_changes(&windowed);
        let rows = calculations::align_daily(&fund_changes, &nifty_changes);
        if rows.is_empty() {
            warn!(
                "No overlapping trading days with the benchmark for '{}'",
                matched.scheme.scheme_name
            );
        }
        let metrics = calculations::compute_fund_metrics(&rows)?;

        summary_rows.push(SummaryRow {
            query: query.clone(),
            matched_name: Some(matched.scheme.scheme_name.clone()),
            scheme_code: Some(matched.scheme.scheme_code),
            fund_house,
            data_points: metrics.data_points,
            correlation: metrics.correlation,
            with_market_pct: metrics.with_market_pct,
            avg_fund_return: metrics.avg_fund_return,
            avg_nifty_return: metrics.avg_nifty_return,
            up_capture_pct: metrics.up_capture_pct,
            down_capture_pct: metrics.down_capture_pct,
            behavior: Some(metrics.behavior),
            market_tolerance: Some(metrics.market_tolerance),
            nifty_start: bench_start,
            nifty_end: bench_end,
            nifty_pct_change: bench_pct,
        });

        if !rows.is_empty() {
            fund_sheets.push(FundSheet {
                scheme_code: matched.scheme.scheme_code,
                scheme_name: matched.scheme.scheme_name.clone(),
                rows,
            });
        }
    }

    let stamp = Utc::now().with_timezone(&Kolkata).format("%Y%m%d_%H%M%S");
    let path = config.output_dir.join(format!("mf_vs_nifty_{}.xlsx", stamp));
    excel::write_report(&path, &summary_rows, &fund_sheets)?;
    info!(
        "Report saved to {} ({} summary rows, {} detail sheets)",
        path.display(),
        summary_rows.len(),
        fund_sheets.len()
    );
    Ok(path)
}
