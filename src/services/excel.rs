// src/services/excel.rs
use log::info;
use regex::Regex;
use rust_xlsxwriter::{Color, Format, Workbook, Worksheet, XlsxError};
use std::path::Path;

use crate::models::{Behavior, FundSheet, MarketTolerance, SummaryRow};
use crate::BoxError;

// Standard Excel "good/neutral/bad" fill colors.
const GREEN_FILL: u32 = 0xC6EFCE;
const YELLOW_FILL: u32 = 0xFFEB9C;
const RED_FILL: u32 = 0xFFC7CE;
const GRAY_FILL: u32 = 0xD9D9D9;

const SUMMARY_HEADERS: &[&str] = &[
    "Query",
    "Matched Scheme",
    "Scheme Code",
    "Fund House",
    "Data Points",
    "Correlation",
    "With Market %",
    "Avg Fund Return (%)",
    "Avg Nifty Return (%)",
    "Up Capture (%)",
    "Down Capture (%)",
    "Behavior",
    "Market Tolerance",
    "NIFTY Start",
    "NIFTY End",
    "NIFTY % Change",
];

const DETAIL_HEADERS: &[&str] = &[
    "Date",
    "NAV",
    "Fund Start",
    "Fund End",
    "Fund % Change",
    "NIFTY Start",
    "NIFTY End",
    "NIFTY % Change",
];

/// Excel rejects sheet names with `: \ / ? * [ ]` or more than 31 chars.
pub fn sanitize_sheet_name(name: &str) -> String {
    let invalid = Regex::new(r"[:\\/?*\[\]]").expect("static sheet-name pattern");
    invalid.replace_all(name, "_").chars().take(31).collect()
}

fn behavior_fill(behavior: Behavior) -> Option<Format> {
    let color = match behavior {
        Behavior::WithMarket => GREEN_FILL,
        Behavior::AgainstMarket => RED_FILL,
        Behavior::LowCorr => GRAY_FILL,
        Behavior::InsufficientData => return None,
    };
    Some(Format::new().set_background_color(Color::RGB(color)))
}

fn tolerance_fill(tolerance: MarketTolerance) -> Option<Format> {
    let color = match tolerance {
        MarketTolerance::High => GREEN_FILL,
        MarketTolerance::Medium => YELLOW_FILL,
        MarketTolerance::Low => RED_FILL,
        MarketTolerance::Unknown => return None,
    };
    Some(Format::new().set_background_color(Color::RGB(color)))
}

fn write_opt_number(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: Option<f64>,
    format: &Format,
) -> Result<(), XlsxError> {
    if let Some(v) = value {
        sheet.write_number_with_format(row, col, v, format)?;
    }
    Ok(())
}

/// Write the workbook: Summary sheet first, then one detail sheet per
/// resolved fund. Any workbook or I/O error here is fatal for the run.
pub fn write_report(
    path: &Path,
    summary: &[SummaryRow],
    fund_sheets: &[FundSheet],
) -> Result<(), BoxError> {
    let mut workbook = Workbook::new();

    let header_fmt = Format::new().set_bold();
    let corr_fmt = Format::new().set_num_format("0.000");
    let pct_fmt = Format::new().set_num_format("0.0");
    let ret_fmt = Format::new().set_num_format("0.0000");
    let price_fmt = Format::new().set_num_format("0.00");

    let sheet = workbook.add_worksheet();
    sheet.set_name("Summary")?;
    for (col, title) in SUMMARY_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &header_fmt)?;
    }
    sheet.set_column_width(0, 45)?;
    sheet.set_column_width(1, 55)?;
    sheet.set_column_width(3, 30)?;

    for (i, row) in summary.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write_string(r, 0, row.query.as_str())?;
        if let Some(name) = &row.matched_name {
            sheet.write_string(r, 1, name.as_str())?;
        }
        if let Some(code) = row.scheme_code {
            sheet.write_number(r, 2, code as f64)?;
        }
        if let Some(house) = &row.fund_house {
            sheet.write_string(r, 3, house.as_str())?;
        }
        sheet.write_number(r, 4, row.data_points as f64)?;
        write_opt_number(sheet, r, 5, row.correlation, &corr_fmt)?;
        write_opt_number(sheet, r, 6, row.with_market_pct, &pct_fmt)?;
        write_opt_number(sheet, r, 7, row.avg_fund_return, &ret_fmt)?;
        write_opt_number(sheet, r, 8, row.avg_nifty_return, &ret_fmt)?;
        write_opt_number(sheet, r, 9, row.up_capture_pct, &pct_fmt)?;
        write_opt_number(sheet, r, 10, row.down_capture_pct, &pct_fmt)?;
        if let Some(behavior) = row.behavior {
            match behavior_fill(behavior) {
                Some(fill) => {
                    sheet.write_string_with_format(r, 11, behavior.to_string(), &fill)?
                }
                None => sheet.write_string(r, 11, behavior.to_string())?,
            };
        }
        if let Some(tolerance) = row.market_tolerance {
            match tolerance_fill(tolerance) {
                Some(fill) => {
                    sheet.write_string_with_format(r, 12, tolerance.to_string(), &fill)?
                }
                None => sheet.write_string(r, 12, tolerance.to_string())?,
            };
        }
        write_opt_number(sheet, r, 13, row.nifty_start, &price_fmt)?;
        write_opt_number(sheet, r, 14, row.nifty_end, &price_fmt)?;
        write_opt_number(sheet, r, 15, row.nifty_pct_change, &pct_fmt)?;
    }

    for fund in fund_sheets {
        let name = sanitize_sheet_name(&format!("{}_{}", fund.scheme_code, fund.scheme_name));
        let sheet = workbook.add_worksheet();
        sheet.set_name(&name)?;
        for (col, title) in DETAIL_HEADERS.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *title, &header_fmt)?;
        }
        sheet.set_column_width(0, 12)?;

        for (i, row) in fund.rows.iter().enumerate() {
            let r = (i + 1) as u32;
            sheet.write_string(r, 0, row.date.to_string())?;
            sheet.write_number_with_format(r, 1, row.nav, &price_fmt)?;
            sheet.write_number_with_format(r, 2, row.fund_start, &price_fmt)?;
            sheet.write_number_with_format(r, 3, row.fund_end, &price_fmt)?;
            sheet.write_number_with_format(r, 4, row.fund_pct_change, &ret_fmt)?;
            sheet.write_number_with_format(r, 5, row.nifty_start, &price_fmt)?;
            sheet.write_number_with_format(r, 6, row.nifty_end, &price_fmt)?;
            sheet.write_number_with_format(r, 7, row.nifty_pct_change, &ret_fmt)?;
        }
        info!("Wrote sheet: {} (rows={})", name, fund.rows.len());
    }

    workbook.save(path)?;
    Ok(())
}
