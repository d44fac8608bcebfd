//! Scan counters: active pores from mux/pore scans, active channels from the
//! sequencing summary.
//!
//! These need row filtering rather than a single line match, so they go through
//! the `csv` reader. All readers are `flexible` (ragged trailing rows from an
//! interrupted run are tolerated) and stop early once their row budget is spent.
use std::collections::HashSet;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use crate::config::ExtractConfig;
use crate::error::{ExtractError, Result};

/// Iteration-index column names for `mux_scan_data*`, in lookup order.
/// Older MinKNOW releases wrote `repeat`, newer ones `scan_number`.
pub const MUX_SCAN_ITERATION: &[&str] = &["repeat", "scan_number"];
/// Iteration-index column names for `pore_scan_data*`.
pub const PORE_SCAN_ITERATION: &[&str] = &["scan_number"];

const INCLUDE_WELL: &str = "include_well";

pub(crate) fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

/// First candidate present in `headers`.
fn first_present(headers: &StringRecord, candidates: &[&str]) -> Option<usize> {
    candidates.iter().find_map(|c| find_column(headers, c))
}

/// Numeric reading of a flag cell: `1`, `1.0` and `True` all count as one.
fn flag_value(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.eq_ignore_ascii_case("true") { return Some(1.0); }
    if cell.eq_ignore_ascii_case("false") { return Some(0.0); }
    cell.parse::<f64>().ok()
}

fn is_one(cell: Option<&str>) -> bool { cell.and_then(flag_value) == Some(1.0) }

/// Count wells included in the first scan iteration.
///
/// Reads at most `row_limit` data rows and counts those where the first
/// available column from `iteration_columns` equals 1 and `include_well`
/// equals 1.
pub fn count_active_pores<P: AsRef<Path>>(path: P, iteration_columns: &[&str], row_limit: usize) -> Result<usize> {
    let path = path.as_ref();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b',')
        .flexible(true)
        .from_path(path)
        .map_err(|e| ExtractError::csv(path, e))?;
    let headers = rdr.headers().map_err(|e| ExtractError::csv(path, e))?.clone();
    let iter_col = first_present(&headers, iteration_columns)
        .ok_or_else(|| ExtractError::missing_column(path, iteration_columns))?;
    let well_col = find_column(&headers, INCLUDE_WELL)
        .ok_or_else(|| ExtractError::missing_column(path, &[INCLUDE_WELL]))?;

    let mut n = 0usize;
    for rec in rdr.records().take(row_limit) {
        let r = rec.map_err(|e| ExtractError::csv(path, e))?;
        if is_one(r.get(iter_col)) && is_one(r.get(well_col)) { n += 1; }
    }
    tracing::debug!(file = %path.display(), column = %headers[iter_col].trim(), active = n, "counted active pores");
    Ok(n)
}

/// Active pores from a `mux_scan_data*` file (`repeat`, then `scan_number`).
pub fn mux_scan_pores<P: AsRef<Path>>(path: P, cfg: &ExtractConfig) -> Result<usize> {
    count_active_pores(path, MUX_SCAN_ITERATION, cfg.scan_row_limit)
}

/// Active pores from a `pore_scan_data*` file.
pub fn pore_scan_pores<P: AsRef<Path>>(path: P, cfg: &ExtractConfig) -> Result<usize> {
    count_active_pores(path, PORE_SCAN_ITERATION, cfg.scan_row_limit)
}

/// Outcome of the windowed sequencing-summary read.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelCount {
    /// Distinct channels with a read starting within the time bound.
    pub channels: usize,
    /// Data rows consumed.
    pub rows_read: usize,
    /// Largest `start_time` seen among the rows read.
    pub max_start_time: f64,
}

/// Count channels active during the first hour of a sequencing summary.
///
/// Sequencing summaries can hold tens of millions of reads but are roughly
/// ordered by time. Rows are consumed in windows of `summary_row_step`; after
/// each full window the read stops if `start_time` has reached
/// `first_hour_secs` or `summary_row_cap` rows have been read. If the file ends
/// first, the count covers every row in it.
pub fn summary_channels<P: AsRef<Path>>(path: P, cfg: &ExtractConfig) -> Result<ChannelCount> {
    let path = path.as_ref();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b'\t')
        .flexible(true)
        .from_path(path)
        .map_err(|e| ExtractError::csv(path, e))?;
    let headers = rdr.headers().map_err(|e| ExtractError::csv(path, e))?.clone();
    let channel_col = find_column(&headers, "channel")
        .ok_or_else(|| ExtractError::missing_column(path, &["channel"]))?;
    let time_col = find_column(&headers, "start_time")
        .ok_or_else(|| ExtractError::missing_column(path, &["start_time"]))?;

    let step = cfg.summary_row_step.max(1);
    let mut seen: HashSet<String> = HashSet::new();
    let mut max_start_time = f64::NEG_INFINITY;
    let mut rows_read = 0usize;
    let mut rec = StringRecord::new();
    while rdr.read_record(&mut rec).map_err(|e| ExtractError::csv(path, e))? {
        rows_read += 1;
        if let Some(t) = rec.get(time_col).and_then(|v| v.trim().parse::<f64>().ok()) {
            if t > max_start_time { max_start_time = t; }
            if t <= cfg.first_hour_secs {
                if let Some(ch) = rec.get(channel_col) { seen.insert(ch.trim().to_string()); }
            }
        }
        if rows_read >= cfg.summary_row_cap { break; }
        if rows_read % step == 0 {
            if max_start_time >= cfg.first_hour_secs { break; }
            tracing::debug!(file = %path.display(), rows_read, max_start_time, "first hour not covered yet, widening window");
        }
    }
    Ok(ChannelCount { channels: seen.len(), rows_read, max_start_time })
}
