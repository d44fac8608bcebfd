//! Single-field extractors for the small text files MinKNOW writes per run.
//!
//! Each function opens its file, scans it top to bottom and returns the first
//! match. Files are reopened for every field; they are a few KB at most.
//!
//! | File | Match | Value |
//! |---|---|---|
//! | `final_summary*` | line starts with the key | text after the first `=` |
//! | `report*.md` | line contains `"key"` | quoted value after the first `:` |
//! | `throughput*` (csv) | header column `Estimated Bases` | that column in the last row |
//! | `drift_correction*` (csv) | header column `n_channels` | that column in the first data row |
//!
//! # Examples
//! ```no_run
//! use nanometa::extract::{summary_field, SummaryKey};
//! let date = summary_field("final_summary_PAM1.txt", SummaryKey::StartDate).unwrap();
//! println!("{date}");
//! ```
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use csv::{Reader, ReaderBuilder, StringRecord};

use crate::error::{ExtractError, Result};
use crate::run::Field;
use crate::scan::find_column;

/// Fields read from a `final_summary*` key=value file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SummaryKey { RunId, FlowCellId, StartDate, SampleId }

impl SummaryKey {
    pub fn key(self) -> &'static str {
        match self {
            SummaryKey::RunId => "acquisition_run_id",
            SummaryKey::FlowCellId => "flow_cell_id",
            SummaryKey::StartDate => "started",
            SummaryKey::SampleId => "sample_id",
        }
    }
}

/// Fields read from a `report*.md` file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReportKey { RunId, FlowCellId, StartDate, SampleId }

impl ReportKey {
    pub fn key(self) -> &'static str {
        match self {
            ReportKey::RunId => "run_id",
            ReportKey::FlowCellId => "flow_cell_id",
            ReportKey::StartDate => "exp_start_time",
            ReportKey::SampleId => "sample_id",
        }
    }
}

fn open_lines(path: &Path) -> Result<std::io::Lines<BufReader<File>>> {
    let f = File::open(path).map_err(|e| ExtractError::io(path, e))?;
    Ok(BufReader::new(f).lines())
}

/// Drop the time part of an ISO-8601 timestamp.
fn date_part(ts: &str) -> &str { ts.split('T').next().unwrap_or(ts) }

/// Read one field from a final summary.
///
/// The key must start the line. The value is the segment between the first
/// and second `=`; for [`SummaryKey::StartDate`] only the date part of the
/// timestamp is kept.
pub fn summary_field<P: AsRef<Path>>(path: P, key: SummaryKey) -> Result<Field> {
    let path = path.as_ref();
    for line in open_lines(path)? {
        let line = line.map_err(|e| ExtractError::io(path, e))?;
        if !line.starts_with(key.key()) { continue; }
        let line = line.trim();
        let value = line.split('=').nth(1).ok_or_else(|| ExtractError::malformed(path, line))?;
        let value = if key == SummaryKey::StartDate { date_part(value) } else { value };
        return Ok(Field::from(value));
    }
    Ok(Field::NotFound)
}

/// Read one field from a report file (`"key": "value",` lines).
pub fn report_field<P: AsRef<Path>>(path: P, key: ReportKey) -> Result<Field> {
    let path = path.as_ref();
    let needle = format!("\"{}\"", key.key());
    for line in open_lines(path)? {
        let line = line.map_err(|e| ExtractError::io(path, e))?;
        if !line.contains(&needle) { continue; }
        let line = line.trim();
        let value = line
            .split(':')
            .nth(1)
            .and_then(|rhs| rhs.split('"').nth(1))
            .ok_or_else(|| ExtractError::malformed(path, line))?;
        let value = if key == ReportKey::StartDate { date_part(value) } else { value };
        return Ok(Field::from(value));
    }
    Ok(Field::NotFound)
}

/// Open a comma-separated file and locate `column` in its header.
fn csv_with_column(path: &Path, column: &str) -> Result<(Reader<File>, usize)> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b',')
        .flexible(true)
        .from_path(path)
        .map_err(|e| ExtractError::csv(path, e))?;
    let headers = rdr.headers().map_err(|e| ExtractError::csv(path, e))?;
    let pos = find_column(headers, column).ok_or_else(|| ExtractError::missing_column(path, &[column]))?;
    Ok((rdr, pos))
}

fn cell(path: &Path, rec: &StringRecord, pos: usize) -> Result<String> {
    rec.get(pos)
        .map(|v| v.trim().to_string())
        .ok_or_else(|| ExtractError::malformed(path, &rec.iter().collect::<Vec<_>>().join(",")))
}

/// `Estimated Bases` from the last row of a throughput CSV.
///
/// Fails when the column is absent or the file has no data rows; the run
/// processor treats both as recoverable.
pub fn estimated_bases<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let (mut rdr, pos) = csv_with_column(path, "Estimated Bases")?;
    let mut last: Option<StringRecord> = None;
    for rec in rdr.records() {
        last = Some(rec.map_err(|e| ExtractError::csv(path, e))?);
    }
    let last = last.ok_or_else(|| ExtractError::NoData { path: path.to_path_buf() })?;
    cell(path, &last, pos)
}

/// Active channel count from the first measurement of a drift-correction CSV.
///
/// A header without any data row yields `NotFound`.
pub fn drift_channels<P: AsRef<Path>>(path: P) -> Result<Field> {
    let path = path.as_ref();
    let (mut rdr, pos) = csv_with_column(path, "n_channels")?;
    match rdr.records().next() {
        Some(rec) => {
            let rec = rec.map_err(|e| ExtractError::csv(path, e))?;
            Ok(Field::from(cell(path, &rec, pos)?))
        }
        None => Ok(Field::NotFound),
    }
}
