#![forbid(unsafe_code)]
//! # nanometa
//!
//! Run-level metadata extraction for Oxford Nanopore sequencing output. Given a
//! folder holding one subfolder per run, `nanometa` pulls out the run id, flow
//! cell id, start date, sample id, estimated bases, active pores and active
//! channels, and appends one row per run to a tab-separated report.
//!
//! ## Sources
//! | Value | Primary | Fallback |
//! |---|---|---|
//! | run id, flow cell, start date, sample id | `final_summary*` | `report*.md` |
//! | estimated bases | `throughput*` (last row) | keeps `0` |
//! | active pores | `mux_scan_data*` / `pore_scan_data*` (first scan) | keeps `0` |
//! | active channels | `drift_correction*` (first measurement) | `sequencing_summary*` (first hour) |
//!
//! A value that is *present but blank* counts as found and is never replaced by
//! a fallback; only a value that is missing altogether is.
//!
//! ## Examples
//! ```no_run
//! use nanometa::{config::ExtractConfig, output, process};
//! let cfg = ExtractConfig::default();
//! let table = process::process_batch("/data/ont/runs", &cfg).unwrap();
//! output::append_tsv(&cfg.output, &table).unwrap();
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod process;
pub mod run;
pub mod scan;

pub use config::ExtractConfig;
pub use error::{ExtractError, Result};
pub use run::{Field, ResultTable, RunMetadata};

/// Crate version string (from `CARGO_PKG_VERSION`).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Process every run under `infolder` and append the report to `cfg.output`.
///
/// Nothing is written unless every run was processed; a fatal error in any run
/// leaves the report untouched.
pub fn extract_to_report<P: AsRef<std::path::Path>>(infolder: P, cfg: &ExtractConfig) -> Result<ResultTable> {
    let table = process::process_batch(infolder, cfg)?;
    output::append_tsv(&cfg.output, &table)?;
    Ok(table)
}
