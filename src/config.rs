//! Tunables for a batch run.
use std::path::PathBuf;

/// Default report file, written to the current working directory.
pub const DEFAULT_OUTPUT: &str = "metadataExtraced.tsv";

/// Limits and paths used while extracting a batch.
///
/// `Default` gives the values the scan readers were calibrated on: the first
/// mux/pore scan iteration fits in 5000 rows (a flow cell has at most 2048
/// wells per scan), and sequencing summaries are read in 500k-row windows up to
/// 5M rows until the first hour of the run is covered.
#[derive(Clone, Debug)]
pub struct ExtractConfig {
    /// Rows read from a mux/pore scan file.
    pub scan_row_limit: usize,
    /// Window size for the sequencing-summary read.
    pub summary_row_step: usize,
    /// Hard cap on sequencing-summary rows.
    pub summary_row_cap: usize,
    /// `start_time` bound (seconds) for counting active channels.
    pub first_hour_secs: f64,
    /// Report path, opened in append mode.
    pub output: PathBuf,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            scan_row_limit: 5000,
            summary_row_step: 500_000,
            summary_row_cap: 5_000_000,
            first_hour_secs: 3600.0,
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}
