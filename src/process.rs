//! Per-run processing: walk a run folder, dispatch each file to its
//! extractor, then resolve final-summary values against the report.
use std::path::Path;

use walkdir::WalkDir;

use crate::config::ExtractConfig;
use crate::error::{ExtractError, Result};
use crate::extract::{self, ReportKey, SummaryKey};
use crate::run::{Field, ResultTable, RunMetadata};
use crate::scan;

/// Run output file families, in dispatch priority order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum FileKind {
    FinalSummary,
    Throughput,
    Report,
    MuxScan,
    PoreScan,
    DriftCorrection,
    SequencingSummary,
}

impl FileKind {
    /// Classify by file name; the first rule that matches wins.
    pub fn classify(file_name: &str) -> Option<FileKind> {
        if file_name.starts_with("final_summary") {
            Some(FileKind::FinalSummary)
        } else if file_name.starts_with("throughput") {
            Some(FileKind::Throughput)
        } else if file_name.starts_with("report") && file_name.ends_with(".md") {
            Some(FileKind::Report)
        } else if file_name.starts_with("mux_scan_data") {
            Some(FileKind::MuxScan)
        } else if file_name.starts_with("pore_scan_data") {
            Some(FileKind::PoreScan)
        } else if file_name.starts_with("drift_correction") {
            Some(FileKind::DriftCorrection)
        } else if file_name.starts_with("sequencing_summary") {
            Some(FileKind::SequencingSummary)
        } else {
            None
        }
    }
}

/// Values gathered while walking one run, before fallback resolution.
#[derive(Debug)]
struct RunState {
    meta: RunMetadata,
    report_run_id: Field,
    report_flow_cell_id: Field,
    report_start_date: Field,
    report_sample_id: Field,
    summary_channels: Field,
}

impl RunState {
    fn new(folder: &Path) -> Self {
        Self {
            meta: RunMetadata::new(folder),
            report_run_id: Field::NotFound,
            report_flow_cell_id: Field::NotFound,
            report_start_date: Field::NotFound,
            report_sample_id: Field::NotFound,
            summary_channels: Field::NotFound,
        }
    }

    fn visit(&mut self, kind: FileKind, path: &Path, cfg: &ExtractConfig) -> Result<()> {
        let m = &mut self.meta;
        match kind {
            FileKind::FinalSummary => {
                m.run_id = extract::summary_field(path, SummaryKey::RunId)?;
                m.flow_cell_id = extract::summary_field(path, SummaryKey::FlowCellId)?;
                m.start_date = extract::summary_field(path, SummaryKey::StartDate)?;
                m.sample_id = extract::summary_field(path, SummaryKey::SampleId)?;
            }
            FileKind::Throughput => match extract::estimated_bases(path) {
                Ok(v) => m.estimated_bases = Field::from(v),
                Err(e) => tracing::warn!(
                    file = %path.display(),
                    run = %m.folder.display(),
                    error = %e,
                    "no estimated bases in throughput file, keeping previous value"
                ),
            },
            FileKind::Report => {
                self.report_run_id = extract::report_field(path, ReportKey::RunId)?;
                self.report_flow_cell_id = extract::report_field(path, ReportKey::FlowCellId)?;
                self.report_start_date = extract::report_field(path, ReportKey::StartDate)?;
                self.report_sample_id = extract::report_field(path, ReportKey::SampleId)?;
            }
            FileKind::MuxScan => {
                m.active_pores = Field::from(scan::mux_scan_pores(path, cfg)?.to_string());
            }
            FileKind::PoreScan => {
                m.active_pores = Field::from(scan::pore_scan_pores(path, cfg)?.to_string());
            }
            FileKind::DriftCorrection => {
                m.active_channels = extract::drift_channels(path)?;
            }
            FileKind::SequencingSummary => {
                let c = scan::summary_channels(path, cfg)?;
                tracing::debug!(file = %path.display(), rows = c.rows_read, max_start_time = c.max_start_time, "read sequencing summary");
                self.summary_channels = Field::from(c.channels.to_string());
            }
        }
        Ok(())
    }

    /// Substitute report/summary values for anything the primary sources lacked.
    fn resolve(self) -> RunMetadata {
        let mut m = self.meta;
        let substituted: Vec<&str> = [
            ("runId", &m.run_id, &self.report_run_id),
            ("fcId", &m.flow_cell_id, &self.report_flow_cell_id),
            ("startDate", &m.start_date, &self.report_start_date),
            ("sampleId", &m.sample_id, &self.report_sample_id),
            ("activeChannels", &m.active_channels, &self.summary_channels),
        ]
        .into_iter()
        .filter(|(_, primary, fallback)| !primary.is_found() && fallback.is_found())
        .map(|(name, ..)| name)
        .collect();
        if !substituted.is_empty() {
            tracing::debug!(run = %m.folder.display(), fields = ?substituted, "filled fields from fallback sources");
        }
        m.run_id = m.run_id.or(self.report_run_id);
        m.flow_cell_id = m.flow_cell_id.or(self.report_flow_cell_id);
        m.start_date = m.start_date.or(self.report_start_date);
        m.sample_id = m.sample_id.or(self.report_sample_id);
        m.active_channels = m.active_channels.or(self.summary_channels);
        m
    }
}

/// Extract one row from a run folder, searching it recursively.
///
/// Files are visited in file-name order within each directory. Symlinked
/// files are read; symlinked subdirectories are not descended into. When a
/// run holds several files of one kind, the last one visited wins.
pub fn process_run<P: AsRef<Path>>(folder: P, cfg: &ExtractConfig) -> Result<RunMetadata> {
    let folder = folder.as_ref();
    let mut state = RunState::new(folder);
    for entry in WalkDir::new(folder).sort_by_file_name() {
        let entry = entry.map_err(|e| ExtractError::Walk { path: folder.to_path_buf(), source: e })?;
        if !entry.path().is_file() { continue; }
        let name = entry.file_name().to_string_lossy();
        let Some(kind) = FileKind::classify(&name) else { continue };
        tracing::debug!(file = %entry.path().display(), ?kind, "dispatching");
        state.visit(kind, entry.path(), cfg)?;
    }
    Ok(state.resolve())
}

/// Direct subdirectories of `infolder` (symlinks followed), one per run,
/// sorted by name.
pub fn run_folders<P: AsRef<Path>>(infolder: P) -> Result<Vec<std::path::PathBuf>> {
    let infolder = infolder.as_ref();
    if !infolder.is_dir() {
        return Err(ExtractError::NotADirectory(infolder.to_path_buf()));
    }
    let mut out = Vec::new();
    for entry in WalkDir::new(infolder).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| ExtractError::Walk { path: infolder.to_path_buf(), source: e })?;
        if entry.path().is_dir() { out.push(entry.into_path()); }
    }
    Ok(out)
}

/// Process every run folder under `infolder`, in order.
///
/// Any unguarded extractor failure aborts the whole batch.
pub fn process_batch<P: AsRef<Path>>(infolder: P, cfg: &ExtractConfig) -> Result<ResultTable> {
    let mut table = ResultTable::default();
    for folder in run_folders(infolder)? {
        tracing::info!(run = %folder.display(), "processing run folder");
        table.push(process_run(&folder, cfg)?);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    const REPORT: &str = "{\n  \"exp_start_time\": \"2023-11-02T09:15:00Z\",\n  \"flow_cell_id\": \"PAO999\",\n  \"run_id\": \"rep_run\",\n  \"sample_id\": \"rep_sample\"\n}\n";

    #[test]
    fn classify_priority() {
        assert_eq!(FileKind::classify("final_summary_FAX_1.txt"), Some(FileKind::FinalSummary));
        assert_eq!(FileKind::classify("report_FAX_1.md"), Some(FileKind::Report));
        assert_eq!(FileKind::classify("report_FAX_1.json"), None);
        assert_eq!(FileKind::classify("pore_scan_data_FAX.csv"), Some(FileKind::PoreScan));
        assert_eq!(FileKind::classify("sequencing_summary_FAX.txt"), Some(FileKind::SequencingSummary));
        assert_eq!(FileKind::classify("duty_time.csv"), None);
    }

    #[test]
    fn report_fills_missing_final_summary() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "report_PAO999.md", REPORT);
        let m = process_run(dir.path(), &ExtractConfig::default()).unwrap();
        assert_eq!(m.run_id, Field::from("rep_run"));
        assert_eq!(m.flow_cell_id, Field::from("PAO999"));
        assert_eq!(m.start_date, Field::from("2023-11-02"));
        assert_eq!(m.sample_id, Field::from("rep_sample"));
    }

    #[test]
    fn final_summary_wins_over_report() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "report_PAO999.md", REPORT);
        write(dir.path(), "final_summary_PAO999.txt", "acquisition_run_id=sum_run\nflow_cell_id=PAO999\nsample_id=\nstarted=2023-11-02T09:15:00Z\n");
        let m = process_run(dir.path(), &ExtractConfig::default()).unwrap();
        assert_eq!(m.run_id, Field::from("sum_run"));
        // blank but present: no fallback
        assert_eq!(m.sample_id, Field::from(""));
    }

    #[test]
    fn channels_fall_back_to_sequencing_summary() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("no_sample/20231102_0915_MN1_PAO999_abc");
        fs::create_dir_all(&nested).unwrap();
        write(&nested, "sequencing_summary_PAO999.txt", "channel\tstart_time\n1\t5.0\n2\t6.0\n2\t7.0\n");
        let m = process_run(dir.path(), &ExtractConfig::default()).unwrap();
        assert_eq!(m.active_channels, Field::from("2"));
        assert_eq!(m.run_id, Field::NotFound);
    }

    #[test]
    fn drift_correction_beats_sequencing_summary() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "drift_correction_PAO999.csv", "time,n_channels\n60,480\n");
        write(dir.path(), "sequencing_summary_PAO999.txt", "channel\tstart_time\n1\t5.0\n");
        let m = process_run(dir.path(), &ExtractConfig::default()).unwrap();
        assert_eq!(m.active_channels, Field::from("480"));
    }

    #[test]
    fn bad_throughput_keeps_default() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "throughput_PAO999.csv", "Reads,Bases\n1,2\n");
        let m = process_run(dir.path(), &ExtractConfig::default()).unwrap();
        assert_eq!(m.estimated_bases, Field::from("0"));
    }

    #[test]
    fn broken_scan_aborts_run() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "mux_scan_data_PAO999.csv", "channel,include_well\n1,1\n");
        assert!(process_run(dir.path(), &ExtractConfig::default()).is_err());
    }

    #[test]
    fn runs_do_not_inherit_values() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("run_a");
        let b = dir.path().join("run_b");
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&b).unwrap();
        write(&a, "final_summary_A.txt", "acquisition_run_id=run_a\nsample_id=s_a\n");
        write(&a, "throughput_A.csv", "Estimated Bases\n999\n");
        write(&b, "final_summary_B.txt", "acquisition_run_id=run_b\n");
        fs::write(dir.path().join("stray.txt"), "not a run").unwrap();

        let table = process_batch(dir.path(), &ExtractConfig::default()).unwrap();
        assert_eq!(table.len(), 2);
        let b_row = &table.rows[1];
        assert_eq!(b_row.run_id, Field::from("run_b"));
        assert_eq!(b_row.sample_id, Field::NotFound);
        assert_eq!(b_row.estimated_bases, Field::from("0"));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_run_folder_is_processed() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real_run");
        fs::create_dir_all(&real).unwrap();
        write(&real, "final_summary_A.txt", "acquisition_run_id=run_a\n");
        let runs = dir.path().join("runs");
        fs::create_dir_all(&runs).unwrap();
        std::os::unix::fs::symlink(&real, runs.join("run_a")).unwrap();

        let table = process_batch(&runs, &ExtractConfig::default()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].run_id, Field::from("run_a"));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("store");
        let run = dir.path().join("run");
        fs::create_dir_all(&store).unwrap();
        fs::create_dir_all(&run).unwrap();
        write(&store, "final_summary_A.txt", "acquisition_run_id=run_a\n");
        std::os::unix::fs::symlink(store.join("final_summary_A.txt"), run.join("final_summary_A.txt")).unwrap();

        let m = process_run(&run, &ExtractConfig::default()).unwrap();
        assert_eq!(m.run_id, Field::from("run_a"));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_subdirectory_is_not_descended() {
        let dir = tempfile::tempdir().unwrap();
        let other = dir.path().join("other_run");
        let run = dir.path().join("run");
        fs::create_dir_all(&other).unwrap();
        fs::create_dir_all(&run).unwrap();
        write(&other, "final_summary_B.txt", "acquisition_run_id=run_b\n");
        std::os::unix::fs::symlink(&other, run.join("linked")).unwrap();

        let m = process_run(&run, &ExtractConfig::default()).unwrap();
        assert_eq!(m.run_id, Field::NotFound);
    }

    #[test]
    fn missing_infolder_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = process_batch(dir.path().join("absent"), &ExtractConfig::default()).unwrap_err();
        assert!(matches!(err, ExtractError::NotADirectory(_)));
    }
}
