//! Core types for **runs**, **fields** and the aggregated **result table**.
//!
//! Every value in a row is kept as text: numbers read from scan files keep the
//! textual form they had on disk, counts computed here are rendered in decimal.
use core::fmt;
use std::path::PathBuf;

/// A single extracted value, or the explicit absence of one.
///
/// `NotFound` is distinct from `Found(String::new())`: a key that is present
/// with a blank value is still *found* and never triggers a fallback.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Field {
    Found(String),
    #[default]
    NotFound,
}

impl Field {
    pub fn is_found(&self) -> bool { matches!(self, Field::Found(_)) }

    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Field::Found(s) => Some(s.as_str()),
            Field::NotFound => None,
        }
    }

    /// Keep `self` if found, otherwise take `fallback`.
    pub fn or(self, fallback: Field) -> Field {
        match self {
            Field::Found(_) => self,
            Field::NotFound => fallback,
        }
    }
}

impl From<String> for Field {
    fn from(s: String) -> Self { Field::Found(s) }
}

impl From<&str> for Field {
    fn from(s: &str) -> Self { Field::Found(s.to_string()) }
}

impl From<Option<String>> for Field {
    fn from(v: Option<String>) -> Self { v.map_or(Field::NotFound, Field::Found) }
}

/// Absent values render as `None`.
impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Found(s) => f.write_str(s),
            Field::NotFound => f.write_str("None"),
        }
    }
}

/// Output column names, in row order.
pub const COLUMNS: [&str; 7] = [
    "runId",
    "fcId",
    "startDate",
    "estBases",
    "activePores",
    "activeChannels",
    "sampleId",
];

/// Resolved metadata for one run folder (one output row).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RunMetadata {
    /// Folder the values were extracted from.
    pub folder: PathBuf,
    pub run_id: Field,
    pub flow_cell_id: Field,
    pub start_date: Field,
    pub estimated_bases: Field,
    pub active_pores: Field,
    pub active_channels: Field,
    pub sample_id: Field,
}

impl RunMetadata {
    /// Fresh state for a run: text fields absent, yield and pores at `0`.
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            run_id: Field::NotFound,
            flow_cell_id: Field::NotFound,
            start_date: Field::NotFound,
            estimated_bases: Field::from("0"),
            active_pores: Field::from("0"),
            active_channels: Field::NotFound,
            sample_id: Field::NotFound,
        }
    }

    /// The seven values in [`COLUMNS`] order.
    pub fn values(&self) -> [&Field; 7] {
        [
            &self.run_id,
            &self.flow_cell_id,
            &self.start_date,
            &self.estimated_bases,
            &self.active_pores,
            &self.active_channels,
            &self.sample_id,
        ]
    }
}

/// Rows in the order the run folders were processed.
#[derive(Clone, Debug, Default)]
pub struct ResultTable {
    pub rows: Vec<RunMetadata>,
}

impl ResultTable {
    pub fn push(&mut self, row: RunMetadata) { self.rows.push(row); }
    pub fn len(&self) -> usize { self.rows.len() }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }
    pub fn iter(&self) -> impl Iterator<Item = &RunMetadata> { self.rows.iter() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_value_is_still_found() {
        let blank = Field::from("");
        assert!(blank.is_found());
        assert_eq!(blank.or(Field::from("report")), Field::from(""));
    }

    #[test]
    fn not_found_takes_fallback_and_renders_none() {
        assert_eq!(Field::NotFound.or(Field::from("abc")), Field::from("abc"));
        assert_eq!(Field::NotFound.to_string(), "None");
    }

    #[test]
    fn new_run_has_zero_yield_and_pores() {
        let r = RunMetadata::new("/runs/a");
        let v: Vec<String> = r.values().iter().map(|f| f.to_string()).collect();
        assert_eq!(v, ["None", "None", "None", "0", "0", "None", "None"]);
    }
}
