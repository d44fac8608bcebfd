//! Report writing.
//!
//! The TSV layout is fixed: one header line, then every row as seven
//! `value<TAB>` cells followed by a newline. The file is opened in append mode,
//! so running a batch twice against the same path appends a second header and
//! a second set of rows.
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use polars::prelude::*;

use crate::error::{ExtractError, Result};
use crate::run::{ResultTable, COLUMNS};

/// Write the header and all rows to `out`.
pub fn write_rows<W: Write>(out: &mut W, table: &ResultTable) -> std::io::Result<()> {
    writeln!(out, "{}", COLUMNS.join("\t"))?;
    for row in table.iter() {
        for value in row.values() {
            write!(out, "{value}\t")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Append the table to `path` in one go, creating the file if needed.
pub fn append_tsv<P: AsRef<Path>>(path: P, table: &ResultTable) -> Result<()> {
    let path = path.as_ref();
    let f = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ExtractError::io(path, e))?;
    let mut w = BufWriter::new(f);
    write_rows(&mut w, table).and_then(|_| w.flush()).map_err(|e| ExtractError::io(path, e))?;
    tracing::info!(file = %path.display(), rows = table.len(), "wrote metadata report");
    Ok(())
}

/// The table as a string-typed DataFrame, one column per output field.
pub fn to_frame(table: &ResultTable) -> PolarsResult<DataFrame> {
    let col = |i: usize| -> Vec<String> { table.iter().map(|r| r.values()[i].to_string()).collect() };
    df!(
        COLUMNS[0] => col(0),
        COLUMNS[1] => col(1),
        COLUMNS[2] => col(2),
        COLUMNS[3] => col(3),
        COLUMNS[4] => col(4),
        COLUMNS[5] => col(5),
        COLUMNS[6] => col(6),
    )
}
