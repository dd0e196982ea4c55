//! Implements the `Sheet` trait over CSV files exported from the spreadsheet.

use crate::source::Sheet;
use crate::Result;
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Reads worksheet `name` from `<dir>/<name>.csv`.
#[derive(Debug, Clone)]
pub struct CsvSheet {
    dir: PathBuf,
}

impl CsvSheet {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, sheet_name: &str) -> PathBuf {
        self.dir.join(format!("{sheet_name}.csv"))
    }
}

impl Sheet for CsvSheet {
    fn get(&mut self, sheet_name: &str) -> Result<Vec<Vec<String>>> {
        let path = self.path(sheet_name);
        trace!("get for {sheet_name} from {}", path.display());
        read_csv(&path)
            .with_context(|| format!("Failed to read sheet '{sheet_name}' at {}", path.display()))
    }
}

/// Reads every row of a CSV file, the header row included. Rows may differ in length.
fn read_csv(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }
    Ok(rows)
}
