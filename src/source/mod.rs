//! Where raw expense rows come from.
//!
//! A `Sheet` hands back the cells of a named worksheet as rows of strings. The first row holds
//! the headers. `fetch` turns those cells into `RawRow`s using the configured column names.

mod csv_sheet;
mod test_sheet;

use crate::model::{RawRow, RawRows};
use crate::{Config, Result};
use anyhow::Context;
use tracing::{debug, warn};

pub use csv_sheet::CsvSheet;
pub use test_sheet::TestSheet;

/// The environment variable that switches the program to seeded, in-memory data.
pub const TEST_MODE_VAR: &str = "KODUKAI_IN_TEST_MODE";

/// A source of worksheet cells.
pub trait Sheet {
    /// Get the cells of `sheet_name`, one `Vec` per row, header row first.
    fn get(&mut self, sheet_name: &str) -> Result<Vec<Vec<String>>>;
}

/// Which `Sheet` implementation to use.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Read CSV exports from the configured data directory.
    #[default]
    Csv,
    /// Use the in-memory seed data of `TestSheet`.
    Test,
}

impl Mode {
    /// `Mode::Test` when `KODUKAI_IN_TEST_MODE` is set and non-empty, otherwise `Mode::Csv`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_VAR) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Csv,
        }
    }
}

/// Create the `Sheet` for `mode`.
pub fn open(config: &Config, mode: Mode) -> Box<dyn Sheet> {
    match mode {
        Mode::Csv => Box::new(CsvSheet::new(config.data_dir())),
        Mode::Test => Box::new(TestSheet::default()),
    }
}

/// Reads the configured worksheet from `sheet` and maps its columns to fields.
pub fn fetch(sheet: &mut dyn Sheet, config: &Config) -> Result<Vec<RawRow>> {
    let worksheet = config.worksheet();
    let table = sheet.get(worksheet)?;
    let rows = RawRows::from_table(table, config.columns())
        .with_context(|| format!("Unable to read the rows of worksheet '{worksheet}'"))?;
    if rows.mapping().is_positional() {
        warn!("No known headers found in worksheet '{worksheet}', assigning columns by position");
    }
    debug!("Fetched {} row(s) from worksheet '{worksheet}'", rows.len());
    Ok(rows.into_rows())
}
