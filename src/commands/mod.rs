//! Command handlers for the kodukai CLI.
//!
//! Every analysis command fetches the configured worksheet once, normalizes it, and hands the
//! resulting records to the engine.

mod diagnostics;
mod init;
mod report;

use crate::ingest::Normalized;
use crate::source::{self, Mode};
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use diagnostics::{diagnostics, DiagnosticsReport};
pub use init::init;
pub use report::{
    categories, daily, monthly, overview, search, weekdays, CategoriesReport, MonthlyReport,
    RankedCategory,
};

/// The output type for a command: a message for the user and, optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to stdout.
    pub fn print(&self) -> Result<()> {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            let json = serde_json::to_string_pretty(structure)?;
            println!("{json}");
        }
        Ok(())
    }
}

/// Fetches and normalizes the configured worksheet.
fn load(config: &Config, mode: Mode) -> Result<Normalized> {
    debug!("Loading records in {mode:?} mode");
    let mut sheet = source::open(config, mode);
    let rows = source::fetch(sheet.as_mut(), config)?;
    Ok(config.normalizer().normalize(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_seed_data() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path()).unwrap();
        let normalized = load(&config, Mode::Test).unwrap();
        assert_eq!(normalized.records().len(), 11);
        assert_eq!(normalized.rejected_count(), 2);
        assert_eq!(normalized.warnings().count(), 1);
    }

    #[test]
    fn test_out_message_only() {
        let out: Out<()> = "done".into();
        assert_eq!(out.message(), "done");
        assert!(out.structure().is_none());
        out.print().unwrap();
    }
}
