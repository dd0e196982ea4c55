use crate::commands::{load, Out};
use crate::ingest::Diagnostic;
use crate::source::Mode;
use crate::{Config, Result};
use serde::Serialize;
use tracing::info;

/// What normalization made of the source rows.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticsReport {
    pub accepted: usize,
    pub rejected: usize,
    pub warnings: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Reports the rows that were rejected or kept with a corrected year-month.
pub fn diagnostics(config: &Config, mode: Mode) -> Result<Out<DiagnosticsReport>> {
    let normalized = load(config, mode)?;
    for diagnostic in normalized.diagnostics() {
        info!("{diagnostic}");
    }
    let report = DiagnosticsReport {
        accepted: normalized.records().len(),
        rejected: normalized.rejected_count(),
        warnings: normalized.warnings().count(),
        diagnostics: normalized.diagnostics().to_vec(),
    };
    let message = format!(
        "{} row(s) accepted, {} rejected, {} warning(s)",
        report.accepted, report.rejected, report.warnings
    );
    Ok(Out::new(message, report))
}
