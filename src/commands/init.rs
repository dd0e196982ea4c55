use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the kodukai home directory with its `data` subdirectory and a default `config.json`.
///
/// Export the expense worksheet as CSV to `<kodukai_home>/data/kodukai-db.csv` afterwards.
///
/// # Errors
/// - Returns an error if a config file already exists or any file operations fail.
pub fn init(kodukai_home: &Path) -> Result<Out<()>> {
    let config = Config::create(kodukai_home)
        .context("Unable to create the kodukai home directory and config")?;
    Ok(format!(
        "Successfully created the kodukai directory at {}. Export '{}' as CSV into {}",
        config.root().display(),
        config.worksheet(),
        config.data_dir().display()
    )
    .into())
}
