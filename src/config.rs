//! Configuration file handling for kodukai.
//!
//! The configuration file is stored at `$KODUKAI_HOME/config.json`. It names the worksheet to
//! read, where the exported sheets live, which headers hold which field, and any extra timestamp
//! formats that the source uses.

use crate::ingest::Normalizer;
use crate::model::ColumnNames;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "kodukai";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const DATA: &str = "data";
const DEFAULT_WORKSHEET: &str = "kodukai-db";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$KODUKAI_HOME` and from there it loads `$KODUKAI_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    data_dir: PathBuf,
}

impl Config {
    /// Creates the home directory and its `data` subdirectory and writes a `config.json` with
    /// default settings.
    ///
    /// # Errors
    /// - Returns an error if a `config.json` already exists in `dir`.
    /// - Returns an error if any file operations fail.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative).context("Unable to create the kodukai home directory")?;
        let root = utils::canonicalize(&maybe_relative)?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "A config file already exists at '{}'",
                config_path.display()
            )
        }

        let data_dir = root.join(DATA);
        utils::make_dir(&data_dir)?;

        let config_file = ConfigFile::default();
        config_file.save(&config_path)?;

        Ok(Self {
            root,
            config_path,
            config_file,
            data_dir,
        })
    }

    /// This will
    /// - validate that the `kodukai_home` exists and that the config file exists
    /// - load the config file
    /// - validate that the data directory exists
    /// - return the loaded configuration object
    pub fn load(kodukai_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = kodukai_home.into();
        let root = utils::canonicalize(&maybe_relative).context("Kodukai home is missing")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path)?;

        let data_dir = match &config_file.data_dir {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => root.join(p),
            None => root.join(DATA),
        };
        if !data_dir.is_dir() {
            bail!("The data directory is missing '{}'", data_dir.display())
        }

        Ok(Self {
            root,
            config_path,
            config_file,
            data_dir,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Where exported sheets are read from.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn worksheet(&self) -> &str {
        &self.config_file.worksheet
    }

    pub fn columns(&self) -> &ColumnNames {
        &self.config_file.columns
    }

    pub fn case_sensitive_search(&self) -> bool {
        self.config_file.case_sensitive_search
    }

    /// A `Normalizer` that also accepts the configured timestamp formats.
    pub fn normalizer(&self) -> Normalizer {
        Normalizer::with_formats(
            self.config_file.datetime_formats.iter().map(String::as_str),
            self.config_file.date_formats.iter().map(String::as_str),
        )
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "kodukai",
///   "config_version": 1,
///   "worksheet": "kodukai-db",
///   "data_dir": "data",
///   "columns": {
///     "item": ["項目"],
///     "amount": ["金額"],
///     "timestamp": ["日時"],
///     "year_month": ["年月"]
///   },
///   "datetime_formats": ["%m/%d/%Y %H:%M:%S"],
///   "date_formats": ["%m/%d/%Y"],
///   "case_sensitive_search": false
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "kodukai"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// The worksheet holding the expense rows
    #[serde(default = "default_worksheet")]
    worksheet: String,

    /// Directory of exported sheets (relative to the home directory or absolute).
    /// Defaults to $KODUKAI_HOME/data if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_dir: Option<PathBuf>,

    /// Header names recognized for each field
    #[serde(default)]
    columns: ColumnNames,

    /// `chrono` formats tried after the built-in date-time formats
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    datetime_formats: Vec<String>,

    /// `chrono` formats tried after the built-in date formats
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    date_formats: Vec<String>,

    /// Whether `search` matches case by default
    #[serde(default)]
    case_sensitive_search: bool,
}

fn default_worksheet() -> String {
    DEFAULT_WORKSHEET.to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            worksheet: default_worksheet(),
            data_dir: None,
            columns: ColumnNames::default(),
            datetime_formats: Vec::new(),
            date_formats: Vec::new(),
            case_sensitive_search: false,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it was written by a newer
    /// version of this program.
    fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path)?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.config_version <= CONFIG_VERSION,
            "Unsupported config_version {} (newest supported is {})",
            config.config_version,
            CONFIG_VERSION
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path, data).context("Unable to write config file")
    }
}
