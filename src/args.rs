//! These structs provide the CLI interface for the kodukai CLI.

use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// kodukai: A command-line tool for analysing household expenses.
///
/// Reads the expense worksheet (item, amount, timestamp and year-month columns) exported as CSV
/// and reports monthly totals, spending per item, searches over item names, and daily and weekday
/// totals. Rows that cannot be read are reported by the diagnostics command.
#[derive(Debug, Parser, Clone)]
#[command(version)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the kodukai home directory and a default configuration file.
    ///
    /// Afterwards, export the worksheet named in the configuration (by default `kodukai-db`) as
    /// CSV into the `data` directory, e.g. `$HOME/kodukai/data/kodukai-db.csv`.
    Init,
    /// Record count, total, and the period covered.
    Overview,
    /// Total, count and mean per year-month, with statistics across months.
    Monthly,
    /// Items ranked by total spending.
    Categories(CategoriesArgs),
    /// Records whose item contains a search term.
    Search(SearchArgs),
    /// Total, count and mean per calendar day.
    Daily,
    /// Total, count and mean per weekday, 0 = Monday through 6 = Sunday.
    Weekdays,
    /// Rows that were rejected or whose year-month was corrected.
    Diagnostics,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where kodukai configuration and data is held. Defaults to ~/kodukai
    #[arg(long, env = "KODUKAI_HOME", default_value_t = default_kodukai_home())]
    kodukai_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, kodukai_home: PathBuf) -> Self {
        Self {
            log_level,
            kodukai_home: kodukai_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn kodukai_home(&self) -> &DisplayPath {
        &self.kodukai_home
    }
}

/// Args for the `kodukai categories` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct CategoriesArgs {
    /// Only show the first N items of the ranking.
    #[arg(long)]
    top: Option<usize>,
}

impl CategoriesArgs {
    pub fn new(top: Option<usize>) -> Self {
        Self { top }
    }

    pub fn top(&self) -> Option<usize> {
        self.top
    }
}

/// Args for the `kodukai search` command.
#[derive(Debug, Parser, Clone)]
pub struct SearchArgs {
    /// The text to look for in item names.
    query: String,

    /// Match upper and lower case exactly. Without this flag or --ignore-case the
    /// `case_sensitive_search` setting of the configuration file applies.
    #[arg(long, conflicts_with = "ignore_case")]
    case_sensitive: bool,

    /// Ignore case even if the configuration file asks for case-sensitive search.
    #[arg(long)]
    ignore_case: bool,
}

impl SearchArgs {
    /// `case_sensitive` of `None` leaves the choice to the configuration file.
    pub fn new(query: impl Into<String>, case_sensitive: Option<bool>) -> Self {
        Self {
            query: query.into(),
            case_sensitive: case_sensitive == Some(true),
            ignore_case: case_sensitive == Some(false),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// `Some(true)` for --case-sensitive, `Some(false)` for --ignore-case, otherwise `None`.
    pub fn case_sensitive(&self) -> Option<bool> {
        match (self.case_sensitive, self.ignore_case) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

fn default_kodukai_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("kodukai"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --kodukai-home or KODUKAI_HOME instead of relying on the default \
                kodukai home directory.",
            );
            PathBuf::from("kodukai")
        }
    })
}

/// A `PathBuf` that clap can use as a default value.
#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search() {
        let args = Args::try_parse_from([
            "kodukai",
            "--kodukai-home",
            "/tmp/k",
            "--log-level",
            "debug",
            "search",
            "Coffee",
            "--case-sensitive",
        ])
        .unwrap();
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
        assert_eq!(args.common().kodukai_home().path(), Path::new("/tmp/k"));
        match args.command() {
            Command::Search(search) => {
                assert_eq!(search.query(), "Coffee");
                assert_eq!(search.case_sensitive(), Some(true));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    fn search_case(argv: &[&str]) -> clap::error::Result<Option<bool>> {
        let args = Args::try_parse_from(argv)?;
        match args.command() {
            Command::Search(search) => Ok(search.case_sensitive()),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_search_case_flags() {
        assert_eq!(search_case(&["kodukai", "search", "tea"]).unwrap(), None);
        assert_eq!(
            search_case(&["kodukai", "search", "tea", "--ignore-case"]).unwrap(),
            Some(false)
        );
        let both = ["kodukai", "search", "tea", "--ignore-case", "--case-sensitive"];
        assert!(search_case(&both).is_err());
        assert_eq!(SearchArgs::new("tea", Some(false)).case_sensitive(), Some(false));
        assert_eq!(SearchArgs::new("tea", None).case_sensitive(), None);
    }

    #[test]
    fn test_parse_categories_top() {
        let args = Args::try_parse_from(["kodukai", "categories", "--top", "10"]).unwrap();
        match args.command() {
            Command::Categories(categories) => assert_eq!(categories.top(), Some(10)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_requires_command() {
        assert!(Args::try_parse_from(["kodukai"]).is_err());
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        <Args as CommandFactory>::command().debug_assert();
    }
}
