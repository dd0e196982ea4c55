//! The analysis commands. Each one loads the records and prints one engine result.

use crate::aggregate::{self, CategoryStats, MonthlyStats, MonthlySummary};
use crate::commands::{load, Out};
use crate::overview::Overview;
use crate::search::SearchReport;
use crate::source::Mode;
use crate::timeseries::{self, DailySummary, WeekdaySummary};
use crate::{Config, Result};
use serde::Serialize;

/// Totals per year-month along with statistics across the months.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyReport {
    pub months: MonthlySummary,
    pub stats: Option<MonthlyStats>,
}

/// One entry of the category ranking.
#[derive(Debug, Clone, Serialize)]
pub struct RankedCategory {
    pub rank: usize,
    pub item: String,
    #[serde(flatten)]
    pub stats: CategoryStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoriesReport {
    /// The number of distinct items before truncation.
    pub items: usize,
    pub ranking: Vec<RankedCategory>,
}

pub fn overview(config: &Config, mode: Mode) -> Result<Out<Overview>> {
    let normalized = load(config, mode)?;
    let overview = crate::overview::overview(normalized.records());
    let message = format!(
        "{} record(s) totalling {} over {} month(s)",
        overview.count, overview.total, overview.months
    );
    Ok(Out::new(message, overview))
}

pub fn monthly(config: &Config, mode: Mode) -> Result<Out<MonthlyReport>> {
    let normalized = load(config, mode)?;
    let months = aggregate::by_month(normalized.records());
    let stats = months.stats();
    let message = match &stats {
        Some(s) => format!(
            "{} month(s), mean monthly total {}, highest {}, lowest {}",
            s.months, s.mean_total, s.highest_total, s.lowest_total
        ),
        None => "No records".to_string(),
    };
    Ok(Out::new(message, MonthlyReport { months, stats }))
}

/// Ranks items by total spending. `top` limits the ranking to its first entries.
pub fn categories(config: &Config, mode: Mode, top: Option<usize>) -> Result<Out<CategoriesReport>> {
    let normalized = load(config, mode)?;
    let summary = aggregate::by_category(normalized.records());
    let ranked = match top {
        Some(n) => summary.top(n),
        None => summary.ranked(),
    };
    let ranking: Vec<RankedCategory> = ranked
        .into_iter()
        .enumerate()
        .map(|(ix, (item, stats))| RankedCategory {
            rank: ix + 1,
            item,
            stats,
        })
        .collect();
    let message = format!("Showing {} of {} item(s)", ranking.len(), summary.len());
    Ok(Out::new(
        message,
        CategoriesReport {
            items: summary.len(),
            ranking,
        },
    ))
}

/// Searches item names for `query`. When `case_sensitive` is `None` the configured default
/// applies.
pub fn search(
    config: &Config,
    mode: Mode,
    query: &str,
    case_sensitive: Option<bool>,
) -> Result<Out<SearchReport>> {
    let normalized = load(config, mode)?;
    let case_sensitive = case_sensitive.unwrap_or_else(|| config.case_sensitive_search());
    let report = crate::search::report(normalized.records(), query, case_sensitive);
    let message = match report.mean() {
        Some(mean) => format!(
            "'{query}' matched {} record(s) totalling {} (mean {mean})",
            report.count(),
            report.total()
        ),
        None => format!("'{query}' matched nothing"),
    };
    Ok(Out::new(message, report))
}

pub fn daily(config: &Config, mode: Mode) -> Result<Out<DailySummary>> {
    let normalized = load(config, mode)?;
    let days = timeseries::by_day(normalized.records());
    let message = format!("{} day(s) with spending", days.len());
    Ok(Out::new(message, days))
}

/// Totals per weekday, 0 = Monday through 6 = Sunday.
pub fn weekdays(config: &Config, mode: Mode) -> Result<Out<WeekdaySummary>> {
    let normalized = load(config, mode)?;
    let weekdays = timeseries::by_weekday(normalized.records());
    let message = format!("{} weekday(s) with spending", weekdays.len());
    Ok(Out::new(message, weekdays))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::dec;
    use tempfile::TempDir;

    fn config() -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path()).unwrap();
        (dir, config)
    }

    #[test]
    fn test_overview() {
        let (_dir, config) = config();
        let out = overview(&config, Mode::Test).unwrap();
        let o = out.structure().unwrap();
        assert_eq!(o.count, 11);
        assert_eq!(o.total, dec("69070.5"));
        assert_eq!(o.months, 3);
    }

    #[test]
    fn test_monthly() {
        let (_dir, config) = config();
        let out = monthly(&config, Mode::Test).unwrap();
        let report = out.structure().unwrap();
        assert_eq!(report.months.len(), 3);
        let stats = report.stats.unwrap();
        assert_eq!(stats.highest_total, dec("66520"));
        assert_eq!(stats.lowest_total, dec("870.5"));
    }

    #[test]
    fn test_categories_top() {
        let (_dir, config) = config();
        let out = categories(&config, Mode::Test, Some(2)).unwrap();
        let report = out.structure().unwrap();
        assert_eq!(report.items, 6);
        assert_eq!(report.ranking.len(), 2);
        assert_eq!(report.ranking[0].item, "Rent");
        assert_eq!(report.ranking[0].rank, 1);
        assert_eq!(report.ranking[1].item, "Lunch");

        let json = serde_json::to_value(report).unwrap();
        assert_eq!(json["ranking"][1]["total"], "2950");
    }

    #[test]
    fn test_search() {
        let (_dir, config) = config();
        let out = search(&config, Mode::Test, "coffee", None).unwrap();
        let report = out.structure().unwrap();
        assert_eq!(report.count(), 4);
        assert_eq!(report.total(), dec("870.5"));
        assert_eq!(report.matches().iter().next().unwrap().item(), "Coffee");

        let out = search(&config, Mode::Test, "coffee", Some(true)).unwrap();
        assert_eq!(out.structure().unwrap().count(), 0);
        assert!(out.message().contains("matched nothing"));
    }

    #[test]
    fn test_search_overrides_configured_case() {
        let (dir, _) = config();
        std::fs::write(
            dir.path().join("config.json"),
            r#"{"app_name": "kodukai", "config_version": 1, "case_sensitive_search": true}"#,
        )
        .unwrap();
        let config = Config::load(dir.path()).unwrap();

        let configured = search(&config, Mode::Test, "coffee", None).unwrap();
        assert_eq!(configured.structure().unwrap().count(), 0);
        let ignoring_case = search(&config, Mode::Test, "coffee", Some(false)).unwrap();
        assert_eq!(ignoring_case.structure().unwrap().count(), 4);
    }

    #[test]
    fn test_calendar() {
        let (_dir, config) = config();
        let days = daily(&config, Mode::Test).unwrap();
        assert_eq!(days.structure().unwrap().count(), 11);
        let weekdays = weekdays(&config, Mode::Test).unwrap();
        assert_eq!(weekdays.structure().unwrap().total(), dec("69070.5"));
    }

    #[test]
    fn test_missing_export() {
        let (_dir, config) = config();
        assert!(overview(&config, Mode::Csv).is_err());
    }
}
