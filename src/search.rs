//! Substring search over item names.
//!
//! The result is an ordinary `Records`, so it can be handed to the aggregation and time-series
//! functions unchanged.

use crate::aggregate::{self, MonthlySummary};
use crate::model::{Record, Records};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

/// Returns the records whose item contains `query`, in their original order. An empty query
/// matches everything. Unless `case_sensitive` is set, both sides are lowercased before matching.
pub fn search(records: &Records, query: &str, case_sensitive: bool) -> Records {
    let found: Records = if case_sensitive {
        records
            .iter()
            .filter(|r| r.item().contains(query))
            .cloned()
            .collect()
    } else {
        let needle = query.to_lowercase();
        records
            .iter()
            .filter(|r| r.item().to_lowercase().contains(&needle))
            .cloned()
            .collect()
    };
    debug!(
        "Search for '{query}' matched {} of {} record(s)",
        found.len(),
        records.len()
    );
    found
}

/// Everything shown for a search: the matches (latest first) with their totals and monthly trend.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SearchReport {
    query: String,
    case_sensitive: bool,
    total: Decimal,
    count: usize,
    mean: Option<Decimal>,
    by_month: MonthlySummary,
    matches: Records,
}

impl SearchReport {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// `None` when nothing matched.
    pub fn mean(&self) -> Option<Decimal> {
        self.mean
    }

    pub fn by_month(&self) -> &MonthlySummary {
        &self.by_month
    }

    /// The matching records, latest first.
    pub fn matches(&self) -> &Records {
        &self.matches
    }
}

/// Runs `search` and summarizes the matches.
pub fn report(records: &Records, query: &str, case_sensitive: bool) -> SearchReport {
    let found = search(records, query, case_sensitive);
    let total = found.total();
    let count = found.len();
    SearchReport {
        query: query.to_string(),
        case_sensitive,
        total,
        count,
        mean: aggregate::mean(total, count),
        by_month: aggregate::by_month(&found),
        matches: found.newest_first(),
    }
}

/// True if `record` would be returned by `search` for the same arguments.
pub fn matches(record: &Record, query: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        record.item().contains(query)
    } else {
        record.item().to_lowercase().contains(&query.to_lowercase())
    }
}
