//! Grouped summaries of records by year-month and by item.
//!
//! Sums are exact `Decimal` additions, so the result does not depend on record order. Groups
//! without records are never emitted, and an empty input produces an empty summary.

use crate::model::{Record, Records, YearMonth};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Means are rounded to this many decimal places.
const MEAN_DP: u32 = 2;

/// `total / count`, rounded to two decimal places. `None` when `count` is zero.
pub fn mean(total: Decimal, count: usize) -> Option<Decimal> {
    if count == 0 {
        return None;
    }
    total
        .checked_div(Decimal::from(count))
        .map(|m| m.round_dp_with_strategy(MEAN_DP, RoundingStrategy::MidpointAwayFromZero))
}

/// Sum, count and mean of a group.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct Aggregate {
    total: Decimal,
    count: usize,
    mean: Decimal,
}

impl Aggregate {
    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> Decimal {
        self.mean
    }
}

/// Sum, count, mean, smallest and largest amount of one item.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct CategoryStats {
    total: Decimal,
    count: usize,
    mean: Decimal,
    min: Decimal,
    max: Decimal,
}

impl CategoryStats {
    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> Decimal {
        self.mean
    }

    pub fn min(&self) -> Decimal {
        self.min
    }

    pub fn max(&self) -> Decimal {
        self.max
    }
}

/// Running totals for one group. Only ever created from a record, so `count` is at least one.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Accumulator {
    total: Decimal,
    count: usize,
    min: Decimal,
    max: Decimal,
}

impl Accumulator {
    pub(crate) fn new(value: Decimal) -> Self {
        Self {
            total: value,
            count: 1,
            min: value,
            max: value,
        }
    }

    pub(crate) fn add(&mut self, value: Decimal) {
        self.total = self.total.saturating_add(value);
        self.count += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    fn mean(&self) -> Decimal {
        mean(self.total, self.count).unwrap_or_default()
    }

    pub(crate) fn aggregate(&self) -> Aggregate {
        Aggregate {
            total: self.total,
            count: self.count,
            mean: self.mean(),
        }
    }

    pub(crate) fn category_stats(&self) -> CategoryStats {
        CategoryStats {
            total: self.total,
            count: self.count,
            mean: self.mean(),
            min: self.min,
            max: self.max,
        }
    }
}

/// Groups `records` by `key` and accumulates their amounts.
pub(crate) fn group_by<'a, K, F, I>(records: I, key: F) -> BTreeMap<K, Accumulator>
where
    K: Ord,
    F: Fn(&Record) -> K,
    I: IntoIterator<Item = &'a Record>,
{
    let mut groups: BTreeMap<K, Accumulator> = BTreeMap::new();
    for record in records {
        let value = record.value();
        groups
            .entry(key(record))
            .and_modify(|acc| acc.add(value))
            .or_insert_with(|| Accumulator::new(value));
    }
    groups
}

/// Totals per year-month, iterated in ascending year-month order.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MonthlySummary(BTreeMap<YearMonth, Aggregate>);

impl MonthlySummary {
    pub fn get(&self, year_month: &YearMonth) -> Option<&Aggregate> {
        self.0.get(year_month)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&YearMonth, &Aggregate)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The sum of every month's total.
    pub fn total(&self) -> Decimal {
        self.0
            .values()
            .map(Aggregate::total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// The number of records over all months.
    pub fn count(&self) -> usize {
        self.0.values().map(Aggregate::count).sum()
    }

    /// Statistics over the monthly totals, or `None` when there are no months.
    pub fn stats(&self) -> Option<MonthlyStats> {
        let totals: Vec<Decimal> = self.0.values().map(Aggregate::total).collect();
        let highest = totals.iter().copied().max()?;
        let lowest = totals.iter().copied().min()?;
        Some(MonthlyStats {
            months: totals.len(),
            mean_total: mean(self.total(), totals.len())?,
            highest_total: highest,
            lowest_total: lowest,
        })
    }
}

/// Statistics across the months of a `MonthlySummary`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct MonthlyStats {
    pub months: usize,
    pub mean_total: Decimal,
    pub highest_total: Decimal,
    pub lowest_total: Decimal,
}

/// Statistics per item, iterated in item order.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CategorySummary(BTreeMap<String, CategoryStats>);

impl CategorySummary {
    pub fn get(&self, item: &str) -> Option<&CategoryStats> {
        self.0.get(item)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CategoryStats)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> Decimal {
        self.0
            .values()
            .map(CategoryStats::total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    pub fn count(&self) -> usize {
        self.0.values().map(CategoryStats::count).sum()
    }

    /// Items ordered by total, largest first. Equal totals are ordered by item.
    pub fn ranked(&self) -> Vec<(String, CategoryStats)> {
        let mut ranked: Vec<(String, CategoryStats)> =
            self.0.iter().map(|(k, v)| (k.clone(), *v)).collect();
        ranked.sort_by(|(a_item, a), (b_item, b)| match b.total.cmp(&a.total) {
            Ordering::Equal => a_item.cmp(b_item),
            other => other,
        });
        ranked
    }

    /// The first `n` entries of `ranked`.
    pub fn top(&self, n: usize) -> Vec<(String, CategoryStats)> {
        let mut ranked = self.ranked();
        ranked.truncate(n);
        ranked
    }
}

/// Groups records by their year-month tag.
pub fn by_month(records: &Records) -> MonthlySummary {
    MonthlySummary(
        group_by(records, Record::year_month)
            .into_iter()
            .map(|(k, acc)| (k, acc.aggregate()))
            .collect(),
    )
}

/// Groups records by exact item text.
pub fn by_category(records: &Records) -> CategorySummary {
    CategorySummary(
        group_by(records, |r| r.item().to_string())
            .into_iter()
            .map(|(k, acc)| (k, acc.category_stats()))
            .collect(),
    )
}
