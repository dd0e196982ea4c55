use crate::model::{Amount, YearMonth};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Reverse;

/// One validated expense entry. The year-month tag always matches the timestamp.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Record {
    item: String,
    amount: Amount,
    timestamp: NaiveDateTime,
    year_month: YearMonth,
}

impl Record {
    /// Creates a record, deriving its year-month from `timestamp`. The item is trimmed; `None` is
    /// returned if nothing is left or if the amount is not `in_range`.
    pub fn new(
        item: impl AsRef<str>,
        amount: impl Into<Amount>,
        timestamp: NaiveDateTime,
    ) -> Option<Self> {
        let item = item.as_ref().trim();
        let amount = amount.into();
        if item.is_empty() || !amount.in_range() {
            return None;
        }
        Some(Self {
            item: item.to_string(),
            amount,
            timestamp,
            year_month: YearMonth::of(&timestamp),
        })
    }

    pub fn item(&self) -> &str {
        &self.item
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// Shorthand for `self.amount().value()`.
    pub fn value(&self) -> Decimal {
        self.amount.value()
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// The calendar day of the timestamp, time-of-day discarded.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn year_month(&self) -> YearMonth {
        self.year_month
    }
}

/// An ordered collection of records. Order is the source row order, which is not necessarily
/// chronological.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Records {
    data: Vec<Record>,
}

impl Records {
    pub fn new(data: Vec<Record>) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &[Record] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.data.iter()
    }

    /// The signed sum of every amount.
    pub fn total(&self) -> Decimal {
        self.data
            .iter()
            .map(Record::value)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// A copy ordered by timestamp, latest first. Records with equal timestamps keep their
    /// relative order.
    pub fn newest_first(&self) -> Records {
        let mut data = self.data.clone();
        data.sort_by_key(|r| Reverse(r.timestamp));
        Self { data }
    }

    pub fn into_vec(self) -> Vec<Record> {
        self.data
    }
}

impl From<Vec<Record>> for Records {
    fn from(data: Vec<Record>) -> Self {
        Self::new(data)
    }
}

impl FromIterator<Record> for Records {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for Records {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl<'a> IntoIterator for &'a Records {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{dec, record};

    #[test]
    fn test_new_trims_item() {
        let r = record("  Coffee ", "300", "2024-01-05 08:00:00");
        assert_eq!(r.item(), "Coffee");
        assert_eq!(r.year_month().to_string(), "202401");
        assert_eq!(r.date().to_string(), "2024-01-05");
    }

    #[test]
    fn test_new_blank_item() {
        let ts = crate::test::ts("2024-01-05 08:00:00");
        assert!(Record::new("   ", dec("1"), ts).is_none());
    }

    #[test]
    fn test_total_nets_refunds() {
        let records: Records = vec![
            record("Shoes", "5000", "2024-01-05 10:00:00"),
            record("Shoes", "-5000", "2024-01-09 10:00:00"),
            record("Socks", "700", "2024-01-09 10:00:00"),
        ]
        .into();
        assert_eq!(records.total(), dec("700"));
    }

    #[test]
    fn test_newest_first_is_stable() {
        let records: Records = vec![
            record("A", "1", "2024-01-05 10:00:00"),
            record("B", "1", "2024-01-07 10:00:00"),
            record("C", "1", "2024-01-05 10:00:00"),
        ]
        .into();
        let sorted = records.newest_first();
        let items: Vec<&str> = sorted.iter().map(|r| r.item()).collect();
        assert_eq!(items, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_serialize() {
        let records: Records = vec![record("Coffee", "300", "2024-01-05 08:00:00")].into();
        let json = serde_json::to_value(&records).unwrap();
        assert_eq!(json[0]["item"], "Coffee");
        assert_eq!(json[0]["amount"], "300");
        assert_eq!(json[0]["year_month"], "202401");
        assert_eq!(json[0]["timestamp"], "2024-01-05T08:00:00");
    }
}
