//! Turns raw rows into validated `Records`.
//!
//! Every row either becomes a `Record` or is rejected with a `RejectReason`; a rejected row never
//! stops the rest of the batch. A supplied year-month tag that disagrees with the timestamp does
//! not reject the row: the tag derived from the timestamp is used and the disagreement is reported.

use crate::model::{Amount, Field, RawRow, Record, Records, YearMonth};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use tracing::{debug, trace, warn};

const DEFAULT_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DEFAULT_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y年%m月%d日"];

/// Why a row was dropped.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    MissingItem,
    UnparseableAmount,
    UnparseableTimestamp,
}

serde_plain::derive_display_from_serialize!(RejectReason);
serde_plain::derive_fromstr_from_deserialize!(RejectReason);

/// A supplied year-month tag that was replaced by the one derived from the timestamp. `supplied`
/// holds the raw text, which may not have been a valid tag at all.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct YearMonthMismatch {
    supplied: String,
    derived: YearMonth,
}

impl YearMonthMismatch {
    pub fn supplied(&self) -> &str {
        &self.supplied
    }

    pub fn derived(&self) -> YearMonth {
        self.derived
    }
}

/// What went wrong with a row.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    /// The row was dropped.
    Rejected { reason: RejectReason },
    /// The row was kept with the derived year-month.
    YearMonthMismatch(YearMonthMismatch),
}

/// One problem found during normalization, with enough context to find the row in the source.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Diagnostic {
    /// Position of the row in the normalized input, starting at 0.
    index: usize,
    row: RawRow,
    issue: Issue,
}

impl Diagnostic {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn row(&self) -> &RawRow {
        &self.row
    }

    pub fn issue(&self) -> &Issue {
        &self.issue
    }

    /// The reject reason, if this diagnostic is for a dropped row.
    pub fn reject_reason(&self) -> Option<RejectReason> {
        match &self.issue {
            Issue::Rejected { reason } => Some(*reason),
            Issue::YearMonthMismatch(_) => None,
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.row.source_row() {
            Some(n) => write!(f, "row {n}")?,
            None => write!(f, "input {}", self.index)?,
        }
        if let Some(item) = self.row.get(Field::Item) {
            write!(f, " ('{item}')")?;
        }
        match &self.issue {
            Issue::Rejected { reason } => write!(f, " rejected: {reason}"),
            Issue::YearMonthMismatch(m) => write!(
                f,
                " year-month '{}' does not match the timestamp, using {}",
                m.supplied, m.derived
            ),
        }
    }
}

/// A row that passed validation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Accepted {
    record: Record,
    mismatch: Option<YearMonthMismatch>,
}

impl Accepted {
    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn mismatch(&self) -> Option<&YearMonthMismatch> {
        self.mismatch.as_ref()
    }

    pub fn into_parts(self) -> (Record, Option<YearMonthMismatch>) {
        (self.record, self.mismatch)
    }
}

/// The output of a normalization run: the valid records, in input order, and one diagnostic for
/// every rejected row and every year-month mismatch.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Normalized {
    records: Records,
    diagnostics: Vec<Diagnostic>,
}

impl Normalized {
    pub fn records(&self) -> &Records {
        &self.records
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Diagnostics for dropped rows.
    pub fn rejected(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.reject_reason().is_some())
    }

    /// Diagnostics for rows that were kept with a corrected year-month.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.reject_reason().is_none())
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected().count()
    }

    pub fn into_parts(self) -> (Records, Vec<Diagnostic>) {
        (self.records, self.diagnostics)
    }
}

/// Validates raw rows. Holds the timestamp formats that are accepted.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Normalizer {
    datetime_formats: Vec<String>,
    date_formats: Vec<String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            datetime_formats: DEFAULT_DATETIME_FORMATS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Normalizer {
    /// A normalizer that accepts the default formats plus the given `chrono` format strings.
    /// Date formats describe values without a time of day, which are taken as midnight.
    pub fn with_formats<S1, S2>(
        datetime_formats: impl IntoIterator<Item = S1>,
        date_formats: impl IntoIterator<Item = S2>,
    ) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        let mut normalizer = Self::default();
        normalizer
            .datetime_formats
            .extend(datetime_formats.into_iter().map(Into::into));
        normalizer
            .date_formats
            .extend(date_formats.into_iter().map(Into::into));
        normalizer
    }

    /// Parses RFC 3339 (the offset is dropped, keeping the local wall time) or any of the
    /// configured date-time and date formats.
    pub fn parse_timestamp(&self, s: &str) -> Option<NaiveDateTime> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.naive_local());
        }
        self.datetime_formats
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .or_else(|| {
                self.date_formats
                    .iter()
                    .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                    .map(|d| d.and_time(chrono::NaiveTime::MIN))
            })
    }

    /// Validates a single row. Checks run in the order item, amount, timestamp and the first
    /// failure is reported.
    pub fn normalize_row(&self, raw: &RawRow) -> Result<Accepted, RejectReason> {
        let item = raw.get(Field::Item).unwrap_or_default();
        if item.trim().is_empty() {
            return Err(RejectReason::MissingItem);
        }

        let amount = raw
            .get(Field::Amount)
            .and_then(|s| Amount::from_str(s).ok())
            .ok_or(RejectReason::UnparseableAmount)?;

        let timestamp = raw
            .get(Field::Timestamp)
            .and_then(|s| self.parse_timestamp(s))
            .ok_or(RejectReason::UnparseableTimestamp)?;

        // The item is known to be non-blank, so only the amount bound can refuse the record.
        let record =
            Record::new(item, amount, timestamp).ok_or(RejectReason::UnparseableAmount)?;

        let mismatch = raw
            .get(Field::YearMonth)
            .filter(|s| !s.trim().is_empty())
            .and_then(|supplied| match YearMonth::from_str(supplied) {
                Ok(ym) if ym == record.year_month() => None,
                _ => Some(YearMonthMismatch {
                    supplied: supplied.to_string(),
                    derived: record.year_month(),
                }),
            });

        Ok(Accepted { record, mismatch })
    }

    /// Validates every row. The source rows are not modified.
    pub fn normalize<I>(&self, rows: I) -> Normalized
    where
        I: IntoIterator<Item = RawRow>,
    {
        let mut records = Vec::new();
        let mut diagnostics = Vec::new();

        for (index, row) in rows.into_iter().enumerate() {
            match self.normalize_row(&row) {
                Ok(accepted) => {
                    let (record, mismatch) = accepted.into_parts();
                    records.push(record);
                    if let Some(mismatch) = mismatch {
                        diagnostics.push(Diagnostic {
                            index,
                            row,
                            issue: Issue::YearMonthMismatch(mismatch),
                        });
                    }
                }
                Err(reason) => {
                    let diagnostic = Diagnostic {
                        index,
                        row,
                        issue: Issue::Rejected { reason },
                    };
                    trace!("{diagnostic}");
                    diagnostics.push(diagnostic);
                }
            }
        }

        let normalized = Normalized {
            records: Records::new(records),
            diagnostics,
        };
        let rejected = normalized.rejected_count();
        if rejected > 0 {
            warn!("{rejected} row(s) were rejected during normalization");
        }
        debug!(
            "Normalized {} record(s) with {} diagnostic(s)",
            normalized.records.len(),
            normalized.diagnostics.len()
        );
        normalized
    }
}

/// Validates `rows` using the default timestamp formats.
pub fn normalize<I>(rows: I) -> Normalized
where
    I: IntoIterator<Item = RawRow>,
{
    Normalizer::default().normalize(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{dec, scenario_rows};

    fn ts(s: &str) -> NaiveDateTime {
        crate::test::ts(s)
    }

    #[test]
    fn test_scenario_rejects_rent() {
        let normalized = normalize(scenario_rows());
        assert_eq!(normalized.records().len(), 2);
        assert_eq!(normalized.diagnostics().len(), 1);
        let diagnostic = &normalized.diagnostics()[0];
        assert_eq!(diagnostic.index(), 2);
        assert_eq!(
            diagnostic.reject_reason(),
            Some(RejectReason::UnparseableAmount)
        );
        assert_eq!(diagnostic.row().get(Field::Item), Some("Rent"));
    }

    #[test]
    fn test_reject_reasons() {
        let n = Normalizer::default();
        let reason = |values: [&str; 4]| n.normalize_row(&RawRow::from_values(values)).err();
        assert_eq!(
            reason(["  ", "1", "2024-01-01", ""]),
            Some(RejectReason::MissingItem)
        );
        assert_eq!(
            reason(["Tea", "abc", "2024-01-01", ""]),
            Some(RejectReason::UnparseableAmount)
        );
        assert_eq!(
            reason(["Tea", "120", "yesterday", ""]),
            Some(RejectReason::UnparseableTimestamp)
        );
        // item is checked first
        assert_eq!(reason(["", "", "", ""]), Some(RejectReason::MissingItem));
    }

    #[test]
    fn test_missing_cells() {
        let n = Normalizer::default();
        let row = RawRow::default().with(Field::Item, "Tea");
        assert_eq!(
            n.normalize_row(&row).err(),
            Some(RejectReason::UnparseableAmount)
        );
        let row = row.with(Field::Amount, "120");
        assert_eq!(
            n.normalize_row(&row).err(),
            Some(RejectReason::UnparseableTimestamp)
        );
    }

    #[test]
    fn test_amount_with_symbols() {
        let n = Normalizer::default();
        let row = RawRow::from_values(["Books", "¥1,980", "2024-01-05", "202401"]);
        let accepted = n.normalize_row(&row).unwrap();
        assert_eq!(accepted.record().value(), dec("1980"));
        assert!(accepted.mismatch().is_none());
    }

    #[test]
    fn test_refund_is_preserved() {
        let normalized = normalize(vec![RawRow::from_values([
            "Refund",
            "-500",
            "2024-01-05",
            "202401",
        ])]);
        assert_eq!(normalized.records().data()[0].value(), dec("-500"));
    }

    #[test]
    fn test_double_sign_is_rejected() {
        let normalized = normalize(vec![
            RawRow::from_values(["Refund", "--500", "2024-01-05", "202401"]),
            RawRow::from_values(["Refund", "-¥-500", "2024-01-05", "202401"]),
            RawRow::from_values(["Refund", "-¥500", "2024-01-05", "202401"]),
        ]);
        assert_eq!(normalized.records().len(), 1);
        assert_eq!(normalized.records().data()[0].value(), dec("-500"));
        let reasons: Vec<Option<RejectReason>> = normalized
            .rejected()
            .map(Diagnostic::reject_reason)
            .collect();
        assert_eq!(
            reasons,
            vec![
                Some(RejectReason::UnparseableAmount),
                Some(RejectReason::UnparseableAmount)
            ]
        );
    }

    #[test]
    fn test_huge_amounts_are_rejected() {
        let normalized = normalize(vec![
            RawRow::from_values(["Car", "70000000000000000000000000000", "2024-01-05", ""]),
            RawRow::from_values(["Car", "70000000000000000000000000000", "2024-01-06", ""]),
            RawRow::from_values(["Coffee", "300", "2024-01-07", ""]),
        ]);
        assert_eq!(normalized.records().len(), 1);
        assert_eq!(normalized.rejected_count(), 2);
        let summary = crate::aggregate::by_month(normalized.records());
        assert_eq!(summary.total(), dec("300"));
    }

    #[test]
    fn test_year_month_mismatch_keeps_row() {
        let normalized = normalize(vec![RawRow::from_values([
            "Coffee",
            "300",
            "2024-01-31 23:00:00",
            "202402",
        ])]);
        assert_eq!(normalized.records().len(), 1);
        assert_eq!(
            normalized.records().data()[0].year_month().to_string(),
            "202401"
        );
        assert_eq!(normalized.rejected_count(), 0);
        let warnings: Vec<&Diagnostic> = normalized.warnings().collect();
        assert_eq!(warnings.len(), 1);
        match warnings[0].issue() {
            Issue::YearMonthMismatch(m) => {
                assert_eq!(m.supplied(), "202402");
                assert_eq!(m.derived().to_string(), "202401");
            }
            other => panic!("unexpected issue {other:?}"),
        }
    }

    #[test]
    fn test_year_month_garbage_is_a_warning() {
        let normalized = normalize(vec![RawRow::from_values([
            "Coffee",
            "300",
            "2024-01-05",
            "Jan",
        ])]);
        assert_eq!(normalized.records().len(), 1);
        assert_eq!(normalized.warnings().count(), 1);
    }

    #[test]
    fn test_year_month_blank_or_numeric_is_fine() {
        let normalized = normalize(vec![
            RawRow::from_values(["Coffee", "300", "2024-01-05"]),
            RawRow::from_values(["Coffee", "300", "2024-01-05", ""]),
            RawRow::from_values(["Coffee", "300", "2024-01-05", "202401.0"]),
            RawRow::from_values(["Coffee", "300", "2024-01-05", "202401.00"]),
        ]);
        assert_eq!(normalized.records().len(), 4);
        assert!(normalized.diagnostics().is_empty());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let n = Normalizer::default();
        assert_eq!(
            n.parse_timestamp("2024-01-05"),
            Some(ts("2024-01-05 00:00:00"))
        );
        assert_eq!(
            n.parse_timestamp("2024/1/5 9:30"),
            Some(ts("2024-01-05 09:30:00"))
        );
        assert_eq!(
            n.parse_timestamp("2024-01-05T09:30:15.250"),
            Some(ts("2024-01-05 09:30:15.250"))
        );
        assert_eq!(
            n.parse_timestamp("2024-01-05T09:30:00+09:00"),
            Some(ts("2024-01-05 09:30:00"))
        );
        assert_eq!(
            n.parse_timestamp("2024年1月5日"),
            Some(ts("2024-01-05 00:00:00"))
        );
        assert_eq!(n.parse_timestamp("05.01.2024"), None);
        assert_eq!(n.parse_timestamp(""), None);
    }

    #[test]
    fn test_extra_formats() {
        let n = Normalizer::with_formats(["%d.%m.%Y %H:%M"], ["%d.%m.%Y"]);
        assert_eq!(
            n.parse_timestamp("05.01.2024"),
            Some(ts("2024-01-05 00:00:00"))
        );
        assert_eq!(
            n.parse_timestamp("05.01.2024 18:45"),
            Some(ts("2024-01-05 18:45:00"))
        );
    }

    #[test]
    fn test_rejection_does_not_touch_other_rows() {
        let good = vec![
            RawRow::from_values(["Coffee", "300", "2024-01-05", "202401"]),
            RawRow::from_values(["Lunch", "900", "2024-01-06", "202401"]),
        ];
        let mut mixed = good.clone();
        mixed.insert(1, RawRow::from_values(["Broken", "n/a", "2024-01-05", "202401"]));
        mixed.push(RawRow::from_values(["", "100", "2024-01-05", "202401"]));

        let clean = normalize(good);
        let dirty = normalize(mixed);
        assert_eq!(clean.records(), dirty.records());
        assert_eq!(dirty.rejected_count(), 2);
        let indexes: Vec<usize> = dirty.rejected().map(Diagnostic::index).collect();
        assert_eq!(indexes, vec![1, 3]);
    }

    #[test]
    fn test_diagnostic_display() {
        let normalized = normalize(vec![RawRow::from_values(["Rent", "", "2024-02-01", "202402"])
            .with_source_row(4)]);
        let text = normalized.diagnostics()[0].to_string();
        assert_eq!(text, "row 4 ('Rent') rejected: unparseable_amount");
    }

    #[test]
    fn test_reject_reason_text() {
        assert_eq!(RejectReason::MissingItem.to_string(), "missing_item");
        assert_eq!(
            "unparseable_timestamp".parse::<RejectReason>().unwrap(),
            RejectReason::UnparseableTimestamp
        );
    }

    #[test]
    fn test_diagnostic_serialize() {
        let normalized = normalize(scenario_rows());
        let json = serde_json::to_value(normalized.diagnostics()).unwrap();
        assert_eq!(json[0]["issue"]["kind"], "rejected");
        assert_eq!(json[0]["issue"]["reason"], "unparseable_amount");
        assert_eq!(json[0]["row"]["item"], "Rent");
    }
}
