use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt::{Display, Formatter};

/// The four logical fields of an expense row.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Item,
    Amount,
    Timestamp,
    YearMonth,
}

serde_plain::derive_display_from_serialize!(Field);
serde_plain::derive_fromstr_from_deserialize!(Field);

impl Field {
    pub const ALL: [Field; 4] = [Field::Item, Field::Amount, Field::Timestamp, Field::YearMonth];

    /// The column a field occupies when the sheet's headers are not recognized.
    pub fn position(&self) -> usize {
        match self {
            Field::Item => 0,
            Field::Amount => 1,
            Field::Timestamp => 2,
            Field::YearMonth => 3,
        }
    }
}

/// The header names that are recognized for each field. Matching ignores case and surrounding
/// whitespace.
///
/// Example:
/// ```json
/// {
///   "item": ["item", "項目"],
///   "amount": ["amount", "金額"],
///   "timestamp": ["timestamp", "date", "datetime", "日時"],
///   "year_month": ["year_month", "yearmonth", "年月"]
/// }
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    item: Vec<String>,
    amount: Vec<String>,
    timestamp: Vec<String>,
    year_month: Vec<String>,
}

impl Default for ColumnNames {
    fn default() -> Self {
        fn names(v: &[&str]) -> Vec<String> {
            v.iter().map(|s| s.to_string()).collect()
        }
        Self {
            item: names(&["item", "項目"]),
            amount: names(&["amount", "金額"]),
            timestamp: names(&["timestamp", "date", "datetime", "日時"]),
            year_month: names(&["year_month", "yearmonth", "年月"]),
        }
    }
}

impl ColumnNames {
    pub fn new(
        item: Vec<String>,
        amount: Vec<String>,
        timestamp: Vec<String>,
        year_month: Vec<String>,
    ) -> Self {
        Self {
            item,
            amount,
            timestamp,
            year_month,
        }
    }

    pub fn aliases(&self, field: Field) -> &[String] {
        match field {
            Field::Item => &self.item,
            Field::Amount => &self.amount,
            Field::Timestamp => &self.timestamp,
            Field::YearMonth => &self.year_month,
        }
    }

    /// Returns the field that `header` names, if any.
    pub fn field_for(&self, header: &str) -> Option<Field> {
        let wanted = header.trim().to_lowercase();
        Field::ALL.into_iter().find(|&field| {
            self.aliases(field)
                .iter()
                .any(|alias| alias.trim().to_lowercase() == wanted)
        })
    }
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MappingError(String);

impl Display for MappingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl StdError for MappingError {}

/// Resolves the header row of a sheet to the column index of each `Field`.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct Mapping {
    headers: Vec<Header>,
    fields: BTreeMap<Field, usize>,
    positional: bool,
}

impl Mapping {
    /// Create a new `Mapping` from the header row. When none of the headers is recognized, the
    /// first four columns are taken as item, amount, timestamp and year-month, in that order.
    pub fn new<S, I>(headers: I, names: &ColumnNames) -> Result<Self, MappingError>
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        let headers: Vec<Header> = headers.into_iter().map(|s| s.into().into()).collect();
        let mut fields = BTreeMap::new();

        for (idx, header) in headers.iter().enumerate() {
            if let Some(field) = names.field_for(header.as_ref()) {
                if let Some(previous) = fields.insert(field, idx) {
                    return Err(MappingError(format!(
                        "Both column {previous} '{}' and column {idx} '{}' map to the {field} field",
                        headers[previous].as_ref(),
                        header.as_ref()
                    )));
                }
            }
        }

        let positional = fields.is_empty();
        if positional {
            fields = Field::ALL
                .into_iter()
                .filter(|field| field.position() < headers.len())
                .map(|field| (field, field.position()))
                .collect();
        }

        Ok(Self {
            headers,
            fields,
            positional,
        })
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    /// The column index holding `field`, if the sheet has one.
    pub fn index(&self, field: Field) -> Option<usize> {
        self.fields.get(&field).copied()
    }

    /// True when the headers were not recognized and columns were assigned by position.
    pub fn is_positional(&self) -> bool {
        self.positional
    }
}

/// Represents a header in the sheet, for example, `金額`
#[derive(Default, Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Header(String);

impl AsRef<str> for Header {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl<S: Into<String>> From<S> for Header {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_field_display() {
        assert_eq!(Field::YearMonth.to_string(), "year_month");
        assert_eq!("amount".parse::<Field>().unwrap(), Field::Amount);
    }

    #[test]
    fn test_field_for_ignores_case_and_whitespace() {
        let names = ColumnNames::default();
        assert_eq!(names.field_for(" Item "), Some(Field::Item));
        assert_eq!(names.field_for("金額"), Some(Field::Amount));
        assert_eq!(names.field_for("DATE"), Some(Field::Timestamp));
        assert_eq!(names.field_for("memo"), None);
    }

    #[test]
    fn test_mapping_by_name() {
        let mapping =
            Mapping::new(["年月", "memo", "金額", "項目", "日時"], &ColumnNames::default()).unwrap();
        assert!(!mapping.is_positional());
        assert_eq!(mapping.index(Field::YearMonth), Some(0));
        assert_eq!(mapping.index(Field::Amount), Some(2));
        assert_eq!(mapping.index(Field::Item), Some(3));
        assert_eq!(mapping.index(Field::Timestamp), Some(4));
    }

    #[test]
    fn test_mapping_partial_names_leave_gaps() {
        let mapping = Mapping::new(["item", "price"], &ColumnNames::default()).unwrap();
        assert_eq!(mapping.index(Field::Item), Some(0));
        assert_eq!(mapping.index(Field::Amount), None);
    }

    #[test]
    fn test_mapping_positional_fallback() {
        let mapping = Mapping::new(["a", "b", "c", "d", "e"], &ColumnNames::default()).unwrap();
        assert!(mapping.is_positional());
        for field in Field::ALL {
            assert_eq!(mapping.index(field), Some(field.position()));
        }
    }

    #[test]
    fn test_mapping_positional_short_header() {
        let mapping = Mapping::new(["a", "b"], &ColumnNames::default()).unwrap();
        assert_eq!(mapping.index(Field::Amount), Some(1));
        assert_eq!(mapping.index(Field::Timestamp), None);
    }

    #[test]
    fn test_mapping_duplicate_field() {
        let result = Mapping::new(["date", "日時", "item"], &ColumnNames::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_column_names_serde_defaults() {
        let names: ColumnNames = serde_json::from_str(r#"{"item": ["What"]}"#).unwrap();
        assert_eq!(names.field_for("what"), Some(Field::Item));
        assert_eq!(names.field_for("金額"), Some(Field::Amount));
    }
}
