use crate::model::mapping::{ColumnNames, Field, Mapping};
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::trace;

/// One row as it came out of the source: four optional text cells that have not been validated.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RawRow {
    /// The 1-based row number in the sheet (the header is row 1), when the row came from a sheet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_row: Option<usize>,
    #[serde(default)]
    item: Option<String>,
    #[serde(default)]
    amount: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    year_month: Option<String>,
}

impl RawRow {
    /// Builds a row from positional values in the order item, amount, timestamp, year-month.
    /// Values past the fourth are ignored and missing trailing values stay unset.
    pub fn from_values<S, I>(values: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        let mut row = RawRow::default();
        for (field, value) in Field::ALL.into_iter().zip(values) {
            row.set(field, value);
        }
        row
    }

    /// Builds a row from a mapping-like record, e.g. one element of a spreadsheet client's
    /// "get all records" response. Keys are matched against `names`; unknown keys are ignored.
    /// JSON numbers and booleans are rendered as text and `null` is treated as missing.
    pub fn from_json(map: &Map<String, Value>, names: &ColumnNames) -> Self {
        let mut row = RawRow::default();
        for (key, value) in map {
            if let (Some(field), Some(cell)) = (names.field_for(key), json_cell(value)) {
                row.set(field, cell);
            }
        }
        row
    }

    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn with_source_row(mut self, source_row: usize) -> Self {
        self.source_row = Some(source_row);
        self
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = Some(value.into());
        match field {
            Field::Item => self.item = value,
            Field::Amount => self.amount = value,
            Field::Timestamp => self.timestamp = value,
            Field::YearMonth => self.year_month = value,
        }
    }

    /// The cell for `field`, or `None` if the cell was absent.
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Item => self.item.as_deref(),
            Field::Amount => self.amount.as_deref(),
            Field::Timestamp => self.timestamp.as_deref(),
            Field::YearMonth => self.year_month.as_deref(),
        }
    }

    pub fn source_row(&self) -> Option<usize> {
        self.source_row
    }
}

fn json_cell(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// The rows of a sheet together with the header mapping that was used to read them.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct RawRows {
    mapping: Mapping,
    data: Vec<RawRow>,
}

impl RawRows {
    /// Reads a sheet where the first row holds the headers. A sheet without any rows yields no
    /// data. Rows whose cells are all blank are skipped, and cells past the last header are
    /// ignored.
    ///
    /// Think of `table` as something that looks like `Vec<Vec<String>>`, i.e. rows.
    pub fn from_table<S, R, I>(table: I, names: &ColumnNames) -> Result<Self>
    where
        S: Into<String>,
        R: IntoIterator<Item = S>,
        I: IntoIterator<Item = R>,
    {
        let mut rows = table.into_iter();
        let mapping = match rows.next() {
            Some(header_row) => Mapping::new(header_row, names)?,
            None => return Ok(Self::default()),
        };

        let len = mapping.len();
        let mut data = Vec::new();

        for (row_ix, row) in rows.enumerate() {
            let values: Vec<String> = row.into_iter().map(|s| s.into()).collect();
            if values.iter().all(|v| v.trim().is_empty()) {
                continue;
            }
            if values.len() > len {
                trace!(
                    "Ignoring {} cell(s) past the headers at row {}",
                    values.len() - len,
                    row_ix + 2
                );
            }

            let mut raw = RawRow::default().with_source_row(row_ix + 2);
            for field in Field::ALL {
                if let Some(value) = mapping.index(field).and_then(|ix| values.get(ix)) {
                    raw.set(field, value.as_str());
                }
            }
            data.push(raw);
        }

        Ok(Self { mapping, data })
    }

    pub fn data(&self) -> &[RawRow] {
        &self.data
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_rows(self) -> Vec<RawRow> {
        self.data
    }
}
