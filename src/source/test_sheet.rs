//! Implements the `Sheet` trait using in-memory data.
//!
//! Note: this is compiled even in the "production" version of this app so that the whole app can
//! run, top-to-bottom, without any exported files.

use crate::source::Sheet;
use crate::Result;
use anyhow::Context;
use std::collections::HashMap;
use std::io::Cursor;

const WORKSHEET: &str = "kodukai-db";

/// An implementation of the `Sheet` trait that holds any data in memory and, by default, is seeded
/// with a few months of expenses.
pub struct TestSheet {
    data: HashMap<String, Vec<Vec<String>>>,
}

impl TestSheet {
    /// Create a new `TestSheet` using `data`. The map key is sheet name and the map value is the
    /// rows of the sheet.
    pub fn new(data: HashMap<String, Vec<Vec<String>>>) -> Self {
        Self { data }
    }
}

impl Sheet for TestSheet {
    fn get(&mut self, sheet_name: &str) -> Result<Vec<Vec<String>>> {
        self.data
            .get(sheet_name)
            .with_context(|| format!("Sheet '{sheet_name}' not found"))
            .cloned()
    }
}

impl Default for TestSheet {
    /// Loads the seed data from this module.
    fn default() -> Self {
        let mut data = HashMap::new();
        // The seed is a constant and is covered by tests.
        if let Ok(rows) = load_csv(EXPENSE_DATA) {
            data.insert(WORKSHEET.to_string(), rows);
        }
        Self::new(data)
    }
}

/// Loads data from a CSV-formatted string.
fn load_csv(csv_data: &str) -> Result<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(Cursor::new(csv_data.as_bytes()));

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }
    Ok(rows)
}

/// Seed expense data. Includes a blank amount, an unreadable date, a year-month that disagrees
/// with its timestamp, and a blank line.
const EXPENSE_DATA: &str = r##"項目,金額,日時,年月
Coffee,300,2024-01-05 08:10:00,202401
Lunch,980,2024-01-05 12:30:00,202401
コーヒー,¥250,2024/01/13 15:00,202401
Books,"2,400",2024-01-20 18:00:00,202401
Coffee,150,2024-01-20 09:00:00,202401.0
Books,-2400,2024-01-27 10:00:00,202401
Lunch,"1,100",2024-02-02 12:15:00,202402
Iced Coffee,420円,2024-02-10 14:00:00,202402
Rent,,2024-02-01,202402
,,,
Rent,65000,2024-02-25,202402
Lunch,870,2024-03-04 12:05:00,202402
Coffee,0.5,2024-03-09T07:45:00,202403
Taxi,2300,someday,202403
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_seed() {
        let mut sheet = TestSheet::default();
        let rows = sheet.get(WORKSHEET).unwrap();
        assert_eq!(rows[0], vec!["項目", "金額", "日時", "年月"]);
        assert_eq!(rows.len(), 15);
        assert_eq!(rows[4][1], "2,400");
    }

    #[test]
    fn test_unknown_sheet() {
        let mut sheet = TestSheet::default();
        assert!(sheet.get("Transactions").is_err());
    }
}
