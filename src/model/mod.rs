//! Types that represent the core data model, such as `Record` and `RawRow`.
mod amount;
mod mapping;
mod raw;
mod record;
mod year_month;

pub use amount::{Amount, AmountError, AmountFormat, Symbol};
pub use mapping::{ColumnNames, Field, Header, Mapping, MappingError};
pub use raw::{RawRow, RawRows};
pub use record::{Record, Records};
pub use year_month::{YearMonth, YearMonthError};
