//! kodukai: analysis of household expense records.
//!
//! Raw rows from a spreadsheet are validated into `Record`s by `ingest`, then summarized per
//! month and per item (`aggregate`), searched by item name (`search`), and bucketed by day and
//! weekday (`timeseries`).

pub mod aggregate;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod ingest;
pub mod model;
pub mod overview;
pub mod search;
pub mod source;
pub mod timeseries;
mod utils;


pub use config::Config;
pub use error::Error;
pub use error::Result;
