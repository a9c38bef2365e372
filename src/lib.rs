//! Kindle Price Tracker - e-book price history & drop alerts
//!
//! Checks Kindle store prices for tracked books, records hourly price
//! history in SQLite, and texts subscribers when a book hits a new low.

pub mod chart;
pub mod database;
pub mod error;
pub mod export;
pub mod kindle;
pub mod models;
pub mod sms;
pub mod tracker;
pub mod utils;

pub use database::{Database, Table};
pub use error::{Result, TrackerError};
pub use kindle::{KindleStore, PriceSource};
pub use models::{Book, PriceObservation};
pub use sms::{Credentials, Notifier, TwilioClient};
pub use tracker::{run, run_at, RunSummary};
