//! Error types for kindle_price_tracker

use thiserror::Error;

/// Unified error type for tracker operations
#[derive(Debug, Error)]
pub enum TrackerError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP error status code
    #[error("HTTP error: {0}")]
    HttpStatus(reqwest::StatusCode),
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Failed to parse JSON (credentials file or provider response)
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// Failed to write CSV output
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// Product page has no Kindle price element
    #[error("No Kindle price found on product page for {asin}")]
    PriceNotFound { asin: String },
    /// Kindle price element text is not a number
    #[error("Invalid Kindle price {text:?} for {asin}")]
    InvalidPrice { asin: String, text: String },
    /// Messaging provider rejected the message
    #[error("SMS rejected ({status}): {message}")]
    SmsRejected {
        status: reqwest::StatusCode,
        message: String,
    },
}

/// Result alias for tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;
