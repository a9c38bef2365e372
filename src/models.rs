//! Row types for the tracker database

/// A tracked Kindle title
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub asin: String,
    pub title: String,
    /// Lowest price seen since tracking began (unset until the first check)
    pub lowest_price: Option<f64>,
    pub lowest_price_timestamp: Option<String>,
}

/// One hour-bucketed price reading
#[derive(Debug, Clone, PartialEq)]
pub struct PriceObservation {
    pub asin: String,
    pub price: f64,
    pub timestamp: String,
}
