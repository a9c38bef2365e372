//! Kindle store page scraping
//!
//! Uses blocking reqwest: the tracker runs one book at a time.

use crate::error::{Result, TrackerError};
use scraper::{Html, Selector};

/// Product pages live under `{STORE_URL}/dp/{asin}`
pub const STORE_URL: &str = "https://www.amazon.com";

/// Element id holding the displayed Kindle price
const PRICE_ELEMENT_ID: &str = "kindle-price";

/// Desktop browser headers; the store serves a stripped page to unknown clients
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 6.1) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/41.0.2228.0 Safari/537.36";
const ACCEPT_LANGUAGE: &str = "en-US, en;q=0.5";

/// Anything that can report the current price of a book
pub trait PriceSource {
    fn current_price(&self, asin: &str) -> Result<f64>;
}

/// Product page link for a book
pub fn product_url(asin: &str) -> String {
    format!("{}/dp/{}", STORE_URL, asin)
}

/// Scrapes prices from the Kindle store product pages
#[derive(Debug, Clone)]
pub struct KindleStore {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl Default for KindleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KindleStore {
    pub fn new() -> Self {
        Self::with_base_url(STORE_URL)
    }

    /// Point the scraper at another host (for testing with mock servers).
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the product page and read the Kindle price off it
    pub fn get_kindle_price(&self, asin: &str) -> Result<f64> {
        let url = format!("{}/dp/{}", self.base_url, asin);
        log::debug!("Fetching product page: {}", url);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
            .send()?;

        if !response.status().is_success() {
            return Err(TrackerError::HttpStatus(response.status()));
        }

        let body = response.text()?;
        let price = parse_kindle_price(asin, &body)?;
        log::info!("{}: ${}", asin, price);
        Ok(price)
    }
}

impl PriceSource for KindleStore {
    fn current_price(&self, asin: &str) -> Result<f64> {
        self.get_kindle_price(asin)
    }
}

/// Extract the Kindle price from a product page
pub fn parse_kindle_price(asin: &str, html: &str) -> Result<f64> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(&format!("#{}", PRICE_ELEMENT_ID)).map_err(|_| {
        TrackerError::PriceNotFound {
            asin: asin.to_string(),
        }
    })?;

    let element = document
        .select(&selector)
        .next()
        .ok_or_else(|| TrackerError::PriceNotFound {
            asin: asin.to_string(),
        })?;

    let text: String = element.text().collect();
    clean_price(&text).ok_or_else(|| TrackerError::InvalidPrice {
        asin: asin.to_string(),
        text: text.trim().to_string(),
    })
}

/// Strip currency formatting (`$1,299.99` -> 1299.99)
fn clean_price(text: &str) -> Option<f64> {
    text.trim()
        .replace(['$', ','], "")
        .parse::<f64>()
        .ok()
}

#[cfg(test)]
#[path = "kindle_tests.rs"]
mod tests;
