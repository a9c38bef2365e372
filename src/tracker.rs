//! The check-and-notify cycle
//!
//! One pass over every tracked book: fetch the current price, record it,
//! and text subscribers when it undercuts the lowest price seen so far.
//! The first error aborts the pass; nothing is retried.

use crate::database::Database;
use crate::error::Result;
use crate::kindle::{product_url, PriceSource};
use crate::models::Book;
use crate::sms::Notifier;
use crate::utils::utc_now_floor;

/// How a fetched price relates to the stored lowest price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceCheck {
    /// No lowest price stored yet; the fetched price becomes the baseline.
    ///
    /// Seeding the low without notifying anyone is a chosen policy, not the
    /// only reading: a missing low could instead be treated as infinite
    /// (alert on the first check) or as an error that stops the run.
    FirstPrice,
    /// Strictly below the stored lowest price
    NewLow,
    /// Equal to or above the stored lowest price
    NoChange,
}

/// Compare a fetched price with the stored lowest price
pub fn assess_price(lowest_price: Option<f64>, price: f64) -> PriceCheck {
    match lowest_price {
        None => PriceCheck::FirstPrice,
        Some(lowest) if price < lowest => PriceCheck::NewLow,
        Some(_) => PriceCheck::NoChange,
    }
}

/// Text sent to subscribers when a book hits a new low
pub fn drop_message(book: &Book, price: f64) -> String {
    format!(
        "'{}' has dropped to a low of ${:.2}! ({})",
        book.title,
        price,
        product_url(&book.asin)
    )
}

/// Counters for one completed pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub books_checked: usize,
    pub first_prices: usize,
    pub new_lows: usize,
    pub notifications_sent: usize,
}

/// Check every tracked book once, stamping observations with the current hour
pub fn run(db: &Database, prices: &impl PriceSource, notifier: &impl Notifier) -> Result<RunSummary> {
    run_at(db, prices, notifier, &utc_now_floor())
}

/// Check every tracked book once, stamping observations with `timestamp`
pub fn run_at(
    db: &Database,
    prices: &impl PriceSource,
    notifier: &impl Notifier,
    timestamp: &str,
) -> Result<RunSummary> {
    let books = db.get_books()?;
    log::info!("Checking {} book(s) at {}", books.len(), timestamp);

    let mut summary = RunSummary::default();

    for book in &books {
        let price = prices.current_price(&book.asin)?;
        db.insert_price_data(&book.asin, price, timestamp)?;
        summary.books_checked += 1;

        match assess_price(book.lowest_price, price) {
            PriceCheck::FirstPrice => {
                log::info!("'{}': first price ${:.2}", book.title, price);
                db.update_lowest_price(&book.asin, price, timestamp)?;
                summary.first_prices += 1;
            }
            PriceCheck::NewLow => {
                log::info!(
                    "'{}': new low ${:.2} (was ${:.2})",
                    book.title,
                    price,
                    book.lowest_price.unwrap_or_default()
                );
                db.update_lowest_price(&book.asin, price, timestamp)?;
                summary.new_lows += 1;

                let message = drop_message(book, price);
                for number in db.get_users_with_book(&book.asin)? {
                    notifier.send_sms(&message, number)?;
                    summary.notifications_sent += 1;
                }
            }
            PriceCheck::NoChange => {
                log::debug!("'{}': ${:.2}, no new low", book.title, price);
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dune() -> Book {
        Book {
            asin: "B000FC1PJI".to_string(),
            title: "Dune".to_string(),
            lowest_price: Some(9.99),
            lowest_price_timestamp: Some("2026-01-01T00:00:00Z".to_string()),
        }
    }

    #[test]
    fn assess_price_strictly_lower_is_new_low() {
        assert_eq!(assess_price(Some(9.99), 7.99), PriceCheck::NewLow);
    }

    #[test]
    fn assess_price_equal_is_no_change() {
        assert_eq!(assess_price(Some(9.99), 9.99), PriceCheck::NoChange);
    }

    #[test]
    fn assess_price_higher_is_no_change() {
        assert_eq!(assess_price(Some(9.99), 12.99), PriceCheck::NoChange);
    }

    #[test]
    fn assess_price_without_stored_low_is_first_price() {
        assert_eq!(assess_price(None, 12.99), PriceCheck::FirstPrice);
    }

    #[test]
    fn drop_message_names_title_price_and_link() {
        assert_eq!(
            drop_message(&dune(), 7.99),
            "'Dune' has dropped to a low of $7.99! (https://www.amazon.com/dp/B000FC1PJI)"
        );
    }

    #[test]
    fn drop_message_pads_cents() {
        assert!(drop_message(&dune(), 8.0).contains("$8.00!"));
    }
}
