//! Price history chart
//!
//! Joins books with their price history and writes a standalone HTML page
//! (plotly.js) with one line per book. Times are shown in US/Mountain.

use crate::database::Database;
use crate::error::Result;
use crate::models::{Book, PriceObservation};
use chrono::DateTime;
use chrono_tz::US::Mountain;
use serde::Serialize;
use std::path::Path;

/// Titles longer than this are cut in the legend
pub const TITLE_LIMIT: usize = 30;

/// Default output file for the chart
pub const CHART_FILE: &str = "price_history.html";

const TEMPLATE: &str = include_str!("../static/chart.html");
const TRACES_PLACEHOLDER: &str = "__TRACES__";

/// One plotly scatter trace (a single book's history)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<f64>,
    pub mode: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// Chart data for every book that has at least one observation
#[derive(Debug, Clone, PartialEq)]
pub struct PriceChart {
    pub traces: Vec<Trace>,
}

impl PriceChart {
    /// Join books and observations on ASIN, one trace per book in book order
    pub fn build(books: &[Book], observations: &[PriceObservation]) -> Self {
        let traces = books
            .iter()
            .filter_map(|book| {
                let mut points: Vec<&PriceObservation> = observations
                    .iter()
                    .filter(|obs| obs.asin == book.asin)
                    .collect();
                if points.is_empty() {
                    return None;
                }
                points.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

                Some(Trace {
                    name: truncate_title(&book.title),
                    x: points.iter().map(|p| to_mountain_time(&p.timestamp)).collect(),
                    y: points.iter().map(|p| p.price).collect(),
                    mode: "lines+markers",
                    kind: "scatter",
                })
            })
            .collect();

        Self { traces }
    }

    /// Render the chart as a complete HTML page
    pub fn render_html(&self) -> Result<String> {
        // keep titles from closing the inline <script>
        let traces = serde_json::to_string(&self.traces)?.replace("</", "<\\/");
        Ok(TEMPLATE.replace(TRACES_PLACEHOLDER, &traces))
    }
}

/// Load all price history and write the chart to `output`
pub fn plot_price_data(db: &Database, output: &Path) -> Result<()> {
    let books = db.get_books()?;
    let observations = db.get_price_data()?;
    let chart = PriceChart::build(&books, &observations);

    std::fs::write(output, chart.render_html()?)?;
    log::info!(
        "Wrote chart with {} book(s) to {}",
        chart.traces.len(),
        output.display()
    );
    Ok(())
}

/// Cut titles over [`TITLE_LIMIT`] characters and mark them with `...`
pub fn truncate_title(title: &str) -> String {
    if title.chars().count() > TITLE_LIMIT {
        let cut: String = title.chars().take(TITLE_LIMIT).collect();
        format!("{}...", cut.trim())
    } else {
        title.to_string()
    }
}

/// Convert a stored UTC timestamp to US/Mountain; unparsable values pass through
fn to_mountain_time(timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(time) => time
            .with_timezone(&Mountain)
            .format("%Y-%m-%d %H:%M:%S%:z")
            .to_string(),
        Err(_) => timestamp.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(asin: &str, title: &str) -> Book {
        Book {
            asin: asin.to_string(),
            title: title.to_string(),
            lowest_price: None,
            lowest_price_timestamp: None,
        }
    }

    fn obs(asin: &str, price: f64, timestamp: &str) -> PriceObservation {
        PriceObservation {
            asin: asin.to_string(),
            price,
            timestamp: timestamp.to_string(),
        }
    }

    #[test]
    fn truncate_title_keeps_short_titles() {
        assert_eq!(truncate_title("Dune"), "Dune");
        let exact = "a".repeat(TITLE_LIMIT);
        assert_eq!(truncate_title(&exact), exact);
    }

    #[test]
    fn truncate_title_cuts_long_titles() {
        let title = "The Hitchhiker's Guide to the Galaxy";
        assert_eq!(truncate_title(title), "The Hitchhiker's Guide to the...");
    }

    #[test]
    fn truncate_title_trims_before_ellipsis() {
        // 30th character is a space
        let title = "Harry Potter and the Order of the Phoenix";
        assert_eq!(truncate_title(title), "Harry Potter and the Order of...");
    }

    #[test]
    fn to_mountain_time_converts_from_utc() {
        // January: MST (UTC-7)
        assert_eq!(
            to_mountain_time("2026-01-15T10:00:00Z"),
            "2026-01-15 03:00:00-07:00"
        );
        // July: MDT (UTC-6)
        assert_eq!(
            to_mountain_time("2026-07-15T10:00:00Z"),
            "2026-07-15 04:00:00-06:00"
        );
    }

    #[test]
    fn to_mountain_time_passes_through_garbage() {
        assert_eq!(to_mountain_time("yesterday"), "yesterday");
    }

    #[test]
    fn build_one_trace_per_book_with_data() {
        let books = vec![
            book("A", "Dune"),
            book("B", "Foundation"),
            book("C", "Never priced"),
        ];
        let observations = vec![
            obs("A", 9.99, "2026-01-15T11:00:00Z"),
            obs("B", 4.99, "2026-01-15T10:00:00Z"),
            obs("A", 7.99, "2026-01-15T10:00:00Z"),
        ];

        let chart = PriceChart::build(&books, &observations);
        assert_eq!(chart.traces.len(), 2);

        let dune = &chart.traces[0];
        assert_eq!(dune.name, "Dune");
        assert_eq!(dune.y, vec![7.99, 9.99]);
        assert_eq!(
            dune.x,
            vec!["2026-01-15 03:00:00-07:00", "2026-01-15 04:00:00-07:00"]
        );

        assert_eq!(chart.traces[1].name, "Foundation");
        assert_eq!(chart.traces[1].y, vec![4.99]);
    }

    #[test]
    fn render_html_embeds_traces() {
        let chart = PriceChart::build(
            &[book("A", "Dune")],
            &[obs("A", 7.99, "2026-01-15T10:00:00Z")],
        );
        let html = chart.render_html().unwrap();

        assert!(!html.contains(TRACES_PLACEHOLDER));
        assert!(html.contains(r#""name":"Dune""#));
        assert!(html.contains(r#""mode":"lines+markers""#));
        assert!(html.contains(r#""type":"scatter""#));
        assert!(html.contains("Kindle Price Tracker"));
    }

    #[test]
    fn render_html_escapes_script_close() {
        let chart = PriceChart::build(
            &[book("A", "</script><b>")],
            &[obs("A", 1.0, "2026-01-15T10:00:00Z")],
        );
        let html = chart.render_html().unwrap();
        assert!(!html.contains("</script><b>"));
    }
}
