//! CSV dump of every tracker table
//!
//! One `<table>.csv` per table. Values containing a comma are wrapped in
//! double quotes; nothing else is quoted or escaped, so the files match the
//! layout of earlier exports byte for byte.

use crate::database::Database;
use crate::error::Result;
use rusqlite::types::Value;
use std::path::{Path, PathBuf};

/// Default export directory, relative to the working directory
pub const EXPORT_DIR: &str = "export";

/// Write every table to `<dir>/<table>.csv`, creating `dir` if needed.
///
/// Returns the paths written, in table order.
pub fn export_all_tables_to_csv(db: &Database, dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
        log::info!("Created directory: {}", dir.display());
    }

    let mut written = Vec::new();

    for table in db.get_tables()? {
        let columns = db.get_table_columns(table)?;
        let rows = db.get_table_data(table)?;
        let path = dir.join(format!("{}.csv", table.name()));

        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Never)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_path(&path)?;

        writer.write_record(&columns)?;
        for row in &rows {
            writer.write_record(row.iter().map(format_field))?;
        }
        writer.flush()?;

        log::info!("Exported {} row(s) to {}", rows.len(), path.display());
        written.push(path);
    }

    Ok(written)
}

/// Render a value as an export field, quoting it when it contains a comma
fn format_field(value: &Value) -> String {
    let text = format_value(value);
    if text.contains(',') {
        format!("\"{}\"", text)
    } else {
        text
    }
}

/// Plain-text rendering of a SQLite value (NULL becomes `None`)
fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Integer(i) => i.to_string(),
        // Debug keeps the trailing `.0` on whole numbers
        Value::Real(f) => format!("{:?}", f),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => String::from_utf8_lossy(b).into_owned(),
    }
}
