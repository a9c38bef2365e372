//! Database operations for the price tracker
//!
//! Every operation opens its own connection, runs a single statement and
//! drops the connection before returning, on success and on error alike.
//! There is no long-lived handle and no transaction spanning two calls.
//!
//! Uses parameterized queries for all values. Table names used by the
//! export/introspection helpers come from the [`Table`] allow-list only.

use crate::models::{Book, PriceObservation};
use rusqlite::types::Value;
use rusqlite::{params, Connection};
use std::path::PathBuf;

/// Result type for database operations
pub type DbResult<T> = rusqlite::Result<T>;

/// Default database file name
pub const DB_NAME: &str = "kindle_price_tracker.sqlite";

/// Tables known to the tracker schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Book,
    User,
    UserBooks,
    PriceData,
}

impl Table {
    /// All tables, in creation order
    pub const ALL: [Table; 4] = [Table::Book, Table::User, Table::UserBooks, Table::PriceData];

    /// SQL name of the table
    pub fn name(self) -> &'static str {
        match self {
            Table::Book => "book",
            Table::User => "user",
            Table::UserBooks => "user_books",
            Table::PriceData => "price_data",
        }
    }

    /// Look up an allow-listed table by its SQL name
    pub fn from_name(name: &str) -> Option<Table> {
        Table::ALL.into_iter().find(|t| t.name() == name)
    }
}

/// Handle to the tracker database file
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Open a fresh connection with foreign key enforcement on
    fn connect(&self) -> DbResult<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(conn)
    }

    /// Run `f` against a fresh connection, closing it on every exit path
    fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> DbResult<T>) -> DbResult<T> {
        let conn = self.connect()?;
        let result = f(&conn);
        if let Err(e) = &result {
            log::debug!("Statement failed on {}: {}", self.path.display(), e);
        }
        drop(conn);
        result
    }

    /// Create the tracker tables if they don't exist:
    /// - `book`: tracked titles and their lowest observed price
    /// - `user`: subscribers keyed by phone number
    /// - `user_books`: subscriptions (unique per user/book pair)
    /// - `price_data`: hourly price history, later readings replace earlier ones
    pub fn create_database(&self) -> DbResult<()> {
        self.with_connection(|conn| {
            conn.execute_batch(
                "
                CREATE TABLE IF NOT EXISTS book (
                    ASIN TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    lowest_price FLOAT,
                    lowest_price_timestamp DATETIME
                );

                CREATE TABLE IF NOT EXISTS user (
                    name TEXT NOT NULL,
                    number INTEGER PRIMARY KEY
                );

                CREATE TABLE IF NOT EXISTS user_books (
                    number INTEGER,
                    ASIN TEXT,
                    FOREIGN KEY (number) REFERENCES user(number),
                    FOREIGN KEY (ASIN) REFERENCES book(ASIN),
                    UNIQUE (number, ASIN)
                );

                CREATE TABLE IF NOT EXISTS price_data (
                    ASIN TEXT,
                    price FLOAT,
                    timestamp DATETIME,
                    FOREIGN KEY (ASIN) REFERENCES book(ASIN),
                    UNIQUE (ASIN, timestamp) ON CONFLICT REPLACE
                );
                ",
            )
        })?;

        log::info!("Database schema initialized at {}", self.path.display());
        Ok(())
    }

    /// Start tracking a book. Its lowest price stays unset until the first check.
    pub fn insert_book(&self, asin: &str, title: &str) -> DbResult<()> {
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO book (ASIN, title) VALUES (?1, ?2)",
                params![asin, title],
            )
        })?;
        Ok(())
    }

    /// Set the lowest price and its timestamp. Title and ASIN are untouched.
    pub fn update_lowest_price(&self, asin: &str, price: f64, timestamp: &str) -> DbResult<()> {
        self.with_connection(|conn| {
            conn.execute(
                "UPDATE book
                 SET lowest_price = ?1,
                     lowest_price_timestamp = ?2
                 WHERE ASIN = ?3",
                params![price, timestamp, asin],
            )
        })?;
        Ok(())
    }

    pub fn get_books(&self) -> DbResult<Vec<Book>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT ASIN, title, lowest_price, lowest_price_timestamp
                 FROM book
                 ORDER BY rowid",
            )?;
            let books: DbResult<Vec<Book>> = stmt
                .query_map([], |row| {
                    Ok(Book {
                        asin: row.get(0)?,
                        title: row.get(1)?,
                        lowest_price: row.get(2)?,
                        lowest_price_timestamp: row.get(3)?,
                    })
                })?
                .collect();
            books
        })
    }

    /// Lowest stored price for a book.
    ///
    /// Returns `QueryReturnedNoRows` when the book isn't tracked and
    /// `Ok(None)` when it is tracked but has never been priced.
    pub fn get_lowest_price(&self, asin: &str) -> DbResult<Option<f64>> {
        self.with_connection(|conn| {
            conn.query_row(
                "SELECT lowest_price FROM book WHERE ASIN = ?1",
                params![asin],
                |row| row.get(0),
            )
        })
    }

    pub fn insert_user(&self, name: &str, number: i64) -> DbResult<()> {
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO user (name, number) VALUES (?1, ?2)",
                params![name, number],
            )
        })?;
        Ok(())
    }

    /// Subscribe a user to a book. Both must already exist.
    pub fn insert_user_book(&self, number: i64, asin: &str) -> DbResult<()> {
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO user_books (number, ASIN) VALUES (?1, ?2)",
                params![number, asin],
            )
        })?;
        Ok(())
    }

    /// Phone numbers of every user subscribed to `asin`
    pub fn get_users_with_book(&self, asin: &str) -> DbResult<Vec<i64>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare("SELECT number FROM user_books WHERE ASIN = ?1")?;
            let numbers: DbResult<Vec<i64>> =
                stmt.query_map(params![asin], |row| row.get(0))?.collect();
            numbers
        })
    }

    /// Record a price reading. A reading for the same book and timestamp is replaced.
    pub fn insert_price_data(&self, asin: &str, price: f64, timestamp: &str) -> DbResult<()> {
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO price_data (ASIN, price, timestamp) VALUES (?1, ?2, ?3)",
                params![asin, price, timestamp],
            )
        })?;
        Ok(())
    }

    /// All price readings, oldest first
    pub fn get_price_data(&self) -> DbResult<Vec<PriceObservation>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT ASIN, price, timestamp FROM price_data ORDER BY timestamp ASC",
            )?;
            let data: DbResult<Vec<PriceObservation>> = stmt
                .query_map([], |row| {
                    Ok(PriceObservation {
                        asin: row.get(0)?,
                        price: row.get(1)?,
                        timestamp: row.get(2)?,
                    })
                })?
                .collect();
            data
        })
    }

    /// Allow-listed tables present in the database file, in creation order
    pub fn get_tables(&self) -> DbResult<Vec<Table>> {
        self.with_connection(|conn| {
            let mut stmt =
                conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY rowid")?;
            let names: DbResult<Vec<String>> = stmt.query_map([], |row| row.get(0))?.collect();
            let tables: Vec<Table> = names?
                .into_iter()
                .filter_map(|name| Table::from_name(&name))
                .collect();
            Ok(tables)
        })
    }

    pub fn get_table_columns(&self, table: Table) -> DbResult<Vec<String>> {
        self.with_connection(|conn| {
            let stmt = conn.prepare(&format!("SELECT * FROM {}", table.name()))?;
            let columns: Vec<String> = stmt
                .column_names()
                .into_iter()
                .map(String::from)
                .collect();
            Ok(columns)
        })
    }

    /// Every row of `table` as raw SQLite values
    pub fn get_table_data(&self, table: Table) -> DbResult<Vec<Vec<Value>>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT * FROM {}", table.name()))?;
            let column_count = stmt.column_count();
            let rows: DbResult<Vec<Vec<Value>>> = stmt
                .query_map([], |row| {
                    (0..column_count)
                        .map(|i| row.get::<_, Value>(i))
                        .collect::<DbResult<Vec<Value>>>()
                })?
                .collect();
            rows
        })
    }
}
