//! Kindle Price Tracker
//!
//! Meant to be started by an external timer (cron, systemd). Without a
//! subcommand it runs one check-and-notify pass and exits; everything is
//! logged to a file.

use clap::{Parser, Subcommand};
use kindle_price_tracker::chart::{plot_price_data, CHART_FILE};
use kindle_price_tracker::database::DB_NAME;
use kindle_price_tracker::export::{export_all_tables_to_csv, EXPORT_DIR};
use kindle_price_tracker::{tracker, Credentials, Database, KindleStore, TwilioClient};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Kindle price tracker - records prices and texts subscribers on new lows
#[derive(Parser, Debug)]
#[command(name = "kindle_price_tracker")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long, global = true, default_value_t = default_data_path(DB_NAME))]
    database: String,

    /// Path to the Twilio credentials JSON file
    #[arg(long, global = true, default_value_t = default_data_path("auth.json"))]
    credentials: String,

    /// Path to the log file
    #[arg(long, global = true, default_value_t = default_data_path("log"))]
    log_file: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check every tracked book once and text subscribers on new lows (default)
    Check,
    /// Create the database tables
    Init,
    /// Start tracking a book
    AddBook { asin: String, title: String },
    /// Register a subscriber (10-digit US number, no country code)
    AddUser { name: String, number: i64 },
    /// Subscribe a user to a book
    Subscribe { number: i64, asin: String },
    /// Dump every table to CSV
    Export {
        #[arg(long, default_value = EXPORT_DIR)]
        dir: PathBuf,
    },
    /// Write the price history chart as an HTML page
    Chart {
        #[arg(short, long, default_value = CHART_FILE)]
        output: PathBuf,
    },
}

/// Returns a path under the data dir: ~/.local/share/kindle_price_tracker/<name>
fn default_data_path(name: &str) -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kindle_price_tracker")
        .join(name)
        .to_string_lossy()
        .to_string()
}

fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Log to `path` with `YYYY-MM-DD HH:MM:SS LEVEL message` lines.
/// RUST_LOG overrides the default `info` filter.
fn init_logging(path: &Path) -> std::io::Result<()> {
    ensure_parent_dir(path)?;
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {} {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging(Path::new(&args.log_file)) {
        eprintln!("Failed to open log file {}: {}", args.log_file, e);
        std::process::exit(1);
    }

    log::info!("Starting kindle_price_tracker...");
    log::info!("Database path: {}", args.database);

    if let Err(e) = execute(&args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn execute(args: &Args) -> kindle_price_tracker::Result<()> {
    let db_path = Path::new(&args.database);
    ensure_parent_dir(db_path)?;
    let db = Database::new(db_path);

    match args.command.as_ref().unwrap_or(&Command::Check) {
        Command::Check => {
            let credentials = Credentials::load(Path::new(&args.credentials))?;
            let notifier = TwilioClient::new(credentials);
            let store = KindleStore::new();

            let summary = tracker::run(&db, &store, &notifier)?;
            log::info!(
                "Checked {} book(s): {} first price(s), {} new low(s), {} notification(s) sent",
                summary.books_checked,
                summary.first_prices,
                summary.new_lows,
                summary.notifications_sent
            );
        }
        Command::Init => db.create_database()?,
        Command::AddBook { asin, title } => {
            db.insert_book(asin, title)?;
            log::info!("Tracking '{}' ({})", title, asin);
        }
        Command::AddUser { name, number } => {
            db.insert_user(name, *number)?;
            log::info!("Added user {} ({})", name, number);
        }
        Command::Subscribe { number, asin } => {
            db.insert_user_book(*number, asin)?;
            log::info!("Subscribed {} to {}", number, asin);
        }
        Command::Export { dir } => {
            let written = export_all_tables_to_csv(&db, dir)?;
            log::info!("Exported {} table(s) to {}", written.len(), dir.display());
        }
        Command::Chart { output } => plot_price_data(&db, output)?,
    }

    Ok(())
}
