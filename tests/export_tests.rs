use kindle_price_tracker::database::DB_NAME;
use kindle_price_tracker::export::export_all_tables_to_csv;
use kindle_price_tracker::Database;
use std::fs;
use tempfile::TempDir;

// Test fixtures - populated database in a scratch directory

fn populated_db(dir: &TempDir) -> Database {
    let db = Database::new(dir.path().join(DB_NAME));
    db.create_database().unwrap();

    db.insert_book("B000FC1PJI", "Dune").unwrap();
    db.insert_book("B00B7NPRY8", "Foundation").unwrap();
    db.update_lowest_price("B000FC1PJI", 7.99, "2026-02-01T10:00:00Z")
        .unwrap();

    db.insert_user("Smith, J.", 5551234567).unwrap();
    db.insert_user_book(5551234567, "B000FC1PJI").unwrap();

    db.insert_price_data("B000FC1PJI", 7.99, "2026-02-01T10:00:00Z")
        .unwrap();
    db.insert_price_data("B00B7NPRY8", 5.0, "2026-02-01T10:00:00Z")
        .unwrap();

    db
}

#[test]
fn test_export_writes_one_file_per_table() {
    let dir = TempDir::new().unwrap();
    let db = populated_db(&dir);
    let out = dir.path().join("export");

    let written = export_all_tables_to_csv(&db, &out).unwrap();

    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(
        names,
        vec!["book.csv", "user.csv", "user_books.csv", "price_data.csv"]
    );
    for path in &written {
        assert!(path.starts_with(&out));
        assert!(path.is_file());
    }
}

#[test]
fn test_export_quotes_only_values_with_commas() {
    let dir = TempDir::new().unwrap();
    let db = populated_db(&dir);
    let out = dir.path().join("export");

    export_all_tables_to_csv(&db, &out).unwrap();

    let users = fs::read_to_string(out.join("user.csv")).unwrap();
    assert_eq!(users, "name,number\n\"Smith, J.\",5551234567\n");
}

#[test]
fn test_export_book_table_renders_nulls_and_floats() {
    let dir = TempDir::new().unwrap();
    let db = populated_db(&dir);
    let out = dir.path().join("export");

    export_all_tables_to_csv(&db, &out).unwrap();

    let books = fs::read_to_string(out.join("book.csv")).unwrap();
    assert_eq!(
        books,
        "ASIN,title,lowest_price,lowest_price_timestamp\n\
         B000FC1PJI,Dune,7.99,2026-02-01T10:00:00Z\n\
         B00B7NPRY8,Foundation,None,None\n"
    );

    let prices = fs::read_to_string(out.join("price_data.csv")).unwrap();
    assert!(prices.starts_with("ASIN,price,timestamp\n"));
    assert!(prices.contains("B00B7NPRY8,5.0,2026-02-01T10:00:00Z\n"));
}

#[test]
fn test_export_creates_nested_directory() {
    let dir = TempDir::new().unwrap();
    let db = populated_db(&dir);
    let out = dir.path().join("reports").join("export");

    export_all_tables_to_csv(&db, &out).unwrap();
    assert!(out.join("user_books.csv").is_file());

    let links = fs::read_to_string(out.join("user_books.csv")).unwrap();
    assert_eq!(links, "number,ASIN\n5551234567,B000FC1PJI\n");
}

#[test]
fn test_export_overwrites_previous_files() {
    let dir = TempDir::new().unwrap();
    let db = populated_db(&dir);
    let out = dir.path().join("export");

    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("user.csv"), "stale contents that are longer than the export\n").unwrap();

    export_all_tables_to_csv(&db, &out).unwrap();

    let users = fs::read_to_string(out.join("user.csv")).unwrap();
    assert_eq!(users, "name,number\n\"Smith, J.\",5551234567\n");
}
