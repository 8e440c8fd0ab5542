//! Catalog store: the authoritative in-memory library and its durable mirror.
//!
//! The store owns the full book collection plus the append-only borrowing
//! history and rewrites the whole JSON file after every mutation. The
//! in-memory state is the source of truth for the session; a failed write is
//! reported and the session continues.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{Duration, Local, NaiveDate};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{Book, BookQuery, CheckoutRequest, HistoryEntry, StatusFilter};

/// Outcome of a best-effort load: what was read and what had to be skipped.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded_books: usize,
    pub loaded_history: usize,
    pub warnings: Vec<String>,
}

impl LoadReport {
    fn warn(&mut self, message: String) {
        tracing::warn!("{}", message);
        self.warnings.push(message);
    }
}

pub struct CatalogStore {
    data_file: PathBuf,
    books: Vec<Book>,
    history: Vec<HistoryEntry>,
}

impl CatalogStore {
    /// Open a store backed by the given file, loading whatever it holds.
    ///
    /// A missing file is not an error: the library starts empty. An unreadable
    /// or malformed file is reported and the library also starts empty.
    /// Individually malformed records are skipped so one bad entry cannot take
    /// the whole collection down with it.
    pub fn open(data_file: impl Into<PathBuf>) -> (Self, LoadReport) {
        let mut store = Self {
            data_file: data_file.into(),
            books: Vec::new(),
            history: Vec::new(),
        };
        let mut report = LoadReport::default();

        let raw = match fs::read_to_string(&store.data_file) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(
                    "No library data at {}, starting with an empty library",
                    store.data_file.display()
                );
                return (store, report);
            }
            Err(e) => {
                report.warn(format!(
                    "Could not read {}: {}",
                    store.data_file.display(),
                    e
                ));
                return (store, report);
            }
        };

        let value: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                report.warn(format!(
                    "Malformed library data in {}: {}",
                    store.data_file.display(),
                    e
                ));
                return (store, report);
            }
        };

        if let Some(entries) = value.get("books").and_then(|v| v.as_array()) {
            for entry in entries {
                let title = entry
                    .get("title")
                    .and_then(|t| t.as_str())
                    .unwrap_or("Unknown");
                let book = match serde_json::from_value::<Book>(entry.clone()) {
                    Ok(book) => book,
                    Err(e) => {
                        report.warn(format!("Skipping incomplete book '{}': {}", title, e));
                        continue;
                    }
                };
                if let Err(e) = book.validate_record() {
                    report.warn(format!("Skipping invalid book '{}': {}", title, e));
                    continue;
                }
                if store.books.iter().any(|b| b.id == book.id) {
                    report.warn(format!(
                        "Skipping book '{}': duplicate id {}",
                        title, book.id
                    ));
                    continue;
                }
                store.books.push(book);
            }
        }

        if let Some(entries) = value.get("borrowing_history").and_then(|v| v.as_array()) {
            for entry in entries {
                match serde_json::from_value::<HistoryEntry>(entry.clone()) {
                    Ok(record) => store.history.push(record),
                    Err(e) => report.warn(format!("Skipping malformed history entry: {}", e)),
                }
            }
        }

        report.loaded_books = store.books.len();
        report.loaded_history = store.history.len();
        tracing::info!(
            "Loaded {} books and {} history entries from {}",
            report.loaded_books,
            report.loaded_history,
            store.data_file.display()
        );
        (store, report)
    }

    /// Serialize the whole aggregate and rewrite the backing file.
    pub fn save(&self) -> AppResult<()> {
        let data = serde_json::json!({
            "books": self.books,
            "borrowing_history": self.history,
        });
        fs::write(&self.data_file, serde_json::to_string_pretty(&data)?)?;
        Ok(())
    }

    /// Write failures do not roll back the in-memory mutation.
    fn persist(&self) {
        if let Err(e) = self.save() {
            tracing::error!(
                "Failed to save library data to {}: {}",
                self.data_file.display(),
                e
            );
        }
    }

    /// Append a fully-formed book. The caller supplies the id; a colliding id
    /// or an invalid record is rejected before anything changes.
    pub fn add(&mut self, book: Book) -> AppResult<()> {
        book.validate_record()?;
        if book.id.is_empty() {
            return Err(AppError::Validation("book id must not be empty".to_string()));
        }
        if self.books.iter().any(|b| b.id == book.id) {
            return Err(AppError::Conflict(format!(
                "A book with id {} already exists",
                book.id
            )));
        }
        tracing::debug!("Adding book '{}' ({})", book.title, book.id);
        self.books.push(book);
        self.persist();
        Ok(())
    }

    /// Replace the record matching `id` in place, preserving its position.
    /// Returns `Ok(false)` when the id is unknown. The id itself is
    /// immutable: a replacement carrying a different id is rejected.
    pub fn update(&mut self, id: &str, book: Book) -> AppResult<bool> {
        if book.id != id {
            return Err(AppError::Validation(format!(
                "book id is immutable ({} cannot become {})",
                id, book.id
            )));
        }
        book.validate_record()?;
        let updated = match self.books.iter_mut().find(|b| b.id == id) {
            Some(slot) => {
                *slot = book;
                true
            }
            None => false,
        };
        self.persist();
        Ok(updated)
    }

    /// Remove the record matching `id`. History entries referencing it are
    /// retained: they are a snapshot, not a foreign key.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.books.len();
        self.books.retain(|b| b.id != id);
        let deleted = self.books.len() < before;
        if deleted {
            tracing::debug!("Deleted book {}", id);
        }
        self.persist();
        deleted
    }

    /// Check a book out to a borrower for `loan_days` days and record the
    /// event. Returns `Ok(false)` when the id is unknown. Checking out an
    /// already-borrowed book overwrites the current loan.
    pub fn check_out(&mut self, id: &str, request: &CheckoutRequest) -> AppResult<bool> {
        request.validate()?;
        let today = Local::now().date_naive();
        let due = today + Duration::days(request.loan_days);

        let entry = match self.books.iter_mut().find(|b| b.id == id) {
            Some(book) => {
                if book.is_borrowed {
                    tracing::warn!(
                        "Book '{}' ({}) is already checked out to {}; overwriting the loan",
                        book.title,
                        book.id,
                        book.borrower_name
                    );
                }
                book.is_borrowed = true;
                book.borrower_name = request.borrower_name.clone();
                book.due_date = Some(due);
                Some(HistoryEntry::checkout(
                    book.id.clone(),
                    book.title.clone(),
                    request.borrower_name.clone(),
                    today,
                    due,
                ))
            }
            None => None,
        };

        let checked_out = entry.is_some();
        self.history.extend(entry);
        self.persist();
        Ok(checked_out)
    }

    /// Return a borrowed book, clearing its loan state and recording the
    /// event. A no-op (`false`) when the id is unknown or the book is
    /// already available.
    pub fn check_in(&mut self, id: &str) -> bool {
        let today = Local::now().date_naive();

        let entry = match self.books.iter_mut().find(|b| b.id == id) {
            Some(book) if book.is_borrowed => {
                book.is_borrowed = false;
                let borrower = std::mem::take(&mut book.borrower_name);
                book.due_date = None;
                Some(HistoryEntry::checkin(
                    book.id.clone(),
                    book.title.clone(),
                    borrower,
                    today,
                ))
            }
            _ => None,
        };

        let checked_in = entry.is_some();
        self.history.extend(entry);
        self.persist();
        checked_in
    }

    /// Linear substring search with availability and genre filters.
    pub fn search(&self, query: &BookQuery) -> Vec<&Book> {
        let today = Local::now().date_naive();
        let needle = query
            .text
            .as_deref()
            .map(str::to_lowercase)
            .filter(|t| !t.is_empty());

        self.books
            .iter()
            .filter(|book| {
                if let Some(ref needle) = needle {
                    let hit = book.title.to_lowercase().contains(needle)
                        || book.author.to_lowercase().contains(needle)
                        || book.genre.to_lowercase().contains(needle)
                        || book.tags.iter().any(|tag| tag.to_lowercase().contains(needle));
                    if !hit {
                        return false;
                    }
                }
                let status_ok = match query.status {
                    StatusFilter::All => true,
                    StatusFilter::Available => !book.is_borrowed,
                    StatusFilter::Borrowed => book.is_borrowed,
                    StatusFilter::Overdue => book.is_overdue(today),
                };
                if !status_ok {
                    return false;
                }
                match query.genre {
                    Some(ref genre) => &book.genre == genre,
                    None => true,
                }
            })
            .collect()
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn get(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    pub fn require(&self, id: &str) -> AppResult<&Book> {
        self.get(id)
            .ok_or_else(|| AppError::NotFound(format!("No book with id {}", id)))
    }

    /// Zero-padded running counter derived from the collection size, bumped
    /// past any id already taken.
    pub fn next_id(&self) -> String {
        let mut n = self.books.len() + 1;
        loop {
            let id = format!("{:04}", n);
            if self.get(&id).is_none() {
                return id;
            }
            n += 1;
        }
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }
}

/// Today's date for loan bookkeeping.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookDraft, HistoryAction};
    use tempfile::TempDir;

    fn draft(title: &str, genre: &str, tags: &[&str]) -> BookDraft {
        BookDraft {
            title: title.to_string(),
            author: "Test Author".to_string(),
            genre: genre.to_string(),
            year: 2001,
            isbn: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            summary: String::new(),
        }
    }

    fn open_temp() -> (TempDir, CatalogStore) {
        let dir = TempDir::new().expect("temp dir");
        let (store, report) = CatalogStore::open(dir.path().join("library_data.json"));
        assert!(report.warnings.is_empty());
        (dir, store)
    }

    fn add(store: &mut CatalogStore, title: &str, genre: &str, tags: &[&str]) -> String {
        let id = store.next_id();
        let book = draft(title, genre, tags).into_book(id.clone()).unwrap();
        store.add(book).unwrap();
        id
    }

    #[test]
    fn test_open_missing_file_starts_empty() {
        let (_dir, store) = open_temp();
        assert!(store.books().is_empty());
        assert!(store.history().is_empty());
    }

    #[test]
    fn test_add_assigns_unique_ids() {
        let (_dir, mut store) = open_temp();
        let a = add(&mut store, "One", "Fiction", &[]);
        let b = add(&mut store, "Two", "Fiction", &[]);
        assert_ne!(a, b);

        let dup = draft("Dup", "Fiction", &[]).into_book(a).unwrap();
        assert!(matches!(store.add(dup), Err(AppError::Conflict(_))));
        assert_eq!(store.books().len(), 2);
    }

    #[test]
    fn test_next_id_skips_existing() {
        let (_dir, mut store) = open_temp();
        add(&mut store, "One", "Fiction", &[]);
        add(&mut store, "Two", "Fiction", &[]);
        store.delete("0001");
        // collection size would suggest 0002, which is taken
        assert_eq!(store.next_id(), "0003");
    }

    #[test]
    fn test_update_preserves_position() {
        let (_dir, mut store) = open_temp();
        let a = add(&mut store, "One", "Fiction", &[]);
        add(&mut store, "Two", "Fiction", &[]);

        let mut replacement = store.get(&a).unwrap().clone();
        replacement.title = "One, revised".to_string();
        assert!(store.update(&a, replacement).unwrap());
        assert_eq!(store.books()[0].title, "One, revised");

        let ghost = draft("Ghost", "Fiction", &[]).into_book("9999".to_string()).unwrap();
        assert!(!store.update("9999", ghost).unwrap());
    }

    #[test]
    fn test_update_rejects_id_change() {
        let (_dir, mut store) = open_temp();
        let a = add(&mut store, "One", "Fiction", &[]);
        let mut replacement = store.get(&a).unwrap().clone();
        replacement.id = "0042".to_string();
        assert!(matches!(
            store.update(&a, replacement),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_delete_retains_history() {
        let (_dir, mut store) = open_temp();
        let a = add(&mut store, "One", "Fiction", &[]);
        store
            .check_out(&a, &CheckoutRequest::new("Alice", 14))
            .unwrap();
        assert!(store.delete(&a));
        assert!(store.get(&a).is_none());
        assert_eq!(store.history().len(), 1);
        assert_eq!(store.history()[0].book_id, a);
        assert!(!store.delete(&a));
    }

    #[test]
    fn test_checkout_checkin_round_trip() {
        let (_dir, mut store) = open_temp();
        let a = add(&mut store, "One", "Fiction", &[]);

        assert!(store
            .check_out(&a, &CheckoutRequest::new("Alice", 7))
            .unwrap());
        {
            let book = store.get(&a).unwrap();
            assert!(book.is_borrowed);
            assert_eq!(book.borrower_name, "Alice");
            assert!(book.loan_state_valid());
        }

        assert!(store.check_in(&a));
        let book = store.get(&a).unwrap();
        assert!(!book.is_borrowed);
        assert_eq!(book.borrower_name, "");
        assert_eq!(book.due_date, None);
        assert!(book.loan_state_valid());

        let entries: Vec<_> = store
            .history()
            .iter()
            .filter(|e| e.book_id == a)
            .collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, HistoryAction::Checkout);
        assert_eq!(entries[1].action, HistoryAction::Checkin);
        assert_eq!(entries[1].borrower_name, "Alice");
        // due date is checkout date plus the loan period
        let checkout = entries[0];
        assert_eq!(
            checkout.due_date.unwrap(),
            checkout.checkout_date.unwrap() + Duration::days(7)
        );
    }

    #[test]
    fn test_checkout_unknown_id_is_noop() {
        let (_dir, mut store) = open_temp();
        add(&mut store, "One", "Fiction", &[]);
        let before = store.books().to_vec();

        let result = store.check_out("missing-id", &CheckoutRequest::new("Alice", 14));
        assert!(matches!(result, Ok(false)));
        assert_eq!(store.books(), &before[..]);
        assert!(store.history().is_empty());
    }

    #[test]
    fn test_checkout_empty_borrower_rejected() {
        let (_dir, mut store) = open_temp();
        let a = add(&mut store, "One", "Fiction", &[]);
        let result = store.check_out(&a, &CheckoutRequest::new("", 14));
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(!store.get(&a).unwrap().is_borrowed);
        assert!(store.history().is_empty());
    }

    #[test]
    fn test_checkout_already_borrowed_overwrites() {
        let (_dir, mut store) = open_temp();
        let a = add(&mut store, "One", "Fiction", &[]);
        store
            .check_out(&a, &CheckoutRequest::new("Alice", 14))
            .unwrap();
        store
            .check_out(&a, &CheckoutRequest::new("Bob", 7))
            .unwrap();

        let book = store.get(&a).unwrap();
        assert!(book.is_borrowed);
        assert_eq!(book.borrower_name, "Bob");
        assert_eq!(store.history().len(), 2);
    }

    #[test]
    fn test_checkin_when_available_is_noop() {
        let (_dir, mut store) = open_temp();
        let a = add(&mut store, "One", "Fiction", &[]);
        assert!(!store.check_in(&a));
        assert!(!store.check_in("missing-id"));
        assert!(store.history().is_empty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("library_data.json");

        let (mut store, _) = CatalogStore::open(&path);
        let a = add(&mut store, "One", "Fiction", &["classic"]);
        add(&mut store, "Two", "Mystery", &["noir"]);
        store
            .check_out(&a, &CheckoutRequest::new("Alice", 14))
            .unwrap();
        store.save().unwrap();

        let (reloaded, report) = CatalogStore::open(&path);
        assert!(report.warnings.is_empty());
        assert_eq!(reloaded.books(), store.books());
        assert_eq!(reloaded.history(), store.history());
    }

    #[test]
    fn test_load_skips_record_missing_title() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("library_data.json");
        std::fs::write(
            &path,
            r#"{
                "books": [
                    {"id": "0001", "title": "Good Book", "author": "A", "genre": "Fiction", "year": 1999, "isbn": "", "tags": []},
                    {"id": "0002", "author": "B", "genre": "Fiction", "year": 2000, "isbn": "", "tags": []}
                ],
                "borrowing_history": []
            }"#,
        )
        .unwrap();

        let (store, report) = CatalogStore::open(&path);
        assert_eq!(store.books().len(), 1);
        assert_eq!(store.books()[0].title, "Good Book");
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_load_malformed_file_starts_empty() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("library_data.json");
        std::fs::write(&path, "not json at all").unwrap();

        let (store, report) = CatalogStore::open(&path);
        assert!(store.books().is_empty());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_search_text_and_filters() {
        let (_dir, mut store) = open_temp();
        let a = add(&mut store, "The Martian", "Sci-Fi", &["space", "survival"]);
        add(&mut store, "Gone Girl", "Mystery", &["thriller"]);
        add(&mut store, "Dune", "Sci-Fi", &["space opera"]);
        store
            .check_out(&a, &CheckoutRequest::new("Alice", 14))
            .unwrap();

        // empty query returns everything in collection order
        let all = store.search(&BookQuery::default());
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].title, "The Martian");

        let hits = store.search(&BookQuery {
            text: Some("space".to_string()),
            ..Default::default()
        });
        assert_eq!(hits.len(), 2);

        let borrowed = store.search(&BookQuery {
            status: StatusFilter::Borrowed,
            ..Default::default()
        });
        assert_eq!(borrowed.len(), 1);
        assert_eq!(borrowed[0].title, "The Martian");

        let scifi = store.search(&BookQuery {
            genre: Some("Sci-Fi".to_string()),
            status: StatusFilter::Available,
            ..Default::default()
        });
        assert_eq!(scifi.len(), 1);
        assert_eq!(scifi[0].title, "Dune");

        // case-insensitive substring on author
        let by_author = store.search(&BookQuery {
            text: Some("test author".to_string()),
            ..Default::default()
        });
        assert_eq!(by_author.len(), 3);
    }
}
