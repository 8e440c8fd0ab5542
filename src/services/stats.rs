//! Library statistics snapshot

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::models::Book;

/// One labelled count in a distribution
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StatEntry {
    pub label: String,
    pub value: i64,
}

/// Collection-level counters plus the genre distribution.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct LibraryStats {
    pub total: i64,
    pub available: i64,
    pub borrowed: i64,
    pub overdue: i64,
    pub by_genre: Vec<StatEntry>,
}

/// Compute statistics over the current snapshot. Overdue means borrowed with
/// a due date strictly before `today`.
pub fn collect(books: &[Book], today: NaiveDate) -> LibraryStats {
    let total = books.len() as i64;
    let borrowed = books.iter().filter(|b| b.is_borrowed).count() as i64;
    let overdue = books.iter().filter(|b| b.is_overdue(today)).count() as i64;

    let mut counts: HashMap<&str, i64> = HashMap::new();
    for book in books {
        *counts.entry(book.genre.as_str()).or_insert(0) += 1;
    }
    let mut by_genre: Vec<StatEntry> = counts
        .into_iter()
        .map(|(label, value)| StatEntry {
            label: label.to_string(),
            value,
        })
        .collect();
    by_genre.sort_by(|a, b| b.value.cmp(&a.value).then(a.label.cmp(&b.label)));

    LibraryStats {
        total,
        available: total - borrowed,
        borrowed,
        overdue,
        by_genre,
    }
}

impl LibraryStats {
    /// Compact text block fed to the insights prompt.
    pub fn summary_text(&self) -> String {
        let genres: Vec<String> = self
            .by_genre
            .iter()
            .take(5)
            .map(|entry| format!("{}: {}", entry.label, entry.value))
            .collect();
        format!(
            "Total books: {}\nGenre distribution: {}\nCurrently borrowed: {}",
            self.total,
            genres.join(", "),
            self.borrowed
        )
    }
}
