//! Book (catalog entry) model and related types.
//!
//! The serde shape of [`Book`] is the on-disk shape: required descriptive
//! fields, loan state defaulting to "available" so legacy records still load.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Full book record (in-memory + persisted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Book {
    pub id: String,
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "author is required"))]
    pub author: String,
    #[validate(length(min = 1, message = "genre is required"))]
    pub genre: String,
    pub year: i32,
    pub isbn: String,
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_borrowed: bool,
    #[serde(default)]
    pub borrower_name: String,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub summary: String,
}

impl Book {
    /// Loan-state invariant: borrowed iff borrower and due date are both set.
    pub fn loan_state_valid(&self) -> bool {
        self.is_borrowed == (!self.borrower_name.is_empty() && self.due_date.is_some())
    }

    /// Field validation plus the loan-state invariant.
    pub fn validate_record(&self) -> AppResult<()> {
        self.validate()?;
        if !self.loan_state_valid() {
            return Err(AppError::Validation(format!(
                "book '{}' has inconsistent loan state",
                self.id
            )));
        }
        Ok(())
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.is_borrowed && self.due_date.is_some_and(|due| due < today)
    }
}

/// Create/edit form data for a book. Converts into a [`Book`] once an id
/// has been assigned.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BookDraft {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "author is required"))]
    pub author: String,
    #[validate(length(min = 1, message = "genre is required"))]
    pub genre: String,
    #[validate(range(min = 1000, max = 2100))]
    pub year: i32,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

impl BookDraft {
    /// Validate the form and build an available (not borrowed) book record.
    pub fn into_book(self, id: String) -> AppResult<Book> {
        self.validate()?;
        Ok(Book {
            id,
            title: self.title,
            author: self.author,
            genre: self.genre,
            year: self.year,
            isbn: self.isbn,
            tags: self.tags,
            is_borrowed: false,
            borrower_name: String::new(),
            due_date: None,
            summary: self.summary,
        })
    }
}

/// Checkout form data. The loan period range matches the checkout widget
/// (1 to 90 days, 14 by default).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CheckoutRequest {
    #[validate(length(min = 1, message = "borrower name is required"))]
    pub borrower_name: String,
    #[validate(range(min = 1, max = 90))]
    pub loan_days: i64,
}

impl CheckoutRequest {
    pub fn new(borrower_name: impl Into<String>, loan_days: i64) -> Self {
        Self {
            borrower_name: borrower_name.into(),
            loan_days,
        }
    }
}

impl Default for CheckoutRequest {
    fn default() -> Self {
        Self {
            borrower_name: String::new(),
            loan_days: 14,
        }
    }
}

/// Availability filter for catalog searches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum StatusFilter {
    #[default]
    All,
    Available,
    Borrowed,
    Overdue,
}

/// Book query parameters: linear substring search plus availability and
/// genre filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookQuery {
    /// Matched case-insensitively against title, author, genre and tags
    pub text: Option<String>,
    #[serde(default)]
    pub status: StatusFilter,
    /// Exact genre filter
    pub genre: Option<String>,
}
