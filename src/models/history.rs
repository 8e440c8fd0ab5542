//! Borrowing history model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind of borrowing event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryAction {
    Checkout,
    Checkin,
}

/// Append-only audit record of one checkout or check-in event.
///
/// The book title is a denormalized snapshot so history stays readable after
/// the book is edited or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub book_id: String,
    pub book_title: String,
    pub borrower_name: String,
    pub action: HistoryAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<NaiveDate>,
}

impl HistoryEntry {
    pub fn checkout(
        book_id: String,
        book_title: String,
        borrower_name: String,
        checkout_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            book_id,
            book_title,
            borrower_name,
            action: HistoryAction::Checkout,
            checkout_date: Some(checkout_date),
            due_date: Some(due_date),
            return_date: None,
        }
    }

    pub fn checkin(
        book_id: String,
        book_title: String,
        borrower_name: String,
        return_date: NaiveDate,
    ) -> Self {
        Self {
            book_id,
            book_title,
            borrower_name,
            action: HistoryAction::Checkin,
            checkout_date: None,
            due_date: None,
            return_date: Some(return_date),
        }
    }
}
