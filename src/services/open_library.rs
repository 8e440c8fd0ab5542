//! Open Library search client.
//!
//! Searches the public Open Library catalog and converts its raw records
//! into local book records, inferring a genre from the subject keywords.

use std::time::Duration;

use serde::Deserialize;

use crate::config::OpenLibraryConfig;
use crate::error::{AppError, AppResult};
use crate::models::Book;

const SEARCH_FIELDS: &str = "key,title,author_name,first_publish_year,isbn,subject";

/// Genre keyword table, checked in priority order; first match wins.
const GENRE_KEYWORDS: &[(&str, &[&str])] = &[
    ("Fiction", &["fiction", "novel", "literature"]),
    ("Mystery", &["mystery", "detective", "crime", "thriller"]),
    ("Sci-Fi", &["science fiction", "sci-fi", "fantasy", "dystopian"]),
    ("Romance", &["romance", "love story"]),
    ("Biography", &["biography", "memoir", "autobiography"]),
    ("History", &["history", "historical"]),
    ("Science", &["science", "technology", "physics", "biology"]),
    ("Self-Help", &["self-help", "psychology", "philosophy"]),
];

const DEFAULT_GENRE: &str = "Fiction";

/// Raw search record as returned by the Open Library search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteBook {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author_name: Vec<String>,
    #[serde(default)]
    pub first_publish_year: Option<i32>,
    #[serde(default)]
    pub isbn: Vec<String>,
    #[serde(default)]
    pub subject: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    docs: Vec<RemoteBook>,
}

pub struct OpenLibraryClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl OpenLibraryClient {
    pub fn new(config: &OpenLibraryConfig) -> AppResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::OpenLibrary(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Search the catalog. Transport and decoding failures surface as
    /// [`AppError::OpenLibrary`]; callers report them and carry on.
    pub fn search(&self, query: &str, limit: usize) -> AppResult<Vec<RemoteBook>> {
        let url = format!("{}/search.json", self.base_url);
        tracing::debug!("Open Library search: {}", query);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("limit", &limit.to_string()),
                ("fields", SEARCH_FIELDS),
            ])
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::OpenLibrary(e.to_string()))?;

        let body: SearchResponse = response
            .json()
            .map_err(|e| AppError::OpenLibrary(e.to_string()))?;
        Ok(body.docs)
    }
}

impl RemoteBook {
    /// Convert into a local record under the given id. Missing remote fields
    /// fall back to the import defaults.
    pub fn into_book(self, id: String) -> Book {
        let title = self
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Unknown Title".to_string());
        let author = if self.author_name.is_empty() {
            "Unknown Author".to_string()
        } else {
            self.author_name[..self.author_name.len().min(2)].join(", ")
        };
        let work_key = self.key.trim_start_matches("/works/");
        let isbn = self
            .isbn
            .first()
            .cloned()
            .unwrap_or_else(|| format!("OL-{}", work_key));
        let genre = infer_genre(&self.subject).to_string();
        let tags: Vec<String> = self.subject.into_iter().take(5).collect();

        Book {
            id,
            title,
            author,
            genre,
            year: self.first_publish_year.unwrap_or(2000),
            isbn,
            tags,
            is_borrowed: false,
            borrower_name: String::new(),
            due_date: None,
            summary: String::new(),
        }
    }
}

/// Map subject keywords to one of the fixed genres by keyword containment
/// over the lower-cased, joined subject list.
pub fn infer_genre(subjects: &[String]) -> &'static str {
    let joined = subjects
        .iter()
        .map(|s| s.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");
    GENRE_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| joined.contains(k)))
        .map(|(genre, _)| *genre)
        .unwrap_or(DEFAULT_GENRE)
}
