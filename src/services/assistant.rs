//! Generative assistant client.
//!
//! Calls a hosted generative-text API for book summaries, reading
//! recommendations, collection insights and librarian chat. Every operation
//! is best-effort: a transport failure is logged and a user-visible message
//! is substituted for the generated text, never propagated as a crash.

use crate::config::AssistantConfig;
use crate::error::{AppError, AppResult};
use crate::models::Book;
use crate::services::stats::LibraryStats;

/// Transport seam between prompt building and the hosted model.
#[cfg_attr(test, mockall::automock)]
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> AppResult<String>;
}

/// Gemini-style `generateContent` transport.
pub struct GeminiTransport {
    client: reqwest::blocking::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiTransport {
    pub fn new(config: &AssistantConfig) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        }
    }
}

impl TextGenerator for GeminiTransport {
    fn generate(&self, prompt: &str) -> AppResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Assistant("GOOGLE_API_KEY is not set".to_string()))?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::Assistant(e.to_string()))?;

        let value: serde_json::Value = response
            .json()
            .map_err(|e| AppError::Assistant(e.to_string()))?;

        value["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(|text| text.trim().to_string())
            .ok_or_else(|| AppError::Assistant("empty response from model".to_string()))
    }
}

pub struct Assistant {
    transport: Box<dyn TextGenerator>,
}

impl Assistant {
    pub fn new(config: &AssistantConfig) -> Self {
        Self {
            transport: Box::new(GeminiTransport::new(config)),
        }
    }

    pub fn with_transport(transport: Box<dyn TextGenerator>) -> Self {
        Self { transport }
    }

    /// Generate a short summary for one book.
    pub fn generate_summary(
        &self,
        title: &str,
        author: &str,
        genre: &str,
        year: Option<i32>,
    ) -> String {
        let prompt = summary_prompt(title, author, genre, year);
        match self.transport.generate(&prompt) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Summary generation failed: {}", e);
                format!("Could not generate summary: {}", e)
            }
        }
    }

    /// Generate reading-recommendation text for a reference book, given the
    /// rest of the collection.
    pub fn recommendation_text(&self, books: &[Book], reference: &Book) -> String {
        let prompt = recommendation_prompt(books, reference);
        match self.transport.generate(&prompt) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Recommendation generation failed: {}", e);
                format!("Could not generate recommendations: {}", e)
            }
        }
    }

    /// Generate collection-level insights from a statistics snapshot.
    pub fn insights(&self, stats: &LibraryStats) -> String {
        let prompt = format!(
            "Analyze this library data and provide 2-3 interesting insights:\n{}\n\n\
             Focus on trends, popular genres, or recommendations for collection development.",
            stats.summary_text()
        );
        match self.transport.generate(&prompt) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Insights generation failed: {}", e);
                format!("Could not generate insights: {}", e)
            }
        }
    }

    /// Librarian chat over a digest of the collection.
    pub fn chat(&self, question: &str, books: &[Book]) -> String {
        let genres: Vec<&str> = {
            let mut seen = std::collections::HashSet::new();
            books
                .iter()
                .map(|b| b.genre.as_str())
                .filter(|g| seen.insert(*g))
                .collect()
        };
        let prompt = format!(
            "You are a helpful AI librarian assistant for BookNest.\n\
             Context: Library has {} books across genres: {}\n\n\
             User question: {}\n\n\
             Provide a helpful, friendly response. If the question is about book \
             recommendations, be specific. If it's about library operations, be \
             practical. Keep responses concise but informative.",
            books.len(),
            genres.join(", "),
            question
        );
        match self.transport.generate(&prompt) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Chat failed: {}", e);
                format!("Sorry, I'm having trouble connecting right now: {}", e)
            }
        }
    }
}

fn summary_prompt(title: &str, author: &str, genre: &str, year: Option<i32>) -> String {
    let year_info = year
        .map(|y| format!(" published in {}", y))
        .unwrap_or_default();
    format!(
        "Generate a compelling 2-3 sentence summary for the book '{}' by {}{} in the {} genre.\n\n\
         Focus on:\n\
         - The main plot or central theme\n\
         - What makes this book noteworthy or appealing\n\
         - The book's impact or significance if it's well-known\n\n\
         Keep it engaging and informative for library users deciding whether to read it.",
        title, author, year_info, genre
    )
}

fn recommendation_prompt(books: &[Book], reference: &Book) -> String {
    let book_list: Vec<String> = books
        .iter()
        .filter(|b| b.id != reference.id)
        .take(20)
        .map(|b| {
            format!(
                "- {} by {} | Genre: {} | Tags: {}",
                b.title,
                b.author,
                b.genre,
                if b.tags.is_empty() {
                    "None".to_string()
                } else {
                    b.tags.join(", ")
                }
            )
        })
        .collect();

    let reference_tags = if reference.tags.is_empty() {
        "None".to_string()
    } else {
        reference.tags.join(", ")
    };
    let reference_summary = if reference.summary.is_empty() {
        "No summary available".to_string()
    } else {
        reference.summary.chars().take(100).collect()
    };

    format!(
        "Based on this library collection:\n{}\n\n\
         A reader just finished and enjoyed: '{}' by {}\n\
         - Genre: {}\n\
         - Tags: {}\n\
         - Summary: {}\n\n\
         Please recommend exactly 3 books from the above collection that this reader \
         would likely enjoy next. For each recommendation:\n\
         1. State the book title and author clearly\n\
         2. Explain in 1-2 sentences why it's similar or would appeal to someone who \
         liked the reference book\n\
         3. Mention specific themes, genres, or elements that connect them",
        book_list.join("\n"),
        reference.title,
        reference.author,
        reference.genre,
        reference_tags,
        reference_summary
    )
}
