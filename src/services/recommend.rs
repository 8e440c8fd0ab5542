//! Rule-based similarity recommender.
//!
//! Pure fallback for the generative assistant: given the current collection
//! snapshot and one reference book, rank the rest by shared genre and shared
//! tags. Deterministic, no I/O, no mutation.

use std::collections::HashSet;

use crate::models::Book;

const MAX_RECOMMENDATIONS: usize = 3;

/// Why a book was picked. Derived for display only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchReason {
    SameGenre,
    /// Tags shared with the reference, in the reference's tag order
    SharedTags(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation<'a> {
    pub book: &'a Book,
    pub reasons: Vec<MatchReason>,
}

impl Recommendation<'_> {
    /// One-line display form, e.g. `Same genre (Sci-Fi), Similar themes: space, survival`
    pub fn describe(&self) -> String {
        let parts: Vec<String> = self
            .reasons
            .iter()
            .map(|reason| match reason {
                MatchReason::SameGenre => format!("Same genre ({})", self.book.genre),
                MatchReason::SharedTags(tags) => {
                    let shown: Vec<&str> = tags.iter().take(2).map(String::as_str).collect();
                    format!("Similar themes: {}", shown.join(", "))
                }
            })
            .collect();
        parts.join(", ")
    }
}

/// Recommend up to 3 books related to `reference`.
///
/// Pass 1 takes up to 2 candidates in the reference's genre, in collection
/// order. Pass 2 ranks the remaining candidates by the number of distinct
/// shared tags (stable, so collection order breaks ties). Pass 3 fills any
/// remaining slots in collection order.
pub fn recommend<'a>(books: &'a [Book], reference: &Book) -> Vec<Recommendation<'a>> {
    let candidates: Vec<&Book> = books.iter().filter(|b| b.id != reference.id).collect();
    let mut picked: Vec<&Book> = Vec::new();

    picked.extend(
        candidates
            .iter()
            .copied()
            .filter(|b| b.genre == reference.genre)
            .take(2),
    );

    if !reference.tags.is_empty() && picked.len() < MAX_RECOMMENDATIONS {
        let mut tag_matches: Vec<(&Book, usize)> = candidates
            .iter()
            .copied()
            .filter(|b| !already_picked(&picked, b))
            .filter_map(|b| {
                let shared = shared_tags(reference, b).len();
                (shared > 0).then_some((b, shared))
            })
            .collect();
        tag_matches.sort_by(|a, b| b.1.cmp(&a.1));
        picked.extend(
            tag_matches
                .into_iter()
                .take(MAX_RECOMMENDATIONS - picked.len())
                .map(|(b, _)| b),
        );
    }

    if picked.len() < MAX_RECOMMENDATIONS {
        let fill: Vec<&Book> = candidates
            .iter()
            .copied()
            .filter(|b| !already_picked(&picked, b))
            .take(MAX_RECOMMENDATIONS - picked.len())
            .collect();
        picked.extend(fill);
    }

    picked
        .into_iter()
        .map(|book| Recommendation {
            book,
            reasons: reasons(reference, book),
        })
        .collect()
}

fn already_picked(picked: &[&Book], book: &Book) -> bool {
    picked.iter().any(|p| p.id == book.id)
}

/// Distinct tags shared with the reference, in the reference's tag order.
fn shared_tags(reference: &Book, other: &Book) -> Vec<String> {
    let other_tags: HashSet<&str> = other.tags.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    reference
        .tags
        .iter()
        .filter(|tag| other_tags.contains(tag.as_str()) && seen.insert(tag.as_str()))
        .cloned()
        .collect()
}

fn reasons(reference: &Book, book: &Book) -> Vec<MatchReason> {
    let mut reasons = Vec::new();
    if book.genre == reference.genre {
        reasons.push(MatchReason::SameGenre);
    }
    let shared = shared_tags(reference, book);
    if !shared.is_empty() {
        reasons.push(MatchReason::SharedTags(shared));
    }
    reasons
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: &str, genre: &str, tags: &[&str]) -> Book {
        Book {
            id: id.to_string(),
            title: format!("Book {}", id),
            author: "Author".to_string(),
            genre: genre.to_string(),
            year: 2000,
            isbn: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            is_borrowed: false,
            borrower_name: String::new(),
            due_date: None,
            summary: String::new(),
        }
    }

    fn ids<'a>(recs: &[Recommendation<'a>]) -> Vec<&'a str> {
        recs.iter().map(|r| r.book.id.as_str()).collect()
    }

    #[test]
    fn test_three_pass_ordering() {
        // Genre pass picks B, tag pass picks C, fill pass picks D.
        let books = vec![
            book("A", "Fiction", &["x", "y"]),
            book("B", "Fiction", &[]),
            book("C", "Mystery", &["x"]),
            book("D", "Sci-Fi", &[]),
        ];
        let recs = recommend(&books, &books[0]);
        assert_eq!(ids(&recs), vec!["B", "C", "D"]);
        assert_eq!(recs[0].reasons, vec![MatchReason::SameGenre]);
        assert_eq!(
            recs[1].reasons,
            vec![MatchReason::SharedTags(vec!["x".to_string()])]
        );
        assert!(recs[2].reasons.is_empty());
    }

    #[test]
    fn test_deterministic() {
        let books = vec![
            book("A", "Fiction", &["x"]),
            book("B", "Mystery", &["x", "y"]),
            book("C", "Mystery", &["x"]),
            book("D", "Fiction", &[]),
            book("E", "Fiction", &[]),
        ];
        let first = ids(&recommend(&books, &books[0]));
        let second = ids(&recommend(&books, &books[0]));
        assert_eq!(first, second);
    }

    #[test]
    fn test_never_reference_never_duplicates_max_three() {
        let books: Vec<Book> = (0..10)
            .map(|i| book(&format!("{:04}", i), "Fiction", &["shared"]))
            .collect();
        let recs = recommend(&books, &books[0]);
        assert_eq!(recs.len(), 3);
        let picked = ids(&recs);
        assert!(!picked.contains(&"0000"));
        let unique: HashSet<&&str> = picked.iter().collect();
        assert_eq!(unique.len(), picked.len());
    }

    #[test]
    fn test_tag_ranking_descending_with_stable_ties() {
        // B shares one tag, C shares two: C must come first. D ties with B
        // and follows it in collection order.
        let books = vec![
            book("A", "Fiction", &["x", "y", "z"]),
            book("B", "Mystery", &["x"]),
            book("C", "Mystery", &["x", "y"]),
            book("D", "Sci-Fi", &["z"]),
        ];
        let recs = recommend(&books, &books[0]);
        assert_eq!(ids(&recs), vec!["C", "B", "D"]);
    }

    #[test]
    fn test_reference_without_tags_skips_tag_pass() {
        let books = vec![
            book("A", "Fiction", &[]),
            book("B", "Mystery", &["x"]),
            book("C", "Sci-Fi", &["y"]),
        ];
        let recs = recommend(&books, &books[0]);
        // fill pass only, collection order
        assert_eq!(ids(&recs), vec!["B", "C"]);
        assert!(recs.iter().all(|r| r.reasons.is_empty()));
    }

    #[test]
    fn test_genre_pass_capped_at_two() {
        let books = vec![
            book("A", "Fiction", &[]),
            book("B", "Fiction", &[]),
            book("C", "Fiction", &[]),
            book("D", "Fiction", &[]),
            book("E", "Mystery", &[]),
        ];
        let recs = recommend(&books, &books[0]);
        // two genre picks, then fill in collection order
        assert_eq!(ids(&recs), vec!["B", "C", "D"]);
    }

    #[test]
    fn test_shared_tags_reported_in_reference_order() {
        let books = vec![
            book("A", "Fiction", &["y", "x"]),
            book("B", "Mystery", &["x", "y"]),
        ];
        let recs = recommend(&books, &books[0]);
        assert_eq!(
            recs[0].reasons,
            vec![MatchReason::SharedTags(vec![
                "y".to_string(),
                "x".to_string()
            ])]
        );
        assert_eq!(recs[0].describe(), "Similar themes: y, x");
    }

    #[test]
    fn test_small_collections() {
        let books = vec![book("A", "Fiction", &[])];
        assert!(recommend(&books, &books[0]).is_empty());
        assert!(recommend(&[], &book("A", "Fiction", &[])).is_empty());
    }
}
