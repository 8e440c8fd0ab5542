//! Catalog-side services and external collaborators

pub mod assistant;
pub mod open_library;
pub mod recommend;
pub mod stats;

pub use assistant::Assistant;
pub use open_library::OpenLibraryClient;
pub use recommend::{recommend, MatchReason, Recommendation};
pub use stats::{LibraryStats, StatEntry};
