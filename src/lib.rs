//! BookNest - Book Catalog Manager
//!
//! The reusable core of an AI-assisted personal library: a file-backed
//! catalog store with a checkout/check-in state machine, a rule-based
//! similarity recommender, and best-effort clients for the generative-text
//! and Open Library collaborators. User interfaces stay outside this crate
//! and drive it through [`store::CatalogStore`] and the services.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use store::CatalogStore;
