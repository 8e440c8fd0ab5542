//! BookNest launcher
//!
//! Thin entry point: loads configuration, initializes tracing, opens the
//! catalog store and prints status text. All catalog logic lives in the
//! library crate.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use booknest::{config::AppConfig, services::stats, store::CatalogStore};

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("booknest={}", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting BookNest v{}", env!("CARGO_PKG_VERSION"));

    let (store, report) = CatalogStore::open(&config.library.data_file);
    for warning in &report.warnings {
        tracing::warn!("{}", warning);
    }

    println!(
        "BookNest library at {}: {} books, {} history entries",
        store.data_file().display(),
        store.books().len(),
        store.history().len()
    );

    let stats = stats::collect(store.books(), booknest::store::today());
    println!(
        "{} available / {} borrowed / {} overdue",
        stats.available, stats.borrowed, stats.overdue
    );
    for entry in &stats.by_genre {
        println!("  {}: {}", entry.label, entry.value);
    }

    if config.assistant.api_key.is_none() {
        println!("Set GOOGLE_API_KEY to enable AI summaries, recommendations and insights.");
    }

    Ok(())
}
