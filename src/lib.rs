pub mod config;
pub mod dedup;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod input_loader;
pub mod job_manager;
pub mod logger;
pub mod output;
pub mod patterns;
pub mod scraper;
pub mod templates;

// Exporting types for convenience
pub use config::{Categories, ScrapeConfig};
pub use dedup::{Category, ResultSet, SessionState};
pub use error::{Result, SwallowError};
pub use extractor::Extractor;
pub use fetcher::{Fetch, HttpFetcher};
pub use job_manager::{Job, JobHandle};
pub use scraper::{PageReport, ProgressEvent, RunSummary, Scraper, UrlOutcome};
pub use templates::TemplateStore;
