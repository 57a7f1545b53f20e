use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SwallowError {
    #[error("connectivity check failed: {0}")]
    Connectivity(String),

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid regular expression '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("template name must not be empty")]
    EmptyTemplateName,

    #[error("template '{0}' is reserved and cannot be changed")]
    ReservedTemplate(String),

    #[error("unknown template '{0}'")]
    UnknownTemplate(String),

    #[error("no extraction category selected")]
    NoCategory,

    #[error("no URLs to process")]
    NoUrls,

    #[error("no results to save")]
    NothingToSave,

    #[error("scrape job panicked")]
    JobPanicked,

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SwallowError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SwallowError::Io { path: path.into(), source }
    }

    pub(crate) fn pattern(pattern: &str, source: regex::Error) -> Self {
        SwallowError::Pattern { pattern: pattern.to_string(), source }
    }
}

pub type Result<T> = std::result::Result<T, SwallowError>;
