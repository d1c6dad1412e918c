use thiserror::Error;

/// Errors that abort a scrape.
///
/// Reports that cannot be parsed (paper filings, pages without a table) are
/// not errors; they yield no transactions.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The landing page could not be reached, or did not look as expected.
    #[error("failed to bootstrap a portal session: {0}")]
    Bootstrap(String),

    /// The portal redirected to the landing page again after a refresh.
    #[error("session expired again after refresh, while fetching {0}")]
    SessionExpired(String),

    /// A browser element re-rendered between lookup and use.
    #[error("element `{0}` went stale")]
    StaleElement(String),

    #[error("browser focus lost: expected window {expected}, found {found}")]
    WindowFocus { expected: String, found: String },

    #[error("browser driver error: {0}")]
    Driver(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Template(#[from] indicatif::style::TemplateError),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
