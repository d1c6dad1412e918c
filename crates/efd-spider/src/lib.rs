/// Browser-driven variant of the spider.
pub mod browser;
pub mod config;
pub mod error;
pub mod fs;
pub(crate) mod html;
pub mod model;

/// The Senate's [electronic financial disclosure] search; periodic
/// transaction reports, via its JSON report endpoint.
///
/// [electronic financial disclosure]: https://efdsearch.senate.gov/search/
pub mod senate;
pub mod transport;
mod tui;

pub use config::Portal;
pub use error::{Result, ScrapeError};
pub use model::{ReportRow, Transaction};

/// Shortcut for required API elements.
pub(crate) mod http {
    pub(crate) use crate::transport::{Page, Transport};
    pub(crate) use reqwest::Client as HttpClient;
}

/// Elapsed time since `time`, highlighted for log lines.
pub(crate) fn time_elapsed(time: std::time::Instant) -> String {
    use colored::Colorize;

    format!("elapsed time: {} ms", time.elapsed().as_millis())
        .truecolor(255, 135, 0)
        .to_string()
}
