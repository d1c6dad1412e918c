use chrono::NaiveDate;
use std::time::Duration;

/// Root of the Senate electronic financial disclosure search.
pub const ROOT: &'static str = "https://efdsearch.senate.gov";

/// Rows requested per page of the report index.
pub const BATCH_SIZE: usize = 100;

/// Pause before every outbound request.
pub const RATE_LIMIT: Duration = Duration::from_secs(2);

/// Periodic transaction reports.
pub const REPORT_TYPES: &'static str = "[11]";

/// Scanned filings live under this path; they have no HTML table to parse.
pub const PAPER_PREFIX: &'static str = "/search/view/paper/";

/// Asset type kept regardless of whether the row carries a ticker.
pub const TRACKED_ASSET_TYPE: &'static str = "Stock";

/// Everything the spider needs to know about the portal it talks to.
///
/// `Portal::default()` points at the live Senate portal; tests swap the root
/// for a fake host and drop the rate limit.
#[derive(Clone, Debug)]
pub struct Portal {
    pub root: String,
    pub batch_size: usize,
    pub report_types: String,
    pub submitted_start: NaiveDate,
    pub rate_limit: Duration,
    pub paper_prefix: String,
    pub tracked_asset_type: String,
}

impl Default for Portal {
    fn default() -> Self {
        Self {
            root: ROOT.to_string(),
            batch_size: BATCH_SIZE,
            report_types: REPORT_TYPES.to_string(),
            submitted_start: NaiveDate::from_ymd_opt(2012, 1, 1).expect("valid start date"),
            rate_limit: RATE_LIMIT,
            paper_prefix: PAPER_PREFIX.to_string(),
            tracked_asset_type: TRACKED_ASSET_TYPE.to_string(),
        }
    }
}

impl Portal {
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: Duration) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Terms-of-use page; every expired session is redirected here.
    pub fn landing_url(&self) -> String {
        format!("{}/search/home/", self.root)
    }

    /// Whether a final response URL is the landing page, query string aside.
    pub fn is_landing(&self, url: &str) -> bool {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        path == self.landing_url()
    }

    pub fn search_url(&self) -> String {
        format!("{}/search/", self.root)
    }

    /// JSON endpoint behind the paginated search results.
    pub fn reports_url(&self) -> String {
        format!("{}/search/report/data/", self.root)
    }

    /// Absolute URL for a detail link relative to the root.
    pub fn absolute(&self, link: &str) -> String {
        if link.starts_with("http://") || link.starts_with("https://") {
            link.to_string()
        } else {
            format!("{}{link}", self.root)
        }
    }

    /// Start date as the report data endpoint expects it.
    pub fn submitted_start_date(&self) -> String {
        self.submitted_start.format("%m/%d/%Y 00:00:00").to_string()
    }

    /// Start date as typed into the search form.
    pub fn submitted_start_form(&self) -> String {
        self.submitted_start.format("%m/%d/%Y").to_string()
    }

    /// Whether a detail link points at a scanned (non-tabular) filing.
    pub fn is_paper(&self, link: &str) -> bool {
        link.starts_with(&self.paper_prefix)
            || link.starts_with(&format!("{}{}", self.root, self.paper_prefix))
    }
}
