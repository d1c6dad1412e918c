//! The portal, driven through a real browser instead of its JSON endpoint.
//!
//! Everything here goes through [`Driver`], so the same pagination and
//! detail-window handling runs against headless Chrome (the `chrome`
//! feature) or against recorded pages in tests.

use crate::config::Portal;
use crate::error::{Result, ScrapeError};
use crate::html::first_tbody;
use crate::model::{ReportRow, Transaction};
use crate::senate::layout::RESULTS_LAYOUT;
use crate::senate::report;
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

#[cfg(feature = "chrome")]
pub mod chrome;

/// Opaque handle of a browser window (a tab, for Chrome).
pub type WindowHandle = String;

// selectors
// ----------------------------------------------------------------------------

pub const AGREE_CHECKBOX: &'static str = "#agree_statement";
pub const FROM_DATE: &'static str = "#fromDate";
pub const PTR_CHECKBOX: &'static str = r#"input.report_types[value="11"]"#;
pub const SEARCH_BUTTON: &'static str = r#"form#searchForm button[type="submit"]"#;
pub const RESULTS_TABLE: &'static str = "#filedReports";
pub const RESULTS_ROWS: &'static str = "#filedReports tbody tr";
pub const PAGE_LENGTH: &'static str = r#"select[name="filedReports_length"]"#;
pub const DATE_RECEIVED_HEADER: &'static str = "#filedReports thead th:nth-child(5)";
pub const NEXT_BUTTON: &'static str = "#filedReports_next";
pub const TRANSACTION_TABLE: &'static str = "table";

/// What the spider needs from a browser.
///
/// Element lookups that hit a re-rendered node must fail with
/// [`ScrapeError::StaleElement`]; the caller decides whether to retry.
pub trait Driver {
    fn navigate(&mut self, url: &str) -> Result<()>;

    fn current_url(&mut self) -> Result<String>;

    fn wait_for_element(&mut self, selector: &str) -> Result<()>;

    fn click(&mut self, selector: &str) -> Result<()>;

    /// Type `text` into an input.
    fn fill(&mut self, selector: &str, text: &str) -> Result<()>;

    /// Choose an `<option>` of a `<select>` by value.
    fn select(&mut self, selector: &str, value: &str) -> Result<()>;

    fn attribute(&mut self, selector: &str, name: &str) -> Result<Option<String>>;

    /// Outer HTML of the first matching table; `None` when there is none.
    fn read_table(&mut self, selector: &str) -> Result<Option<String>>;

    fn current_window(&self) -> WindowHandle;

    /// Open `url` in a new window and focus it.
    fn open_window(&mut self, url: &str) -> Result<WindowHandle>;

    fn switch_to(&mut self, window: &WindowHandle) -> Result<()>;

    /// Close the focused window. Focus is undefined until [`Driver::switch_to`].
    fn close_window(&mut self) -> Result<()>;
}

/// Timing knobs for the browser variant.
#[derive(Clone, Debug)]
pub struct BrowserOptions {
    /// Pause before retrying an element that went stale.
    pub stale_pause: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            stale_pause: Duration::from_secs(1),
        }
    }
}

// scrape
// ----------------------------------------------------------------------------

/// Collect every periodic transaction by clicking through the search UI.
pub fn scrape<D: Driver>(
    driver: &mut D,
    portal: &Portal,
    options: &BrowserOptions,
    tui: bool,
) -> Result<Vec<Transaction>> {
    let time = std::time::Instant::now();

    info!("accepting portal terms");
    driver.navigate(&portal.landing_url())?;
    agree(driver, options)?;

    info!("searching periodic transaction reports");
    search(driver, portal, options)?;

    let results = driver.current_window();
    let pb = crate::tui::spinner("fetching reports ...", tui)?;

    let mut all_txs: Vec<Transaction> = Vec::new();
    let mut reports = 0;
    let mut page = 0;
    loop {
        page += 1;
        let table = retry_stale(RESULTS_TABLE, options.stale_pause, || {
            driver.wait_for_element(RESULTS_ROWS)?;
            driver.read_table(RESULTS_TABLE)
        })?;
        let rows = table.as_deref().map(results_rows).unwrap_or_default();
        debug!("results page {page}: {} reports", rows.len());

        for row in &rows {
            if reports % 10 == 0 {
                info!("fetching report #{reports}");
                info!("{} transactions total", all_txs.len());
            }
            let txs = txs_in_window(driver, portal, options, &results, row).map_err(|err| {
                error!(
                    "failed to fetch report for {} {} at {}, error({err})",
                    row.first_name, row.last_name, row.detail_link
                );
                err
            })?;
            all_txs.extend(txs);
            reports += 1;
            pb.inc(1);
        }

        let class = retry_stale(NEXT_BUTTON, options.stale_pause, || {
            driver.attribute(NEXT_BUTTON, "class")
        })?;
        let Some(class) = class else {
            warn!("next button has no class attribute; treating page {page} as the last");
            break;
        };
        if class.split_whitespace().any(|c| c == "disabled") {
            break;
        }
        retry_stale(NEXT_BUTTON, options.stale_pause, || driver.click(NEXT_BUTTON))?;
        pause(portal.rate_limit);
    }

    pb.finish_and_clear();
    if tui {
        println!("fetching reports ... done\n");
    }

    debug!(
        "{} transactions collected from {reports} reports over {page} pages. {}",
        all_txs.len(),
        crate::time_elapsed(time)
    );

    Ok(all_txs)
}

/// Run `op`, and once more after `pause` if an element went stale in between.
/// A second stale element is returned to the caller.
pub fn retry_stale<T>(
    what: &str,
    pause: Duration,
    mut op: impl FnMut() -> Result<T>,
) -> Result<T> {
    match op() {
        Err(ScrapeError::StaleElement(selector)) => {
            warn!("element {selector} went stale while reading {what}; retrying");
            std::thread::sleep(pause);
            op().map_err(|err| {
                error!("{what} went stale twice, error({err})");
                err
            })
        }
        other => other,
    }
}

/// Tick the prohibition agreement on the current page.
fn agree<D: Driver>(driver: &mut D, options: &BrowserOptions) -> Result<()> {
    retry_stale(AGREE_CHECKBOX, options.stale_pause, || {
        driver.wait_for_element(AGREE_CHECKBOX)?;
        driver.click(AGREE_CHECKBOX)
    })
}

/// Fill in the date range and report type, then size and sort the results.
fn search<D: Driver>(driver: &mut D, portal: &Portal, options: &BrowserOptions) -> Result<()> {
    let from = portal.submitted_start_form();
    retry_stale(FROM_DATE, options.stale_pause, || {
        driver.wait_for_element(FROM_DATE)?;
        driver.fill(FROM_DATE, &from)?;
        driver.click(PTR_CHECKBOX)?;
        driver.click(SEARCH_BUTTON)
    })?;

    let length = portal.batch_size.to_string();
    retry_stale(PAGE_LENGTH, options.stale_pause, || {
        driver.wait_for_element(RESULTS_ROWS)?;
        driver.select(PAGE_LENGTH, &length)
    })?;
    pause(portal.rate_limit);

    retry_stale(DATE_RECEIVED_HEADER, options.stale_pause, || {
        driver.wait_for_element(DATE_RECEIVED_HEADER)?;
        driver.click(DATE_RECEIVED_HEADER)
    })?;
    pause(portal.rate_limit);

    Ok(())
}

/// Report rows from the outer HTML of the results table.
pub fn results_rows(table: &str) -> Vec<ReportRow> {
    let layout = RESULTS_LAYOUT;
    first_tbody(table)
        .unwrap_or_default()
        .into_iter()
        // "No matching records found" spans a single cell
        .filter(|cells| cells.len() >= layout.width())
        .map(|cells| ReportRow {
            first_name: cells[layout.first_name].text.clone(),
            last_name: cells[layout.last_name].text.clone(),
            report_type: cells[layout.report_type].text.clone(),
            detail_link: cells[layout.link].href.clone().unwrap_or_default(),
            date_received: cells[layout.date_received].text.clone(),
        })
        .collect()
}

/// Open a report in its own window, read its transactions, close the window
/// and return to the results.
fn txs_in_window<D: Driver>(
    driver: &mut D,
    portal: &Portal,
    options: &BrowserOptions,
    results: &WindowHandle,
    row: &ReportRow,
) -> Result<Vec<Transaction>> {
    if !report::is_tabular(portal, &row.detail_link) {
        debug!(
            "skipping non-tabular report for {} {}: {:?}",
            row.first_name, row.last_name, row.detail_link
        );
        return Ok(vec![]);
    }

    let url = portal.absolute(&row.detail_link);
    pause(portal.rate_limit);

    in_new_window(driver, &url, results, |driver| {
        if portal.is_landing(&driver.current_url()?) {
            info!("report window landed on the agreement page; accepting again");
            agree(driver, options)?;
            driver.navigate(&url)?;
            if portal.is_landing(&driver.current_url()?) {
                return Err(ScrapeError::SessionExpired(url.clone()));
            }
        }

        let table = driver.read_table(TRANSACTION_TABLE)?;
        Ok(table
            .map(|html| report::parse_report(&html, row, &portal.tracked_asset_type))
            .unwrap_or_default())
    })
}

/// Run `f` in a fresh window on `url`.
///
/// The window is closed and focus handed back to `home` whether or not `f`
/// succeeded; losing track of `home` is an error of its own.
pub fn in_new_window<D: Driver, T>(
    driver: &mut D,
    url: &str,
    home: &WindowHandle,
    f: impl FnOnce(&mut D) -> Result<T>,
) -> Result<T> {
    let window = driver.open_window(url)?;
    trace!("opened window {window} on {url}");

    let outcome = f(driver);

    let restored = restore_focus(driver, home);
    match (outcome, restored) {
        (Ok(value), Ok(())) => Ok(value),
        (Err(err), _) | (Ok(_), Err(err)) => Err(err),
    }
}

fn restore_focus<D: Driver>(driver: &mut D, home: &WindowHandle) -> Result<()> {
    driver.close_window()?;
    driver.switch_to(home)?;

    let found = driver.current_window();
    if &found != home {
        error!("expected focus on window {home}, found {found}");
        return Err(ScrapeError::WindowFocus {
            expected: home.clone(),
            found,
        });
    }
    Ok(())
}

fn pause(duration: Duration) {
    if !duration.is_zero() {
        std::thread::sleep(duration);
    }
}
