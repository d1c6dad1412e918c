use super::layout::{TransactionLayout, BLANK_TICKERS, TRANSACTION_LAYOUT};
use super::session::Session;
use crate::config::Portal;
use crate::error::Result;
use crate::html::{first_tbody, Cell};
use crate::http::*;
use crate::model::{ReportRow, Transaction};
use tracing::{debug, trace, warn};

/// Fetch a report's filing page and extract its transactions.
///
/// Paper filings and pages without a transaction table yield nothing. An
/// expired session is refreshed and the page fetched once more.
pub async fn txs_for_report<T: Transport>(
    http: &T,
    portal: &Portal,
    session: &mut Session,
    row: &ReportRow,
) -> Result<Vec<Transaction>> {
    if !is_tabular(portal, &row.detail_link) {
        debug!(
            "skipping non-tabular report for {} {}: {:?}",
            row.first_name, row.last_name, row.detail_link
        );
        return Ok(vec![]);
    }

    let url = portal.absolute(&row.detail_link);
    let url = url.as_str();
    let page = session
        .fetch(http, portal, url, move |_token| http.get(url))
        .await?;

    Ok(parse_report(&page.body, row, &portal.tracked_asset_type))
}

/// Whether a detail link points at a filing that has an HTML table.
pub fn is_tabular(portal: &Portal, link: &str) -> bool {
    !link.trim().is_empty() && !portal.is_paper(link)
}

/// Transactions from the first `<tbody>` of a filing page.
pub fn parse_report(body: &str, row: &ReportRow, tracked_asset_type: &str) -> Vec<Transaction> {
    let Some(table) = first_tbody(body) else {
        debug!(
            "no transaction table for {} {} at {}",
            row.first_name, row.last_name, row.detail_link
        );
        return vec![];
    };

    table
        .iter()
        .filter_map(|cells| transaction(cells, row, &TRANSACTION_LAYOUT, tracked_asset_type))
        .collect()
}

/// Map one table row through the layout, dropping rows that are neither the
/// tracked asset type nor carry a ticker.
fn transaction(
    cells: &[Cell],
    row: &ReportRow,
    layout: &TransactionLayout,
    tracked_asset_type: &str,
) -> Option<Transaction> {
    if cells.len() < layout.width() {
        warn!(
            "skipping transaction row with {} cells in report {}",
            cells.len(),
            row.detail_link
        );
        return None;
    }

    let text = |index: usize| cells[index].text.clone();
    let ticker = text(layout.ticker);
    let asset_type = text(layout.asset_type);
    if !is_kept(&asset_type, &ticker, tracked_asset_type) {
        trace!("dropping {asset_type} row without ticker");
        return None;
    }

    Some(Transaction {
        tx_date: text(layout.tx_date),
        file_date: row.date_received.clone(),
        last_name: row.last_name.clone(),
        first_name: row.first_name.clone(),
        order_type: text(layout.order_type),
        ticker,
        asset_name: text(layout.asset_name),
        tx_amount: text(layout.tx_amount),
    })
}

/// A row is excluded only when it is not the tracked asset type AND has a
/// blank or placeholder ticker.
///
/// ```
/// use efd_spider::senate::report::is_kept;
///
/// assert!(is_kept("Stock", "--", "Stock"));
/// assert!(is_kept("Corporate Bond", "IBM", "Stock"));
/// assert!(!is_kept("Municipal Security", "--", "Stock"));
/// ```
pub fn is_kept(asset_type: &str, ticker: &str, tracked_asset_type: &str) -> bool {
    asset_type.trim() == tracked_asset_type || !BLANK_TICKERS.contains(&ticker.trim())
}
