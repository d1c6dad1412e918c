use crate::config::Portal;
use crate::error::Result;
use crate::http::*;
use crate::model::Transaction;
use crate::transport::RateLimited;
use tracing::{debug, error, info};

/// Column positions of the portal's tables.
pub mod layout;

/// Paginated search over the report index.
pub mod index;

/// Filing pages and their transaction tables.
pub mod report;

/// CSRF handshake and expiry tracking.
pub mod session;

pub use index::IndexQuery;
pub use session::{Session, SessionState};

// scrape
// ----------------------------------------------------------------------------

/// Collect every periodic transaction filed since the portal's start date.
///
/// Strictly sequential: bootstrap a session, page through the index, then
/// fetch each report in the order the index listed it. Every request waits
/// out `portal.rate_limit` first.
pub async fn scrape<T: Transport>(
    http: &T,
    portal: &Portal,
    query: &IndexQuery,
    tui: bool,
) -> Result<Vec<Transaction>> {
    let time = std::time::Instant::now();
    let http = &RateLimited::new(http, portal.rate_limit);

    info!("initializing portal session");
    let mut session = Session::bootstrap(http, portal).await?;

    info!("fetching report index ...");
    let reports = index::senator_reports(http, portal, &mut session, query).await?;
    info!("{} reports indexed", reports.len());

    let pb = crate::tui::progress_bar(reports.len(), "fetching reports ...", tui)?;

    let mut all_txs: Vec<Transaction> = Vec::new();
    for (i, row) in reports.iter().enumerate() {
        if i % 10 == 0 {
            info!("fetching report #{i}");
            info!("{} transactions total", all_txs.len());
        }

        let txs = report::txs_for_report(http, portal, &mut session, row)
            .await
            .map_err(|err| {
                error!(
                    "failed to fetch report for {} {} at {}, error({err})",
                    row.first_name, row.last_name, row.detail_link
                );
                err
            })?;
        all_txs.extend(txs);
        pb.inc(1);
    }

    pb.finish_and_clear();
    if tui {
        println!("fetching reports ... done\n");
    }

    debug!(
        "{} transactions collected from {} reports, {} session refreshes. {}",
        all_txs.len(),
        reports.len(),
        session.refreshes(),
        crate::time_elapsed(time)
    );

    Ok(all_txs)
}
