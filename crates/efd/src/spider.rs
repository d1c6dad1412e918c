use crate::cli::Variant;
use dotenv::var;
use efd_spider as spider;
use efd_spider::senate::IndexQuery;
use efd_spider::transport::{HttpTransport, USER_AGENT};
use efd_spider::{Portal, Transaction};
use std::time::Duration;
use tracing::{debug, info, trace};

/// Run-wide settings, from `.env` and the command line.
#[derive(Debug)]
pub(crate) struct Settings {
    pub portal: Portal,
    pub user_agent: String,
}

impl Settings {
    /// `USER_AGENT`, `EFD_ROOT` and `EFD_RATE_LIMIT_SECS` are read from the
    /// environment; a `--rate-limit` flag wins over the latter.
    pub(crate) fn from_env(rate_limit: Option<u64>) -> anyhow::Result<Self> {
        let mut portal = Portal::default();
        if let Ok(root) = var("EFD_ROOT") {
            portal = portal.with_root(root);
        }

        let env_rate_limit = match var("EFD_RATE_LIMIT_SECS") {
            Ok(secs) => Some(secs.parse::<u64>().map_err(|err| {
                anyhow::anyhow!("EFD_RATE_LIMIT_SECS must be whole seconds, got {secs:?}: {err}")
            })?),
            Err(_) => None,
        };
        if let Some(secs) = rate_limit.or(env_rate_limit) {
            portal = portal.with_rate_limit(Duration::from_secs(secs));
        }

        let user_agent = var("USER_AGENT").unwrap_or_else(|_| USER_AGENT.to_string());

        Ok(Self { portal, user_agent })
    }
}

/// Run the chosen spider variant to completion.
pub(crate) async fn run(
    variant: Variant,
    settings: &Settings,
    query: &IndexQuery,
    headful: bool,
    tui: bool,
) -> anyhow::Result<Vec<Transaction>> {
    trace!("spider settings: {settings:?}");

    let time = std::time::Instant::now();
    let txs = match variant {
        Variant::Http => {
            debug!("initializing http client");
            let http = HttpTransport::new(&settings.portal.root, &settings.user_agent)?;
            spider::senate::scrape(&http, &settings.portal, query, tui).await?
        }
        Variant::Browser => browser(settings, query, headful, tui)?,
    };

    info!(
        "spider finished collecting {} transactions, time elapsed: {:?}",
        txs.len(),
        time.elapsed()
    );

    Ok(txs)
}

#[cfg(feature = "chrome")]
fn browser(
    settings: &Settings,
    query: &IndexQuery,
    headful: bool,
    tui: bool,
) -> anyhow::Result<Vec<Transaction>> {
    use efd_spider::browser::{self, chrome::ChromeDriver, BrowserOptions};

    if !query.first_name.is_empty() || !query.last_name.is_empty() {
        tracing::warn!("name filters are ignored by the browser variant");
    }

    debug!("launching chrome");
    let mut driver = ChromeDriver::launch(!headful)?;
    Ok(browser::scrape(
        &mut driver,
        &settings.portal,
        &BrowserOptions::default(),
        tui,
    )?)
}

#[cfg(not(feature = "chrome"))]
fn browser(
    _settings: &Settings,
    _query: &IndexQuery,
    _headful: bool,
    _tui: bool,
) -> anyhow::Result<Vec<Transaction>> {
    anyhow::bail!("efd was built without the `chrome` feature; rebuild with `--features chrome`")
}
