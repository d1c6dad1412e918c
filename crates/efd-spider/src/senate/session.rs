use crate::config::Portal;
use crate::error::{Result, ScrapeError};
use crate::html::csrf_token;
use crate::http::*;
use std::future::Future;
use tracing::{debug, error, info, trace};

/// Whether the portal still honours the current session cookie.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Valid,
    Expired,
}

/// An authenticated portal session.
///
/// Cookies live in the [`Transport`]; the session holds the CSRF token that
/// has to accompany every index request, and whether it is still good.
#[derive(Debug)]
pub struct Session {
    token: String,
    state: SessionState,
    refreshes: u32,
}

impl Session {
    /// Accept the portal's prohibition agreement and collect a CSRF token.
    ///
    /// 1. GET the landing page (it must not redirect elsewhere)
    /// 2. POST the agreement form back with the embedded form token
    /// 3. read the session's token from the `csrftoken` (or `csrf`) cookie
    pub async fn bootstrap<T: Transport>(http: &T, portal: &Portal) -> Result<Self> {
        let token = handshake(http, portal).await?;
        debug!("portal session established");
        Ok(Self {
            token,
            state: SessionState::Valid,
            refreshes: 0,
        })
    }

    /// Re-run the handshake, replacing the token and cookies.
    pub async fn refresh<T: Transport>(&mut self, http: &T, portal: &Portal) -> Result<()> {
        info!("resetting CSRF token and session cookie");
        self.token = handshake(http, portal).await?;
        self.state = SessionState::Valid;
        self.refreshes += 1;
        Ok(())
    }

    /// Issue a request that needs a live session.
    ///
    /// `send` is given the current token. If the portal bounces the request
    /// to its landing page, the session is marked expired, refreshed, and the
    /// request is sent exactly once more; a second bounce is fatal.
    pub async fn fetch<T, F, Fut>(
        &mut self,
        http: &T,
        portal: &Portal,
        what: &str,
        mut send: F,
    ) -> Result<Page>
    where
        T: Transport,
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<Page>>,
    {
        let page = send(self.token.clone()).await?;
        if !portal.is_landing(&page.url) {
            return Ok(page);
        }

        debug!("session expired while fetching {what}");
        self.mark_expired();
        self.refresh(http, portal).await?;

        let page = send(self.token.clone()).await?;
        if portal.is_landing(&page.url) {
            self.mark_expired();
            error!("session expired again after refresh, while fetching {what}");
            return Err(ScrapeError::SessionExpired(what.to_string()));
        }
        Ok(page)
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_valid(&self) -> bool {
        self.state == SessionState::Valid
    }

    pub fn mark_expired(&mut self) {
        self.state = SessionState::Expired;
    }

    /// Number of times the session has been re-established this run.
    pub fn refreshes(&self) -> u32 {
        self.refreshes
    }
}

async fn handshake<T: Transport>(http: &T, portal: &Portal) -> Result<String> {
    let landing = portal.landing_url();

    trace!("fetching landing page {landing}");
    let page = http.get(&landing).await.map_err(|err| {
        error!("failed to fetch filings landing page, error({err})");
        err
    })?;
    if !portal.is_landing(&page.url) {
        error!("landing page redirected to {}", page.url);
        return Err(ScrapeError::Bootstrap(format!(
            "landing page redirected to {}",
            page.url
        )));
    }

    let form_token = csrf_token(&page.body).ok_or_else(|| {
        error!("landing page has no csrfmiddlewaretoken");
        ScrapeError::Bootstrap("landing page has no csrfmiddlewaretoken".to_string())
    })?;

    trace!("accepting prohibition agreement");
    let form = [
        ("csrfmiddlewaretoken", form_token),
        ("prohibition_agreement", "1".to_string()),
    ];
    http.post_form(&landing, &form, &landing).await?;

    http.cookie("csrftoken")
        .or_else(|| http.cookie("csrf"))
        .ok_or_else(|| {
            error!("portal did not set a csrf cookie");
            ScrapeError::Bootstrap("portal did not set a csrf cookie".to_string())
        })
}
