use crate::error::{Result, ScrapeError};
use crate::http::*;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::REFERER;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// Default user agent; the portal rejects the bare reqwest one.
pub const USER_AGENT: &'static str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// A fetched document, along with the URL it was finally served from.
///
/// The final URL matters: the portal signals an expired session by
/// redirecting back to its landing page.
#[derive(Clone, Debug)]
pub struct Page {
    pub url: String,
    pub body: String,
}

impl Page {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// The outbound HTTP surface of the spider.
///
/// Implementations own the cookie state; callers only ever read cookies
/// back out of it.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn get(&self, url: &str) -> Result<Page>;

    /// POST a url-encoded form, with a `Referer` header.
    async fn post_form(&self, url: &str, form: &[(&str, String)], referer: &str) -> Result<Page>;

    /// Read a cookie set by the portal.
    fn cookie(&self, name: &str) -> Option<String>;
}

impl<T: Transport + ?Sized> Transport for &T {
    async fn get(&self, url: &str) -> Result<Page> {
        (**self).get(url).await
    }

    async fn post_form(&self, url: &str, form: &[(&str, String)], referer: &str) -> Result<Page> {
        (**self).post_form(url, form, referer).await
    }

    fn cookie(&self, name: &str) -> Option<String> {
        (**self).cookie(name)
    }
}

// reqwest
// ----------------------------------------------------------------------------

/// [`Transport`] over a cookie-keeping [`reqwest::Client`].
pub struct HttpTransport {
    client: HttpClient,
    jar: Arc<Jar>,
    root: reqwest::Url,
}

impl HttpTransport {
    pub fn new(root: &str, user_agent: &str) -> Result<Self> {
        let root = reqwest::Url::parse(root)
            .map_err(|err| ScrapeError::Bootstrap(format!("invalid portal root {root}, {err}")))?;
        let jar = Arc::new(Jar::default());
        let client = reqwest::ClientBuilder::new()
            .user_agent(user_agent)
            .cookie_provider(jar.clone())
            .build()?;

        Ok(Self { client, jar, root })
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<Page> {
        trace!("GET {url}");
        let response = self.client.get(url).send().await?.error_for_status()?;
        let url = response.url().to_string();
        let body = response.text().await?;
        Ok(Page { url, body })
    }

    async fn post_form(&self, url: &str, form: &[(&str, String)], referer: &str) -> Result<Page> {
        trace!("POST {url}");
        let response = self
            .client
            .post(url)
            .header(REFERER, referer)
            .form(form)
            .send()
            .await?
            .error_for_status()?;
        let url = response.url().to_string();
        let body = response.text().await?;
        Ok(Page { url, body })
    }

    fn cookie(&self, name: &str) -> Option<String> {
        // the jar hands cookies back as a single `a=1; b=2` header value
        let header = self.jar.cookies(&self.root)?;
        let header = header.to_str().ok()?;
        header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
    }
}

// rate limiting
// ----------------------------------------------------------------------------

/// Sleeps for a fixed interval before every request of the inner transport.
///
/// A crude fixed-rate throttle; there is no backoff.
pub struct RateLimited<T> {
    inner: T,
    interval: Duration,
}

impl<T: Transport> RateLimited<T> {
    pub fn new(inner: T, interval: Duration) -> Self {
        Self { inner, interval }
    }

    async fn pause(&self) {
        if !self.interval.is_zero() {
            tokio::time::sleep(self.interval).await;
        }
    }
}

impl<T: Transport> Transport for RateLimited<T> {
    async fn get(&self, url: &str) -> Result<Page> {
        self.pause().await;
        self.inner.get(url).await
    }

    async fn post_form(&self, url: &str, form: &[(&str, String)], referer: &str) -> Result<Page> {
        self.pause().await;
        self.inner.post_form(url, form, referer).await
    }

    fn cookie(&self, name: &str) -> Option<String> {
        self.inner.cookie(name)
    }
}
