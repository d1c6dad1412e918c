#![allow(dead_code)]

use efd_spider::transport::{Page, Transport};
use efd_spider::{Portal, Result};
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::time::Duration;

pub const ROOT: &str = "http://efd.test";
pub const FORM_TOKEN: &str = "form-token";

/// The live portal's constants, pointed at the fake host with no rate limit.
pub fn portal() -> Portal {
    Portal::default()
        .with_root(ROOT)
        .with_rate_limit(Duration::ZERO)
}

pub fn landing_html() -> String {
    format!(
        r#"<html><body><form id="agreement_form" method="post">
            <input type="hidden" name="csrfmiddlewaretoken" value="{FORM_TOKEN}">
            <input id="agree_statement" type="checkbox" name="prohibition_agreement" value="1">
        </form></body></html>"#
    )
}

/// One row of the report index, as the JSON endpoint returns it.
pub fn index_row(first: &str, last: &str, link: &str) -> Value {
    json!([
        first,
        last,
        format!("{last}, {first} (Senator)"),
        format!(r#"<a href="{link}" target="_blank">Periodic Transaction Report for 01/02/2020</a>"#),
        "01/03/2020",
    ])
}

/// A filing page with one transaction row per `(ticker, asset_type)`.
pub fn ptr_page(rows: &[(&str, &str)]) -> String {
    let rows: String = rows
        .iter()
        .enumerate()
        .map(|(i, (ticker, asset_type))| {
            format!(
                "<tr>\n<td>{n}</td>\n<td>01/02/2020</td>\n<td>Self</td>\n\
                 <td>\n  {ticker}\n</td>\n<td>{ticker} Holdings</td>\n<td>{asset_type}</td>\n\
                 <td>Purchase</td>\n<td>$1,001 - $15,000</td>\n<td>--</td>\n</tr>",
                n = i + 1
            )
        })
        .collect();
    format!(
        "<html><body><section class=\"card\"><table class=\"table\">\
         <thead><tr><th>#</th><th>Transaction Date</th><th>Owner</th><th>Ticker</th>\
         <th>Asset Name</th><th>Asset Type</th><th>Type</th><th>Amount</th><th>Comment</th></tr></thead>\
         <tbody>{rows}</tbody></table></section></body></html>"
    )
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    Get(String),
    Post { url: String, form: Vec<(String, String)> },
}

impl Request {
    pub fn form_value(&self, key: &str) -> Option<&str> {
        match self {
            Request::Post { form, .. } => form
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            Request::Get(_) => None,
        }
    }
}

/// An in-memory Senate portal.
///
/// Serves the landing page and agreement handshake, pages of the report
/// index, and filing pages by path. Paths registered with
/// [`FakePortal::expire_on`] bounce to the landing page that many times,
/// the way the live portal does once a session cookie times out.
pub struct FakePortal {
    pub portal: Portal,
    batches: Vec<Vec<Value>>,
    pages: HashMap<String, String>,
    expire: RefCell<HashMap<String, usize>>,
    landing_redirect: Option<String>,
    landing_body: String,
    cookie_name: &'static str,
    cookies: RefCell<HashMap<String, String>>,
    handshakes: Cell<usize>,
    log: RefCell<Vec<Request>>,
}

impl FakePortal {
    pub fn new() -> Self {
        Self {
            portal: portal(),
            batches: vec![],
            pages: HashMap::new(),
            expire: RefCell::new(HashMap::new()),
            landing_redirect: None,
            landing_body: landing_html(),
            cookie_name: "csrftoken",
            cookies: RefCell::new(HashMap::new()),
            handshakes: Cell::new(0),
            log: RefCell::new(vec![]),
        }
    }

    /// Next page of the report index; pages are served in registration order.
    pub fn with_batch(mut self, rows: Vec<Value>) -> Self {
        self.batches.push(rows);
        self
    }

    pub fn with_page(mut self, path: &str, body: String) -> Self {
        self.pages.insert(path.to_string(), body);
        self
    }

    pub fn expire_on(self, path: &str, times: usize) -> Self {
        self.expire.borrow_mut().insert(path.to_string(), times);
        self
    }

    pub fn with_cookie_name(mut self, name: &'static str) -> Self {
        self.cookie_name = name;
        self
    }

    pub fn redirect_landing_to(mut self, url: &str) -> Self {
        self.landing_redirect = Some(url.to_string());
        self
    }

    pub fn with_landing_body(mut self, body: &str) -> Self {
        self.landing_body = body.to_string();
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.log.borrow().clone()
    }

    pub fn gets_of(&self, path: &str) -> usize {
        let url = format!("{ROOT}{path}");
        self.log
            .borrow()
            .iter()
            .filter(|r| **r == Request::Get(url.clone()))
            .count()
    }

    pub fn posts_to(&self, url: &str) -> Vec<Request> {
        self.log
            .borrow()
            .iter()
            .filter(|r| matches!(r, Request::Post { url: u, .. } if u == url))
            .cloned()
            .collect()
    }

    pub fn handshakes(&self) -> usize {
        self.handshakes.get()
    }

    fn path<'a>(&self, url: &'a str) -> &'a str {
        url.strip_prefix(ROOT).unwrap_or(url)
    }

    /// Bounce to the landing page if `path` is still set to expire.
    fn expired(&self, path: &str) -> Option<Page> {
        let mut expire = self.expire.borrow_mut();
        let remaining = expire.get_mut(path)?;
        if *remaining == 0 {
            return None;
        }
        *remaining -= 1;
        Some(Page {
            url: format!("{}?next={path}", self.portal.landing_url()),
            body: self.landing_body.clone(),
        })
    }
}

impl Transport for FakePortal {
    async fn get(&self, url: &str) -> Result<Page> {
        self.log.borrow_mut().push(Request::Get(url.to_string()));

        if url == self.portal.landing_url() {
            let url = self
                .landing_redirect
                .clone()
                .unwrap_or_else(|| url.to_string());
            return Ok(Page {
                url,
                body: self.landing_body.clone(),
            });
        }

        let path = self.path(url);
        if let Some(page) = self.expired(path) {
            return Ok(page);
        }
        let body = self
            .pages
            .get(path)
            .cloned()
            .unwrap_or_else(|| "<html><body><h1>Not Found</h1></body></html>".to_string());
        Ok(Page {
            url: url.to_string(),
            body,
        })
    }

    async fn post_form(&self, url: &str, form: &[(&str, String)], _referer: &str) -> Result<Page> {
        let form: Vec<(String, String)> = form
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        let request = Request::Post {
            url: url.to_string(),
            form,
        };
        self.log.borrow_mut().push(request.clone());

        if url == self.portal.landing_url() {
            let accepted = request.form_value("csrfmiddlewaretoken") == Some(FORM_TOKEN)
                && request.form_value("prohibition_agreement") == Some("1");
            if accepted {
                let n = self.handshakes.get() + 1;
                self.handshakes.set(n);
                self.cookies
                    .borrow_mut()
                    .insert(self.cookie_name.to_string(), format!("session-{n}"));
            }
            return Ok(Page {
                url: self.portal.search_url(),
                body: String::new(),
            });
        }

        if url == self.portal.reports_url() {
            if let Some(page) = self.expired(self.path(url)) {
                return Ok(page);
            }
            let start: usize = request
                .form_value("start")
                .and_then(|s| s.parse().ok())
                .unwrap_or(0);
            let batch = self
                .batches
                .get(start / self.portal.batch_size)
                .cloned()
                .unwrap_or_default();
            let body = json!({
                "draw": 1,
                "recordsTotal": batch.len(),
                "recordsFiltered": batch.len(),
                "data": batch,
            });
            return Ok(Page {
                url: url.to_string(),
                body: body.to_string(),
            });
        }

        Ok(Page {
            url: url.to_string(),
            body: String::new(),
        })
    }

    fn cookie(&self, name: &str) -> Option<String> {
        self.cookies.borrow().get(name).cloned()
    }
}
