use super::session::Session;
use crate::config::Portal;
use crate::error::Result;
use crate::http::*;
use crate::model::ReportRow;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, error, info};

/// Filters applied to the report index, beyond the fixed report type and
/// start date.
#[derive(Clone, Debug, Default)]
pub struct IndexQuery {
    pub first_name: String,
    pub last_name: String,
    pub submitted_end: Option<NaiveDate>,
}

impl IndexQuery {
    /// Form body for one page of the report data endpoint.
    pub fn form(&self, portal: &Portal, offset: usize, token: String) -> Vec<(&'static str, String)> {
        let submitted_end_date = self
            .submitted_end
            .map(|date| date.format("%m/%d/%Y 23:59:59").to_string())
            .unwrap_or_default();

        vec![
            ("start", offset.to_string()),
            ("length", portal.batch_size.to_string()),
            ("report_types", portal.report_types.clone()),
            ("filer_types", "[]".to_string()),
            ("submitted_start_date", portal.submitted_start_date()),
            ("submitted_end_date", submitted_end_date),
            ("candidate_state", String::new()),
            ("senator_state", String::new()),
            ("office_id", String::new()),
            ("first_name", self.first_name.clone()),
            ("last_name", self.last_name.clone()),
            ("csrfmiddlewaretoken", token),
        ]
    }
}

// `{ "draw": 1, "recordsTotal": 1234, "recordsFiltered": 1234, "data": [[...], ...] }`
#[derive(Debug, Deserialize)]
struct IndexResponse {
    data: Vec<ReportRow>,
}

/// Fetch one batch of report rows, starting at `offset`.
pub async fn reports_api<T: Transport>(
    http: &T,
    portal: &Portal,
    session: &mut Session,
    query: &IndexQuery,
    offset: usize,
) -> Result<Vec<ReportRow>> {
    info!("getting rows starting at {offset}");

    let url = portal.reports_url();
    let referer = portal.search_url();
    let (url, referer) = (url.as_str(), referer.as_str());
    let what = format!("report index at offset {offset}");
    let page = session
        .fetch(http, portal, &what, |token| {
            let form = query.form(portal, offset, token);
            async move { http.post_form(url, &form, referer).await }
        })
        .await?;

    let response: IndexResponse = page.json().map_err(|err| {
        error!("failed to deserialize {what}, error({err})");
        err
    })?;

    Ok(response.data)
}

/// Page through the whole report index.
///
/// Batches are requested with an increasing offset until the portal returns
/// an empty one, and concatenated in request order.
pub async fn senator_reports<T: Transport>(
    http: &T,
    portal: &Portal,
    session: &mut Session,
    query: &IndexQuery,
) -> Result<Vec<ReportRow>> {
    let time = std::time::Instant::now();

    let mut offset = 0;
    let mut all_reports = Vec::new();
    loop {
        let reports = reports_api(http, portal, session, query, offset).await?;
        if reports.is_empty() {
            break;
        }
        all_reports.extend(reports);
        offset += portal.batch_size;
    }

    debug!(
        "{} report rows indexed. {}",
        all_reports.len(),
        crate::time_elapsed(time)
    );

    Ok(all_reports)
}
