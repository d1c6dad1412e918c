mod common;

use common::{index_row, ptr_page, FakePortal, Request, ROOT};
use efd_spider::senate::report::txs_for_report;
use efd_spider::senate::{Session, SessionState};
use efd_spider::{ReportRow, ScrapeError};

const PTR: &str = "/search/view/ptr/4c5d/";

fn row() -> ReportRow {
    serde_json::from_value(index_row("Jane", "Doe", PTR)).unwrap()
}

#[tokio::test]
async fn bootstrap_accepts_agreement_and_reads_csrf_cookie() {
    let fake = FakePortal::new();
    let session = Session::bootstrap(&fake, &fake.portal).await.unwrap();

    assert_eq!(session.token(), "session-1");
    assert_eq!(session.state(), SessionState::Valid);
    assert_eq!(session.refreshes(), 0);

    let requests = fake.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0], Request::Get(format!("{ROOT}/search/home/")));
    assert_eq!(requests[1].form_value("csrfmiddlewaretoken"), Some("form-token"));
    assert_eq!(requests[1].form_value("prohibition_agreement"), Some("1"));
}

#[tokio::test]
async fn bootstrap_falls_back_to_csrf_cookie() {
    let fake = FakePortal::new().with_cookie_name("csrf");
    let session = Session::bootstrap(&fake, &fake.portal).await.unwrap();
    assert_eq!(session.token(), "session-1");
}

#[tokio::test]
async fn bootstrap_fails_when_landing_page_redirects() {
    let fake = FakePortal::new().redirect_landing_to("http://efd.test/maintenance/");
    let err = Session::bootstrap(&fake, &fake.portal).await.unwrap_err();
    assert!(matches!(err, ScrapeError::Bootstrap(_)), "{err}");
    // nothing is posted once the landing page looks wrong
    assert_eq!(fake.requests().len(), 1);
}

#[tokio::test]
async fn bootstrap_fails_without_form_token() {
    let fake = FakePortal::new().with_landing_body("<html><body>Down for maintenance</body></html>");
    let err = Session::bootstrap(&fake, &fake.portal).await.unwrap_err();
    assert!(matches!(err, ScrapeError::Bootstrap(_)), "{err}");
}

#[tokio::test]
async fn expired_session_is_refreshed_and_fetch_retried_once() {
    let fake = FakePortal::new()
        .with_page(PTR, ptr_page(&[("ACME", "Stock")]))
        .expire_on(PTR, 1);
    let mut session = Session::bootstrap(&fake, &fake.portal).await.unwrap();

    let txs = txs_for_report(&fake, &fake.portal, &mut session, &row())
        .await
        .unwrap();

    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].ticker, "ACME");
    assert_eq!(fake.gets_of(PTR), 2);
    assert_eq!(fake.handshakes(), 2);
    assert_eq!(session.refreshes(), 1);
    assert!(session.is_valid());
    assert_eq!(session.token(), "session-2");
}

#[tokio::test]
async fn second_expiry_is_fatal() {
    let fake = FakePortal::new()
        .with_page(PTR, ptr_page(&[("ACME", "Stock")]))
        .expire_on(PTR, 2);
    let mut session = Session::bootstrap(&fake, &fake.portal).await.unwrap();

    let err = txs_for_report(&fake, &fake.portal, &mut session, &row())
        .await
        .unwrap_err();

    assert!(matches!(err, ScrapeError::SessionExpired(_)), "{err}");
    assert_eq!(session.state(), SessionState::Expired);
    // one retry, no more
    assert_eq!(fake.gets_of(PTR), 2);
}
