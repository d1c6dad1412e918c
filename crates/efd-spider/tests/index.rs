mod common;

use common::{index_row, FakePortal, ROOT};
use efd_spider::senate::index::{reports_api, senator_reports};
use efd_spider::senate::{IndexQuery, Session};

fn rows(prefix: &str, n: usize) -> Vec<serde_json::Value> {
    (0..n)
        .map(|i| index_row(&format!("{prefix}{i}"), "Doe", &format!("/search/view/ptr/{prefix}{i}/")))
        .collect()
}

#[tokio::test]
async fn pagination_stops_at_empty_batch_and_keeps_order() {
    let fake = FakePortal::new().with_batch(rows("a", 100)).with_batch(rows("b", 7));
    let mut session = Session::bootstrap(&fake, &fake.portal).await.unwrap();

    let reports = senator_reports(&fake, &fake.portal, &mut session, &IndexQuery::default())
        .await
        .unwrap();

    assert_eq!(reports.len(), 107);
    assert_eq!(reports[0].first_name, "a0");
    assert_eq!(reports[99].first_name, "a99");
    assert_eq!(reports[100].first_name, "b0");
    assert_eq!(reports[106].detail_link, "/search/view/ptr/b6/");

    let offsets: Vec<String> = fake
        .posts_to(&format!("{ROOT}/search/report/data/"))
        .iter()
        .map(|r| r.form_value("start").unwrap().to_string())
        .collect();
    assert_eq!(offsets, ["0", "100", "200"]);
}

#[tokio::test]
async fn empty_index_makes_one_request() {
    let fake = FakePortal::new();
    let mut session = Session::bootstrap(&fake, &fake.portal).await.unwrap();

    let reports = senator_reports(&fake, &fake.portal, &mut session, &IndexQuery::default())
        .await
        .unwrap();

    assert!(reports.is_empty());
    assert_eq!(fake.posts_to(&format!("{ROOT}/search/report/data/")).len(), 1);
}

#[tokio::test]
async fn request_carries_fixed_filters_and_token() {
    let fake = FakePortal::new().with_batch(rows("a", 1));
    let mut session = Session::bootstrap(&fake, &fake.portal).await.unwrap();
    let query = IndexQuery {
        last_name: "Doe".to_string(),
        ..Default::default()
    };

    reports_api(&fake, &fake.portal, &mut session, &query, 0)
        .await
        .unwrap();

    let posts = fake.posts_to(&format!("{ROOT}/search/report/data/"));
    let request = &posts[0];
    assert_eq!(request.form_value("length"), Some("100"));
    assert_eq!(request.form_value("report_types"), Some("[11]"));
    assert_eq!(request.form_value("filer_types"), Some("[]"));
    assert_eq!(
        request.form_value("submitted_start_date"),
        Some("01/01/2012 00:00:00")
    );
    assert_eq!(request.form_value("submitted_end_date"), Some(""));
    assert_eq!(request.form_value("last_name"), Some("Doe"));
    assert_eq!(request.form_value("first_name"), Some(""));
    assert_eq!(request.form_value("csrfmiddlewaretoken"), Some(session.token()));
}

#[tokio::test]
async fn index_survives_session_expiry() {
    let fake = FakePortal::new()
        .with_batch(rows("a", 100))
        .with_batch(rows("b", 3))
        .expire_on("/search/report/data/", 1);
    let mut session = Session::bootstrap(&fake, &fake.portal).await.unwrap();

    let reports = senator_reports(&fake, &fake.portal, &mut session, &IndexQuery::default())
        .await
        .unwrap();

    assert_eq!(reports.len(), 103);
    assert_eq!(session.refreshes(), 1);
    // the retried request carries the refreshed token
    let posts = fake.posts_to(&format!("{ROOT}/search/report/data/"));
    assert_eq!(posts[0].form_value("csrfmiddlewaretoken"), Some("session-1"));
    assert_eq!(posts[1].form_value("csrfmiddlewaretoken"), Some("session-2"));
    assert_eq!(posts[1].form_value("start"), Some("0"));
}
