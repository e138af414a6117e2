use std::time::Duration;

use listing_core::NavigableLocation;
use listing_engine::{
    response_text, strict_response_text, FailureKind, FetchSettings, Fetcher, ReqwestFetcher,
    SyncConfig, FRAGMENT_HEADER, FRAGMENT_HEADER_VALUE,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn location(server: &MockServer, path_and_query: &str) -> NavigableLocation {
    NavigableLocation::parse(&format!("{}{}", server.uri(), path_and_query)).unwrap()
}

fn strict() -> FetchSettings {
    FetchSettings {
        strict: true,
        ..FetchSettings::default()
    }
}

#[tokio::test]
async fn sends_fragment_header_and_keeps_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doctors/"))
        .and(query_param("category", "dentist"))
        .and(query_param("search", "smith"))
        .and(header(FRAGMENT_HEADER, FRAGMENT_HEADER_VALUE))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<div class="row">smith</div>"#,
            "text/html; charset=utf-8",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let target = location(&server, "/doctors/?category=dentist&search=smith");

    let output = fetcher.fetch(&target).await.expect("fetch ok");
    assert_eq!(output.metadata.status, 200);
    assert_eq!(output.metadata.requested_url, target.to_string());
    assert_eq!(output.metadata.redirect_count, 0);
    assert_eq!(response_text(&output), r#"<div class="row">smith</div>"#);
}

#[tokio::test]
async fn configured_header_replaces_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("X-Fragment", "listing"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("ok", "text/html"))
        .expect(1)
        .mount(&server)
        .await;

    let config = SyncConfig::from_ron(
        r#"(fetch: (fragment_header: "X-Fragment", fragment_header_value: "listing"))"#,
    )
    .unwrap();
    let fetcher = ReqwestFetcher::new(config.fetch_settings());

    let output = fetcher.fetch(&location(&server, "/")).await.unwrap();
    assert_eq!(output.body, b"ok");
}

#[tokio::test]
async fn error_status_body_is_still_returned_by_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doctors/"))
        .respond_with(ResponseTemplate::new(500).set_body_raw("<p>oops</p>", "text/html"))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let output = fetcher
        .fetch(&location(&server, "/doctors/?page=9"))
        .await
        .expect("any answer is usable");
    assert_eq!(output.metadata.status, 500);
    assert_eq!(response_text(&output), "<p>oops</p>");
}

#[tokio::test]
async fn strict_mode_fails_on_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doctors/"))
        .respond_with(ResponseTemplate::new(500).set_body_raw("<p>oops</p>", "text/html"))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(strict());
    let err = fetcher
        .fetch(&location(&server, "/doctors/?page=9"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_raw("slow", "text/html"),
        )
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    });
    let err = fetcher.fetch(&location(&server, "/slow")).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("x".repeat(64), "text/html"))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings {
        max_bytes: 16,
        ..FetchSettings::default()
    });
    let err = fetcher.fetch(&location(&server, "/big")).await.unwrap_err();
    assert!(matches!(
        err.kind,
        FailureKind::TooLarge { max_bytes: 16, .. }
    ));
}

#[tokio::test]
async fn non_html_content_type_is_accepted_by_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let output = fetcher.fetch(&location(&server, "/api")).await.unwrap();
    assert_eq!(output.metadata.content_type.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn strict_mode_rejects_non_html_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(strict());
    let err = fetcher.fetch(&location(&server, "/api")).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::UnsupportedContentType {
            content_type: "application/json".to_string()
        }
    );
}

#[tokio::test]
async fn malformed_body_is_replaced_or_rejected_by_mode() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"<p>bad \xff</p>".to_vec(), "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let output = fetcher.fetch(&location(&server, "/")).await.unwrap();
    assert_eq!(response_text(&output), "<p>bad \u{FFFD}</p>");
    let err = strict_response_text(&output).unwrap_err();
    assert!(matches!(err.kind, FailureKind::Undecodable { .. }));
}

#[tokio::test]
async fn non_http_scheme_is_rejected_before_sending() {
    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let target = NavigableLocation::parse("ftp://clinic.test/doctors/").unwrap();

    let err = fetcher.fetch(&target).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}

#[tokio::test]
async fn legacy_charset_is_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"<p>Caf\xe9</p>".to_vec(), "text/html; charset=windows-1252"),
        )
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let output = fetcher.fetch(&location(&server, "/")).await.unwrap();
    assert_eq!(response_text(&output), "<p>Café</p>");
}
