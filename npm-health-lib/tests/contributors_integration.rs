//! Integration tests for the GitHub contributor counter using wiremock

use core::time::Duration;
use npm_health_lib::facts::hosting::{Client, ContributorCountStrategy, ContributorCounter};
use npm_health_lib::facts::{FetchError, RepositoryReference};
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CONTRIBUTORS_PATH: &str = "/repos/honojs/hono/contributors";

fn counter(server: &MockServer, strategy: ContributorCountStrategy, max_pages: u32) -> ContributorCounter {
    let client = Client::new(None, &server.uri(), "npm-health-tests", Duration::from_secs(5)).expect("Failed to create client");
    ContributorCounter::new(client, strategy, max_pages)
}

fn hono() -> RepositoryReference {
    RepositoryReference::new("honojs", "hono", None)
}

fn contributors(count: usize) -> Value {
    Value::Array((0..count).map(|i| json!({ "login": format!("user{i}"), "contributions": 1 })).collect())
}

fn link(server: &MockServer, rels: &[(&str, u32)]) -> String {
    rels.iter()
        .map(|(rel, page)| format!("<{}{CONTRIBUTORS_PATH}?per_page=100&page={page}>; rel=\"{rel}\"", server.uri()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[tokio::test]
async fn test_link_header_reads_last_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CONTRIBUTORS_PATH))
        .and(query_param("per_page", "1"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])).insert_header(
            "link",
            r#"<https://api.github.com/repositories/438384984/contributors?per_page=1&page=2>; rel="next", <https://api.github.com/repositories/438384984/contributors?per_page=1&page=110>; rel="last""#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let count = counter(&server, ContributorCountStrategy::LinkHeader, 100).count(&hono()).await.unwrap();
    assert_eq!(count, 110);
}

#[tokio::test]
async fn test_link_header_single_page_without_links() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CONTRIBUTORS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(contributors(1)))
        .expect(1)
        .mount(&server)
        .await;

    let count = counter(&server, ContributorCountStrategy::LinkHeader, 100).count(&hono()).await.unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_link_header_falls_back_to_enumeration() {
    let server = MockServer::start().await;

    // first probe advertises a next page but no last page
    Mock::given(method("GET"))
        .and(path(CONTRIBUTORS_PATH))
        .and(query_param("per_page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(contributors(1))
                .insert_header("link", link(&server, &[("next", 2)]).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(CONTRIBUTORS_PATH))
        .and(query_param("per_page", "100"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(contributors(100))
                .insert_header("link", link(&server, &[("next", 2)]).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(CONTRIBUTORS_PATH))
        .and(query_param("per_page", "100"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(contributors(30))
                .insert_header("link", link(&server, &[("prev", 1), ("first", 1)]).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let count = counter(&server, ContributorCountStrategy::LinkHeader, 100).count(&hono()).await.unwrap();
    assert_eq!(count, 130);
}

#[tokio::test]
async fn test_enumerate_until_empty_page() {
    let server = MockServer::start().await;

    for (page, size) in [("1", 100), ("2", 100), ("3", 7), ("4", 0)] {
        Mock::given(method("GET"))
            .and(path(CONTRIBUTORS_PATH))
            .and(query_param("per_page", "100"))
            .and(query_param("page", page))
            .respond_with(ResponseTemplate::new(200).set_body_json(contributors(size)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let count = counter(&server, ContributorCountStrategy::Enumerate, 100).count(&hono()).await.unwrap();
    assert_eq!(count, 207);
}

#[tokio::test]
async fn test_enumerate_stops_at_page_ceiling() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CONTRIBUTORS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(contributors(100)))
        .expect(3)
        .mount(&server)
        .await;

    let count = counter(&server, ContributorCountStrategy::Enumerate, 3).count(&hono()).await.unwrap();
    assert_eq!(count, 300);
}

#[tokio::test]
async fn test_empty_repository_returns_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CONTRIBUTORS_PATH))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    for strategy in [ContributorCountStrategy::LinkHeader, ContributorCountStrategy::Enumerate] {
        let count = counter(&server, strategy, 100).count(&hono()).await.unwrap();
        assert_eq!(count, 0, "strategy {strategy:?}");
    }
}

#[tokio::test]
async fn test_rate_limited() {
    for status in [403, 429] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(CONTRIBUTORS_PATH))
            .respond_with(
                ResponseTemplate::new(status)
                    .insert_header("x-ratelimit-remaining", "0")
                    .insert_header("x-ratelimit-reset", "1704067200")
                    .set_body_json(json!({ "message": "API rate limit exceeded" })),
            )
            .mount(&server)
            .await;

        let err = counter(&server, ContributorCountStrategy::LinkHeader, 100)
            .count(&hono())
            .await
            .unwrap_err();

        match err {
            FetchError::RateLimited { upstream, status: s } => {
                assert_eq!(upstream, "GitHub");
                assert_eq!(s, status);
            }
            other => panic!("Expected RateLimited for HTTP {status}, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_missing_repository() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CONTRIBUTORS_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
        .mount(&server)
        .await;

    let err = counter(&server, ContributorCountStrategy::LinkHeader, 100).count(&hono()).await.unwrap_err();
    assert!(matches!(err, FetchError::NotFound(_)));
}

#[tokio::test]
async fn test_server_error_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CONTRIBUTORS_PATH))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = counter(&server, ContributorCountStrategy::Enumerate, 100).count(&hono()).await.unwrap_err();
    assert!(matches!(err, FetchError::Unavailable(_)));
}

#[tokio::test]
async fn test_failure_on_later_page_fails_the_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CONTRIBUTORS_PATH))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(contributors(100)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(CONTRIBUTORS_PATH))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = counter(&server, ContributorCountStrategy::Enumerate, 100).count(&hono()).await.unwrap_err();
    assert!(matches!(err, FetchError::Unavailable(_)));
}

#[tokio::test]
async fn test_non_array_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CONTRIBUTORS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "unexpected": true })))
        .mount(&server)
        .await;

    let err = counter(&server, ContributorCountStrategy::Enumerate, 100).count(&hono()).await.unwrap_err();
    assert!(matches!(err, FetchError::Malformed(_)));
}

#[tokio::test]
async fn test_timeout_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CONTRIBUTORS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(contributors(1)).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let client = Client::new(None, &server.uri(), "npm-health-tests", Duration::from_millis(100)).unwrap();
    let err = ContributorCounter::new(client, ContributorCountStrategy::LinkHeader, 100)
        .count(&hono())
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Unavailable(_)));
}
