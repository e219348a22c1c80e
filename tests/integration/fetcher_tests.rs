//! Fetcher behavior against a mock API: retries, fatal errors, key handling

use crate::common::*;
use summoner_harvest::crawler::FetchError;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_rate_limited_then_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(history_path(7)))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    mount_history(&server, 7, 0, &[101, 102], 1).await;

    let mut client = test_client(&test_config(&server.uri()));
    let ids = client.match_history(7, 0).await.expect("Fetch should succeed");

    assert_eq!(ids, vec![101, 102]);
}

#[tokio::test]
async fn test_malformed_body_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(detail_path(101)))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"matchId\": 10"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_detail(&server, 101, &[7, 9]).await;

    let mut client = test_client(&test_config(&server.uri()));
    let detail = client.match_detail(101).await.expect("Fetch should succeed");

    assert_eq!(detail.match_id, 101);
    assert_eq!(detail.participant_summoner_ids(), vec![7, 9]);
}

#[tokio::test]
async fn test_retries_exhausted_after_max_attempts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(history_path(7)))
        .respond_with(ResponseTemplate::new(429))
        .expect(4)
        .mount(&server)
        .await;

    let mut config = test_config(&server.uri());
    config.fetch.max_retries = 4;
    let mut client = test_client(&config);

    let result = client.match_history(7, 0).await;

    match result {
        Err(FetchError::RetriesExhausted { attempts, last }) => {
            assert_eq!(attempts, 4);
            assert!(matches!(*last, FetchError::RateLimited { .. }));
        }
        other => panic!("Expected RetriesExhausted, got {:?}", other),
    }
}

#[tokio::test]
async fn test_not_found_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(detail_path(404)))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = test_client(&test_config(&server.uri()));
    let error = client.match_detail(404).await.unwrap_err();

    assert!(matches!(error, FetchError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_server_error_fatal_by_default() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(history_path(7)))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = test_client(&test_config(&server.uri()));
    let error = client.match_history(7, 0).await.unwrap_err();

    assert!(matches!(error, FetchError::Status { status: 503, .. }));
}

#[tokio::test]
async fn test_server_error_retried_when_enabled() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(history_path(7)))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_history(&server, 7, 0, &[101], 1).await;

    let mut config = test_config(&server.uri());
    config.fetch.retry_server_errors = true;
    let mut client = test_client(&config);

    let ids = client.match_history(7, 0).await.expect("Fetch should succeed");
    assert_eq!(ids, vec![101]);
}

#[tokio::test]
async fn test_api_key_sent_but_never_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(history_path(7)))
        .and(query_param("api_key", TEST_KEY))
        .and(query_param("beginIndex", "15"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = test_client(&test_config(&server.uri()));
    let error = client.match_history(7, 15).await.unwrap_err();

    assert!(matches!(error, FetchError::Status { status: 403, .. }));
    let message = error.to_string();
    assert!(message.contains("beginIndex=15"));
    assert!(!message.contains(TEST_KEY));
}

#[tokio::test]
async fn test_summoner_lookup_by_name() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/lol/na/v1.4/summoner/by-name/Ana,Bo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "bo": summoner_json(12, "Bo"),
            "ana": summoner_json(7, "Ana"),
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = test_client(&test_config(&server.uri()));
    let found = client
        .summoners_by_name(&["Ana".to_string(), "Bo".to_string()])
        .await
        .expect("Lookup should succeed");

    assert_eq!(found, vec![summoner(7, "Ana"), summoner(12, "Bo")]);
}

#[tokio::test]
async fn test_lookup_over_limit_makes_no_request() {
    let server = MockServer::start().await;

    let mut client = test_client(&test_config(&server.uri()));
    let ids: Vec<i64> = (1..=41).collect();

    let error = client.summoners_by_id(&ids).await.unwrap_err();
    assert!(matches!(error, FetchError::TooManyIds { count: 41, max: 40 }));

    let empty = client.summoners_by_id(&[]).await.expect("Empty lookup");
    assert!(empty.is_empty());

    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_zero_attempts_reports_no_attempts() {
    let server = MockServer::start().await;

    let mut config = test_config(&server.uri());
    config.fetch.max_retries = 0;
    let mut client = test_client(&config);

    let error = client.match_detail(101).await.unwrap_err();
    assert!(matches!(error, FetchError::NoAttempts { .. }));
}

#[tokio::test]
async fn test_connection_refused_is_retried() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let mut config = test_config(&format!("http://127.0.0.1:{}", port));
    config.fetch.max_retries = 2;
    let mut client = test_client(&config);

    let result = client.match_history(7, 0).await;

    match result {
        Err(FetchError::RetriesExhausted { attempts, last }) => {
            assert_eq!(attempts, 2);
            assert!(matches!(*last, FetchError::Network { .. }));
            assert!(!last.to_string().contains(TEST_KEY));
        }
        other => panic!("Expected RetriesExhausted, got {:?}", other),
    }
}
