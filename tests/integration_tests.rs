//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: config → HTTP requests → records + state.

use chrono::{NaiveDate, TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use source_wise::http::{BackoffType, HttpClient, HttpClientConfig, RequestConfig};
use source_wise::{ConnectorConfig, Message, StateManager, WiseSource};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn source_for(mock_server: &MockServer, start_date: &str) -> WiseSource {
    let config = ConnectorConfig::from_value(&json!({
        "api_token": "test-token",
        "start_date": start_date,
        "base_url": mock_server.uri()
    }))
    .unwrap();
    WiseSource::new(config)
}

async fn mount_profiles(mock_server: &MockServer, profiles: Value) {
    Mock::given(method("GET"))
        .and(path("/profiles"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profiles))
        .mount(mock_server)
        .await;
}

// ============================================================================
// HTTP Client Integration Tests
// ============================================================================

#[tokio::test]
async fn test_http_client_applies_bearer_auth() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/profiles"))
        .and(header("Authorization", "Bearer secret-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(mock_server.uri())
        .no_rate_limit()
        .build();
    let client = HttpClient::with_auth(
        config,
        source_wise::auth::TokenAuthenticator::new("secret-123"),
    );

    let body: Value = client.get_json("profiles", RequestConfig::new()).await.unwrap();
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_http_client_retry_on_500() {
    let mock_server = MockServer::start().await;

    // First request fails, second succeeds
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .max_retries(3)
        .backoff(
            BackoffType::Constant,
            Duration::from_millis(10),
            Duration::from_millis(100),
        )
        .no_rate_limit()
        .build();
    let client = HttpClient::with_config(config);

    let body: Value = client
        .get_json(
            &format!("{}/flaky", mock_server.uri()),
            RequestConfig::new(),
        )
        .await
        .unwrap();
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn test_http_client_surfaces_client_error_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/profiles"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder().no_rate_limit().build();
    let client = HttpClient::with_config(config);

    let err = client
        .get(&format!("{}/profiles", mock_server.uri()))
        .await
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("401"));
    assert!(message.contains("invalid token"));
}

// ============================================================================
// End-to-End Sync Tests
// ============================================================================

#[tokio::test]
async fn test_full_sync_emits_balance_records_and_watermark() {
    let mock_server = MockServer::start().await;

    mount_profiles(
        &mock_server,
        json!([
            {"id": 10, "type": "personal"},
            {"id": 20, "type": "business"}
        ]),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/borderless-accounts"))
        .and(query_param("profileId", "10"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"balance": 100}])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/borderless-accounts"))
        .and(query_param("profileId", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let source = source_for(&mock_server, "2023-01-01");
    let state = StateManager::in_memory();
    // One elapsed day: the single window 2023-01-01
    let reference_now = Utc.with_ymd_and_hms(2023, 1, 2, 8, 0, 0).unwrap();

    let (messages, stats) = source.sync(state.clone(), reference_now).await.unwrap();

    // Profile records pass through verbatim
    let profile_records: Vec<&Value> = messages
        .iter()
        .filter_map(|m| match m {
            Message::Record { stream, data, .. } if stream == "profiles" => Some(data),
            _ => None,
        })
        .collect();
    assert_eq!(
        profile_records,
        vec![
            &json!({"id": 10, "type": "personal"}),
            &json!({"id": 20, "type": "business"})
        ]
    );

    // Personal balance record emitted verbatim for the one window
    let balance_records: Vec<&Value> = messages
        .iter()
        .filter_map(|m| match m {
            Message::Record { stream, data, .. } if stream == "personal_balances" => Some(data),
            _ => None,
        })
        .collect();
    assert_eq!(balance_records, vec![&json!({"balance": 100})]);

    // Watermarks advanced to the synced day
    assert_eq!(
        state.get_watermark("profiles").await,
        Some(date(2023, 1, 1))
    );
    assert_eq!(
        state.get_watermark("personal_balances").await,
        Some(date(2023, 1, 1))
    );

    // profiles + personal + business, one window each
    assert_eq!(stats.streams_synced, 3);
    assert_eq!(stats.windows_synced, 3);
}

#[tokio::test]
async fn test_business_balances_fail_fast_without_resolution() {
    let mock_server = MockServer::start().await;

    // Only a personal profile exists upstream
    mount_profiles(&mock_server, json!([{"id": 10, "type": "personal"}])).await;

    Mock::given(method("GET"))
        .and(path("/borderless-accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let source = source_for(&mock_server, "2023-01-01");
    let reference_now = Utc.with_ymd_and_hms(2023, 1, 2, 8, 0, 0).unwrap();

    let err = source
        .sync(StateManager::in_memory(), reference_now)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("business"));
}

#[tokio::test]
async fn test_sync_resumes_from_persisted_watermark() {
    let mock_server = MockServer::start().await;

    mount_profiles(
        &mock_server,
        json!([
            {"id": 10, "type": "personal"},
            {"id": 20, "type": "business"}
        ]),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/borderless-accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"balance": 5}])))
        .mount(&mock_server)
        .await;

    let source = source_for(&mock_server, "2023-01-01");
    // All three streams already synced through 2023-01-02
    let state = StateManager::from_json(
        r#"{"streams":{
            "profiles":{"date":"2023-01-02"},
            "personal_balances":{"date":"2023-01-02"},
            "business_balances":{"date":"2023-01-02"}
        }}"#,
    )
    .unwrap();
    let reference_now = Utc.with_ymd_and_hms(2023, 1, 4, 0, 0, 0).unwrap();

    let (messages, stats) = source.sync(state.clone(), reference_now).await.unwrap();

    // Two remaining windows per stream (01-02 and 01-03)
    assert_eq!(stats.windows_synced, 6);
    assert_eq!(
        state.get_watermark("business_balances").await,
        Some(date(2023, 1, 3))
    );

    // Every stream re-emits only from the watermark forward:
    // per window, 2 profiles + 1 balance per balance stream
    let record_count = messages.iter().filter(|m| m.is_record()).count();
    assert_eq!(record_count, 8);
}

#[tokio::test]
async fn test_sync_with_no_elapsed_days_makes_no_requests() {
    let mock_server = MockServer::start().await;
    // No mocks mounted: any request would 404 and fail the sync

    let source = source_for(&mock_server, "2023-06-15");
    let reference_now = Utc.with_ymd_and_hms(2023, 6, 15, 9, 0, 0).unwrap();

    let (messages, stats) = source
        .sync(StateManager::in_memory(), reference_now)
        .await
        .unwrap();

    assert_eq!(stats.requests_made, 0);
    assert!(messages.iter().all(|m| m.is_log()));
}

#[tokio::test]
async fn test_state_file_roundtrip_through_sync() {
    let mock_server = MockServer::start().await;

    mount_profiles(&mock_server, json!([{"id": 10, "type": "personal"}])).await;

    Mock::given(method("GET"))
        .and(path("/borderless-accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");

    let source = source_for(&mock_server, "2023-01-01");
    let reference_now = Utc.with_ymd_and_hms(2023, 1, 2, 8, 0, 0).unwrap();

    // business_balances has no profile; sync only the streams that can run
    let state = StateManager::new(&state_path);
    let mut engine = source_wise::SyncEngine::new(source.http_client(), state);
    for stream in source.streams() {
        if stream.name() == "business_balances" {
            continue;
        }
        engine.sync_stream(stream.as_ref(), reference_now).await.unwrap();
    }

    // A fresh manager sees the persisted watermarks
    let reloaded = StateManager::from_file(&state_path).unwrap();
    assert_eq!(
        reloaded.get_watermark("profiles").await,
        Some(date(2023, 1, 1))
    );
    assert_eq!(
        reloaded.get_watermark("personal_balances").await,
        Some(date(2023, 1, 1))
    );
}
