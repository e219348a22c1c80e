//! Shared fixtures for the integration tests

use serde_json::{json, Value};
use summoner_harvest::api::Summoner;
use summoner_harvest::config::Config;
use summoner_harvest::crawler::{ApiClient, Coordinator};
use summoner_harvest::storage::SqliteStorage;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_KEY: &str = "test-key";

/// Creates a configuration pointed at the mock server
///
/// Rate limits are loose and retries immediate so tests never sleep.
pub fn test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.api.base_url = base_url.to_string();
    config.api.token = TEST_KEY.to_string();
    config.api.timeout_secs = 5;

    config.rate_limit.short_limit = 1_000;
    config.rate_limit.short_window_secs = 1;
    config.rate_limit.short_margin_ms = 0;
    config.rate_limit.long_limit = 10_000;
    config.rate_limit.long_window_secs = 1;
    config.rate_limit.long_margin_ms = 0;

    config.fetch.max_retries = 3;
    config.fetch.retry_delay_ms = 0;
    config.crawl.selection_retry_ms = 0;
    config
}

pub fn test_client(config: &Config) -> ApiClient {
    ApiClient::new(config).expect("Failed to build API client")
}

pub fn test_coordinator(config: &Config) -> Coordinator<SqliteStorage> {
    let storage = SqliteStorage::new_in_memory().expect("Failed to open in-memory DB");
    Coordinator::new(test_client(config), storage, config.crawl.clone())
}

pub fn summoner(id: i64, name: &str) -> Summoner {
    Summoner {
        id,
        name: name.to_string(),
        profile_icon_id: 1,
        revision_date: 1_400_000_000_000,
        summoner_level: 30,
    }
}

pub fn summoner_json(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "profileIconId": 1,
        "revisionDate": 1_400_000_000_000i64,
        "summonerLevel": 30
    })
}

pub fn history_json(match_ids: &[i64]) -> Value {
    let matches: Vec<Value> = match_ids
        .iter()
        .map(|id| json!({ "matchId": id, "queueType": "RANKED_SOLO_5x5" }))
        .collect();
    json!({ "matches": matches })
}

pub fn detail_json(match_id: i64, participants: &[i64]) -> Value {
    let identities: Vec<Value> = participants
        .iter()
        .enumerate()
        .map(|(i, id)| {
            json!({
                "participantId": i + 1,
                "player": { "summonerId": id, "summonerName": format!("player{}", id) }
            })
        })
        .collect();
    json!({
        "matchId": match_id,
        "matchMode": "CLASSIC",
        "matchType": "MATCHED_GAME",
        "queueType": "RANKED_SOLO_5x5",
        "season": "SEASON2015",
        "matchCreation": 1_430_000_000_000i64,
        "matchDuration": 1800,
        "participantIdentities": identities,
        "teams": [{ "teamId": 100, "winner": true }]
    })
}

pub fn history_path(summoner_id: i64) -> String {
    format!("/api/lol/na/v2.2/matchhistory/{}", summoner_id)
}

pub fn detail_path(match_id: i64) -> String {
    format!("/api/lol/na/v2.2/match/{}", match_id)
}

/// Mounts one history page, expected to be fetched exactly `times` times
pub async fn mount_history(
    server: &MockServer,
    summoner_id: i64,
    begin_index: u32,
    match_ids: &[i64],
    times: u64,
) {
    Mock::given(method("GET"))
        .and(path(history_path(summoner_id)))
        .and(query_param("beginIndex", begin_index.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(history_json(match_ids)))
        .expect(times)
        .mount(server)
        .await;
}

/// Mounts a match detail, expected to be fetched exactly once
pub async fn mount_detail(server: &MockServer, match_id: i64, participants: &[i64]) {
    Mock::given(method("GET"))
        .and(path(detail_path(match_id)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(detail_json(match_id, participants)),
        )
        .expect(1)
        .mount(server)
        .await;
}

/// Mounts a by-id lookup for exactly `ids`, expected to be called exactly once
pub async fn mount_lookup(server: &MockServer, ids: &[i64]) {
    let joined = ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let mut body = serde_json::Map::new();
    for id in ids {
        body.insert(id.to_string(), summoner_json(*id, &format!("player{}", id)));
    }

    Mock::given(method("GET"))
        .and(path(format!("/api/lol/na/v1.4/summoner/{}", joined)))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Object(body)))
        .expect(1)
        .mount(server)
        .await;
}
