mod support;

#[tokio::test]
async fn health_reports_status_and_user_count() {
    let base_url = support::ensure_server();
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{base_url}/health"))
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("json body");
    assert_eq!(body["status"], "ok");
    assert!(body["users"].as_u64().is_some());
    // The timestamp is RFC 3339 / ISO 8601.
    let timestamp = body["timestamp"].as_str().expect("timestamp string");
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test]
async fn user_count_tracks_connections() {
    let base_url = support::ensure_server();
    let client = reqwest::Client::new();

    let mut ws = support::ws_connect(base_url, "").await;
    support::next_event(&mut ws, "player:info").await;

    // Our socket is still open, so the count includes at least it; other
    // tests connect and disconnect concurrently.
    let body: serde_json::Value = client
        .get(format!("{base_url}/health"))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    let users = body["users"].as_u64().expect("users count");
    assert!(users >= 1);
}
