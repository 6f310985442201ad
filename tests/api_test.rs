mod common;

use std::time::Duration;

use common::{MockConfig, MockSpotify, TOKEN, played_item, saved_item};
use reqwest::{StatusCode, header::LOCATION, redirect::Policy};
use serde_json::{Value, json};
use sportify::{
    config::Settings,
    server::{self, AppState, MAX_PENDING_LOGINS},
};

fn settings(api_url: &str) -> Settings {
    Settings {
        server_address: "127.0.0.1:0".to_string(),
        frontend_url: "http://localhost:8080".to_string(),
        client_id: "client-123".to_string(),
        client_secret: None,
        redirect_uri: "http://localhost:5000/callback".to_string(),
        scope: "user-library-read user-read-recently-played".to_string(),
        auth_url: "https://accounts.example/authorize".to_string(),
        token_url: format!("{}/api/token", api_url),
        api_url: api_url.to_string(),
        request_timeout: Duration::from_secs(5),
        session_track_cap: 200,
    }
}

async fn start_backend(mock: &MockSpotify) -> String {
    let state = AppState::new(settings(&mock.base_url)).unwrap();
    serve(state).await
}

async fn serve(state: AppState) -> String {
    let app = server::router(state).unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn http() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(Policy::none())
        .build()
        .unwrap()
}

fn running_library() -> MockConfig {
    MockConfig {
        saved: vec![
            saved_item("t1", 300_000),
            saved_item("t2", 300_000),
            saved_item("t3", 300_000),
        ],
        tempos: [("t1", 130.0), ("t2", 136.0), ("t3", 90.0)]
            .into_iter()
            .map(|(id, tempo)| (id.to_string(), tempo))
            .collect(),
        recent: vec![played_item("t1", 300_000), played_item("t3", 300_000)],
        ..Default::default()
    }
}

#[tokio::test]
async fn test_health_reports_version() {
    let mock = MockSpotify::start(MockConfig::default()).await;
    let backend = start_backend(&mock).await;

    let body: Value = http()
        .get(format!("{}/health", backend))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_session_playlist_requires_token() {
    let mock = MockSpotify::start(running_library()).await;
    let backend = start_backend(&mock).await;

    let response = http()
        .get(format!(
            "{}/runningsession/playlist?pace=5&distance=5&height=180",
            backend
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(mock.calls(|c| &c.saved), 0);
}

#[tokio::test]
async fn test_session_playlist_returns_proposal() {
    let mock = MockSpotify::start(running_library()).await;
    let backend = start_backend(&mock).await;

    let response = http()
        .get(format!(
            "{}/runningsession/playlist?pace=5&distance=5&height=180",
            backend
        ))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "Running Session - 5km - 5min/km - 134 BPM");
    assert_eq!(body["targetBpm"], 134);
    assert_eq!(body["neededDurationSeconds"], 2100);

    let tracks = body["tracks"].as_array().unwrap();
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0]["id"], "t1");
    assert_eq!(tracks[1]["id"], "t2");
    assert_eq!(tracks[0]["durationSeconds"], 300);
    assert_eq!(tracks[0]["artworkUrl"], "https://img.example/t1.jpg");
}

#[tokio::test]
async fn test_session_playlist_accepts_cookie_token() {
    let mock = MockSpotify::start(running_library()).await;
    let backend = start_backend(&mock).await;

    let response = http()
        .get(format!(
            "{}/runningsession/playlist?pace=5&distance=5&height=180",
            backend
        ))
        .header("Cookie", format!("theme=dark; access_token={}", TOKEN))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_session_playlist_error_statuses() {
    let mock = MockSpotify::start(running_library()).await;
    let backend = start_backend(&mock).await;
    let client = http();

    let invalid = client
        .get(format!(
            "{}/runningsession/playlist?pace=0&distance=5&height=180",
            backend
        ))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    let body: Value = invalid.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("pace"));

    // pace 9 min/km at 180 cm targets 74 BPM, nothing in the library is that slow
    let no_match = client
        .get(format!(
            "{}/runningsession/playlist?pace=9&distance=5&height=180",
            backend
        ))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(no_match.status(), StatusCode::NOT_FOUND);

    let rejected = client
        .get(format!(
            "{}/runningsession/playlist?pace=5&distance=5&height=180",
            backend
        ))
        .bearer_auth("expired")
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_playlist_malformed_query_is_json_error() {
    let mock = MockSpotify::start(running_library()).await;
    let backend = start_backend(&mock).await;
    let client = http();

    for query in [
        "pace=6&distance=5&height=-180",
        "pace=6&distance=5&height=180.5",
        "pace=6&distance=5",
    ] {
        let response = client
            .get(format!("{}/runningsession/playlist?{}", backend, query))
            .bearer_auth(TOKEN)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", query);
        let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
        assert!(content_type.starts_with("application/json"), "{}", query);
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("height"), "{}", query);
    }

    assert_eq!(mock.calls(|c| &c.saved), 0);
}

#[tokio::test]
async fn test_recently_played_by_bpm_returns_empty_list() {
    let mock = MockSpotify::start(running_library()).await;
    let backend = start_backend(&mock).await;

    let response = http()
        .get(format!(
            "{}/spotify/recently-played/bpm?bpmTarget=200",
            backend
        ))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!([]));
    assert_eq!(mock.calls(|c| &c.per_id), 2);
}

#[tokio::test]
async fn test_user_info() {
    let mock = MockSpotify::start(MockConfig::default()).await;
    let backend = start_backend(&mock).await;

    let body: Value = http()
        .get(format!("{}/spotify/userinfo", backend))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["displayName"], "Road Runner");
    assert_eq!(body["email"], "runner@example.com");
}

#[tokio::test]
async fn test_create_playlist_validates_and_adds_tracks_in_chunks() {
    let mock = MockSpotify::start(MockConfig::default()).await;
    let backend = start_backend(&mock).await;
    let client = http();

    let missing_name = client
        .post(format!("{}/spotify/playlist", backend))
        .bearer_auth(TOKEN)
        .json(&json!({ "name": "", "songIds": ["a"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing_name.status(), StatusCode::BAD_REQUEST);

    let missing_songs = client
        .post(format!("{}/spotify/playlist", backend))
        .bearer_auth(TOKEN)
        .json(&json!({ "name": "Sunday long run", "songIds": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing_songs.status(), StatusCode::BAD_REQUEST);

    let song_ids: Vec<String> = (0..130).map(|i| format!("song{}", i)).collect();
    let created = client
        .post(format!("{}/spotify/playlist", backend))
        .bearer_auth(TOKEN)
        .json(&json!({
            "name": "Sunday long run",
            "visible": false,
            "colaborative": false,
            "songIds": song_ids
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let body: Value = created.json().await.unwrap();
    assert_eq!(body["id"], "playlist-1");

    assert_eq!(mock.calls(|c| &c.playlist_adds), 2);
    let uris = mock.state.added_uris.lock().unwrap().clone();
    assert_eq!(uris.len(), 130);
    assert_eq!(uris[0], "spotify:track:song0");
    assert_eq!(uris[129], "spotify:track:song129");
}

#[tokio::test]
async fn test_login_redirects_to_spotify_with_pkce() {
    let mock = MockSpotify::start(MockConfig::default()).await;
    let backend = start_backend(&mock).await;

    let response = http()
        .get(format!("{}/auth/login", backend))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    let location = response.headers()[LOCATION].to_str().unwrap().to_string();
    let url = reqwest::Url::parse(&location).unwrap();
    assert_eq!(url.host_str(), Some("accounts.example"));

    let params: std::collections::HashMap<String, String> = url.query_pairs().into_owned().collect();
    assert_eq!(params["client_id"], "client-123");
    assert_eq!(params["response_type"], "code");
    assert_eq!(params["code_challenge_method"], "S256");
    assert_eq!(params["redirect_uri"], "http://localhost:5000/callback");
    assert!(!params["code_challenge"].is_empty());
    assert!(!params["state"].is_empty());
}

#[tokio::test]
async fn test_abandoned_logins_stay_bounded() {
    let mock = MockSpotify::start(MockConfig::default()).await;
    let state = AppState::new(settings(&mock.base_url)).unwrap();
    let backend = serve(state.clone()).await;
    let client = http();

    for _ in 0..MAX_PENDING_LOGINS + 100 {
        let response = client
            .get(format!("{}/auth/login", backend))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_redirection());
    }

    assert_eq!(state.pending_logins.lock().await.len(), MAX_PENDING_LOGINS);
}

#[tokio::test]
async fn test_callback_rejects_unknown_state() {
    let mock = MockSpotify::start(MockConfig::default()).await;
    let backend = start_backend(&mock).await;

    let response = http()
        .get(format!("{}/callback?code=abc&state=never-issued", backend))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let mock = MockSpotify::start(MockConfig::default()).await;
    let backend = start_backend(&mock).await;

    let response = http()
        .get(format!("{}/auth/logout", backend))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    let cookie = response.headers()["set-cookie"].to_str().unwrap();
    assert!(cookie.starts_with("access_token=;"));
    assert!(cookie.contains("Max-Age=0"));
}
