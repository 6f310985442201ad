#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    routing::{get, post},
};
use reqwest::Client;
use serde_json::{Value, json};
use sportify::spotify::SpotifyClient;

pub const TOKEN: &str = "test-token";

/// Canned data served by the fake Spotify API.
#[derive(Default, Clone)]
pub struct MockConfig {
    pub recent: Vec<Value>,
    pub saved: Vec<Value>,
    pub tempos: HashMap<String, f64>,
    pub fail_saved_at_offset: Option<u32>,
    pub fail_recent: bool,
    /// Ids whose tempo call (or batch) answers with a 500.
    pub failing_tempo_ids: HashSet<String>,
    /// Delay before a batched tempo call answers.
    pub tempo_delay: Option<Duration>,
}

#[derive(Default)]
pub struct Calls {
    pub recent: AtomicUsize,
    pub saved: AtomicUsize,
    pub per_id: AtomicUsize,
    pub batches: AtomicUsize,
    pub finished_batches: AtomicUsize,
    pub playlist_adds: AtomicUsize,
}

pub struct MockState {
    pub config: MockConfig,
    pub calls: Calls,
    pub requested_limits: Mutex<Vec<u32>>,
    pub requested_offsets: Mutex<Vec<u32>>,
    pub batch_sizes: Mutex<Vec<usize>>,
    pub added_uris: Mutex<Vec<String>>,
}

pub struct MockSpotify {
    pub base_url: String,
    pub state: Arc<MockState>,
}

impl MockSpotify {
    pub async fn start(config: MockConfig) -> Self {
        let state = Arc::new(MockState {
            config,
            calls: Calls::default(),
            requested_limits: Mutex::new(Vec::new()),
            requested_offsets: Mutex::new(Vec::new()),
            batch_sizes: Mutex::new(Vec::new()),
            added_uris: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/me", get(me))
            .route("/me/player/recently-played", get(recently_played))
            .route("/me/tracks", get(saved_tracks))
            .route("/audio-features", get(several_audio_features))
            .route("/audio-features/{id}", get(audio_features))
            .route("/users/{user_id}/playlists", post(create_playlist))
            .route("/playlists/{playlist_id}/tracks", post(add_tracks))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn client(&self) -> SpotifyClient {
        SpotifyClient::new(Client::new(), &self.base_url, TOKEN)
    }

    pub fn calls(&self, counter: impl Fn(&Calls) -> &AtomicUsize) -> usize {
        counter(&self.state.calls).load(Ordering::SeqCst)
    }
}

pub fn track_json(id: &str, duration_ms: u64) -> Value {
    json!({
        "id": id,
        "name": format!("Song {}", id),
        "artists": [{ "name": "The Striders" }, { "name": "Feature" }],
        "album": {
            "name": "Long Run",
            "images": [{ "url": format!("https://img.example/{}.jpg", id) }]
        },
        "duration_ms": duration_ms
    })
}

pub fn played_item(id: &str, duration_ms: u64) -> Value {
    json!({ "track": track_json(id, duration_ms), "played_at": "2024-05-01T08:30:00.000Z" })
}

pub fn saved_item(id: &str, duration_ms: u64) -> Value {
    json!({ "track": track_json(id, duration_ms), "added_at": "2023-11-20T19:04:11Z" })
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", TOKEN))
}

async fn me(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(Json(json!({
        "id": "runner",
        "display_name": "Road Runner",
        "email": "runner@example.com"
    })))
}

async fn recently_played(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    state.calls.recent.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    if state.config.fail_recent {
        return Err(StatusCode::TOO_MANY_REQUESTS);
    }

    let limit: u32 = params.get("limit").and_then(|l| l.parse().ok()).unwrap_or(20);
    state.requested_limits.lock().unwrap().push(limit);

    let items: Vec<Value> = state
        .config
        .recent
        .iter()
        .take(limit as usize)
        .cloned()
        .collect();
    Ok(Json(json!({ "items": items })))
}

async fn saved_tracks(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    state.calls.saved.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let limit: u32 = params.get("limit").and_then(|l| l.parse().ok()).unwrap_or(20);
    let offset: u32 = params.get("offset").and_then(|o| o.parse().ok()).unwrap_or(0);
    state.requested_limits.lock().unwrap().push(limit);
    state.requested_offsets.lock().unwrap().push(offset);

    if state.config.fail_saved_at_offset == Some(offset) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let items: Vec<Value> = state
        .config
        .saved
        .iter()
        .skip(offset as usize)
        .take(limit as usize)
        .cloned()
        .collect();
    Ok(Json(json!({
        "items": items,
        "next": null,
        "total": state.config.saved.len()
    })))
}

async fn audio_features(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    state.calls.per_id.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    if state.config.failing_tempo_ids.contains(&id) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    match state.config.tempos.get(&id) {
        Some(tempo) => Ok(Json(json!({ "id": id, "tempo": tempo }))),
        None => Err(StatusCode::NOT_FOUND),
    }
}

async fn several_audio_features(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    state.calls.batches.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let ids: Vec<String> = params
        .get("ids")
        .map(|ids| ids.split(',').map(str::to_string).collect())
        .unwrap_or_default();
    state.batch_sizes.lock().unwrap().push(ids.len());

    if let Some(delay) = state.config.tempo_delay {
        tokio::time::sleep(delay).await;
    }
    state.calls.finished_batches.fetch_add(1, Ordering::SeqCst);

    if ids.len() > 100 {
        return Err(StatusCode::BAD_REQUEST);
    }
    if ids.iter().any(|id| state.config.failing_tempo_ids.contains(id)) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let features: Vec<Value> = ids
        .iter()
        .map(|id| match state.config.tempos.get(id) {
            Some(tempo) => json!({ "id": id, "tempo": tempo }),
            None => Value::Null,
        })
        .collect();
    Ok(Json(json!({ "audio_features": features })))
}

async fn create_playlist(
    headers: HeaderMap,
    Path(user_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    if !authorized(&headers) || user_id != "runner" {
        return Err(StatusCode::FORBIDDEN);
    }
    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": "playlist-1", "name": body["name"] })),
    ))
}

async fn add_tracks(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(playlist_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    state.calls.playlist_adds.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) || playlist_id != "playlist-1" {
        return Err(StatusCode::FORBIDDEN);
    }

    let uris = body["uris"].as_array().cloned().unwrap_or_default();
    if uris.len() > 100 {
        return Err(StatusCode::BAD_REQUEST);
    }
    state
        .added_uris
        .lock()
        .unwrap()
        .extend(uris.iter().filter_map(|u| u.as_str().map(str::to_string)));

    Ok((StatusCode::CREATED, Json(json!({ "snapshot_id": "snap" }))))
}
