use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    Result,
    api::extract::AccessToken,
    error::Error,
    info,
    server::AppState,
    session,
    spotify::{
        self,
        tempo::TempoLookup,
        tracks::TrackSource,
    },
    types::{NewPlaylist, Track, UserInfo},
};

pub const DEFAULT_RECENT_LIMIT: u32 = 10;
pub const DEFAULT_BPM_TARGET: u32 = 90;
pub const DEFAULT_BPM_THRESHOLD: u32 = 5;
/// How many recent plays are checked when filtering by tempo.
pub const RECENT_BPM_LIMIT: u32 = 20;
pub const DEFAULT_SAVED_TRACK_CAP: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct RecentlyPlayedParams {
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BpmParams {
    pub bpm_target: Option<u32>,
    pub threshold: Option<u32>,
    pub cap: Option<u32>,
}

pub async fn user_info(
    State(state): State<AppState>,
    AccessToken(token): AccessToken,
) -> Result<Json<UserInfo>> {
    let client = state.spotify(&token);
    Ok(Json(spotify::user::get_user_info(&client).await?))
}

pub async fn recently_played(
    State(state): State<AppState>,
    AccessToken(token): AccessToken,
    Query(params): Query<RecentlyPlayedParams>,
) -> Result<Json<Vec<Track>>> {
    let client = state.spotify(&token);
    let source = TrackSource::recently_played(params.limit.unwrap_or(DEFAULT_RECENT_LIMIT));
    Ok(Json(source.fetch(&client).await?))
}

/// Recently played tracks near `bpmTarget`, resolving tempo one track at a
/// time. An empty list is a valid answer.
pub async fn recently_played_by_bpm(
    State(state): State<AppState>,
    AccessToken(token): AccessToken,
    Query(params): Query<BpmParams>,
) -> Result<Json<Vec<Track>>> {
    let client = state.spotify(&token);
    let tracks = session::tracks_by_bpm(
        &client,
        TrackSource::recently_played(RECENT_BPM_LIMIT),
        TempoLookup::PerId,
        params.bpm_target.unwrap_or(DEFAULT_BPM_TARGET),
        params.threshold.unwrap_or(DEFAULT_BPM_THRESHOLD),
    )
    .await?;
    Ok(Json(tracks))
}

/// Saved tracks near `bpmTarget`, resolving tempo in batches.
pub async fn saved_tracks_by_bpm(
    State(state): State<AppState>,
    AccessToken(token): AccessToken,
    Query(params): Query<BpmParams>,
) -> Result<Json<Vec<Track>>> {
    let client = state.spotify(&token);
    let tracks = session::tracks_by_bpm(
        &client,
        TrackSource::saved_tracks(
            spotify::tracks::MAX_PAGE_SIZE,
            params.cap.unwrap_or(DEFAULT_SAVED_TRACK_CAP),
        ),
        TempoLookup::Batched,
        params.bpm_target.unwrap_or(DEFAULT_BPM_TARGET),
        params.threshold.unwrap_or(DEFAULT_BPM_THRESHOLD),
    )
    .await?;
    Ok(Json(tracks))
}

pub async fn create_playlist(
    State(state): State<AppState>,
    AccessToken(token): AccessToken,
    Json(new_playlist): Json<NewPlaylist>,
) -> Result<(StatusCode, Json<Value>)> {
    validate_new_playlist(&new_playlist)?;

    let client = state.spotify(&token);
    let playlist_id = spotify::playlist::create_with_tracks(&client, &new_playlist).await?;
    info!(
        "Created playlist {} with {} tracks",
        new_playlist.name,
        new_playlist.song_ids.len()
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": playlist_id, "name": new_playlist.name })),
    ))
}

pub fn validate_new_playlist(new_playlist: &NewPlaylist) -> Result<()> {
    if new_playlist.name.trim().is_empty() {
        return Err(Error::BadRequest("Playlist name is required.".to_string()));
    }
    if new_playlist.song_ids.is_empty() {
        return Err(Error::BadRequest(
            "At least one song is required.".to_string(),
        ));
    }
    Ok(())
}
