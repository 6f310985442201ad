use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::Deserialize;

use crate::{
    Result,
    api::extract::AccessToken,
    error::Error,
    server::AppState,
    session::{SessionParams, SessionPlaylistAssembler},
    types::PlaylistProposal,
};

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub pace: f64,
    pub distance: f64,
    pub height: u32,
}

/// Playlist proposal for a run at `pace` min/km over `distance` km by a runner
/// `height` cm tall.
pub async fn session_playlist(
    State(state): State<AppState>,
    AccessToken(token): AccessToken,
    query: std::result::Result<Query<SessionQuery>, QueryRejection>,
) -> Result<Json<PlaylistProposal>> {
    let Query(query) = query.map_err(|rejection| Error::InvalidParameter(rejection.body_text()))?;
    let client = state.spotify(&token);
    let params = SessionParams {
        pace: query.pace,
        distance: query.distance,
        height: query.height,
    };

    let proposal = SessionPlaylistAssembler::new(state.settings.session_track_cap)
        .assemble(&client, params)
        .await?;
    Ok(Json(proposal))
}
