use crate::{
    Result,
    spotify::{SpotifyClient, user},
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, CreatePlaylistRequest,
        CreatePlaylistResponse, NewPlaylist,
    },
    utils,
};

/// Most track URIs Spotify accepts in one add-tracks call.
pub const MAX_TRACKS_PER_REQUEST: usize = 100;

/// Creates a playlist for the current user and fills it with the requested
/// tracks, in order.
///
/// Returns the id of the new playlist.
pub async fn create_with_tracks(client: &SpotifyClient, new_playlist: &NewPlaylist) -> Result<String> {
    let me = user::get_current_user(client).await?;
    let playlist = create(client, &me.id, new_playlist).await?;
    add_tracks(client, &playlist.id, &new_playlist.song_ids).await?;
    Ok(playlist.id)
}

pub async fn create(
    client: &SpotifyClient,
    user_id: &str,
    new_playlist: &NewPlaylist,
) -> Result<CreatePlaylistResponse> {
    let body = CreatePlaylistRequest {
        name: new_playlist.name.clone(),
        description: "Created by Sportify for a running session".to_string(),
        public: new_playlist.visible,
        collaborative: new_playlist.collaborative,
    };

    client
        .post_json(&format!("/users/{user_id}/playlists", user_id = user_id), &body)
        .await
}

/// Adds tracks in chunks of [`MAX_TRACKS_PER_REQUEST`], awaiting each chunk so
/// the playlist keeps the given order.
pub async fn add_tracks(client: &SpotifyClient, playlist_id: &str, track_ids: &[String]) -> Result<()> {
    let path = format!("/playlists/{playlist_id}/tracks", playlist_id = playlist_id);

    for chunk in track_ids.chunks(MAX_TRACKS_PER_REQUEST) {
        let body = AddTrackToPlaylistRequest {
            uris: chunk.iter().map(|id| utils::track_uri(id)).collect(),
        };
        let _: AddTrackToPlaylistResponse = client.post_json(&path, &body).await?;
    }

    Ok(())
}
