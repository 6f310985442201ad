use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub scope: String,
    pub expires_in: u64,
    pub refresh_token: Option<String>,
}

/// A track as shown to the frontend.
///
/// `played_or_added_at` is "played at" for recently played tracks and
/// "added at" for saved tracks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub artwork_url: Option<String>,
    pub played_or_added_at: DateTime<Utc>,
    pub duration_seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistProposal {
    pub name: String,
    pub target_bpm: u32,
    pub needed_duration_seconds: u32,
    pub tracks: Vec<Track>,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentlyPlayedResponse {
    pub items: Vec<PlayHistoryItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayHistoryItem {
    pub track: ProviderTrack,
    pub played_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTracksResponse {
    pub items: Vec<SavedTrackItem>,
    pub next: Option<String>,
    pub total: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTrackItem {
    pub track: ProviderTrack,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderTrack {
    // local files come back without an id
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ProviderArtist>,
    pub album: ProviderAlbum,
    pub duration_ms: u64,
}

impl ProviderTrack {
    /// Converts the wire track into a [`Track`], or `None` when it has no id.
    ///
    /// The duration is integer-divided by 1000, so sub-second remainders are
    /// truncated.
    pub fn into_track(self, played_or_added_at: DateTime<Utc>) -> Option<Track> {
        let id = self.id.filter(|id| !id.is_empty())?;
        let artist = self
            .artists
            .into_iter()
            .next()
            .map(|a| a.name)
            .unwrap_or_default();
        let artwork_url = self.album.images.into_iter().next().map(|i| i.url);

        Some(Track {
            id,
            title: self.name,
            artist,
            album: self.album.name,
            artwork_url,
            played_or_added_at,
            duration_seconds: u32::try_from(self.duration_ms / 1000).unwrap_or(u32::MAX),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderArtist {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderAlbum {
    pub name: String,
    #[serde(default)]
    pub images: Vec<ProviderImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderImage {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub id: Option<String>,
    pub tempo: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeveralAudioFeaturesResponse {
    // unknown ids come back as null entries
    pub audio_features: Vec<Option<AudioFeatures>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUserResponse {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub display_name: Option<String>,
    pub email: Option<String>,
}

/// Playlist creation request sent by the frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlaylist {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub visible: bool,
    #[serde(default, alias = "colaborative")]
    pub collaborative: bool,
    #[serde(default)]
    pub song_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
    pub collaborative: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistResponse {
    pub snapshot_id: String,
}
