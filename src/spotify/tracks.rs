use crate::{
    Result, info,
    spotify::SpotifyClient,
    types::{RecentlyPlayedResponse, SavedTracksResponse, Track},
};

/// Hard cap Spotify puts on `limit` for both track listings.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Where candidate tracks for tempo analysis come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackSource {
    /// One call returning up to `limit` most recent plays, newest first.
    ///
    /// There is no cursor, so two calls may overlap when new plays happen in
    /// between. No deduplication is done.
    RecentlyPlayed { limit: u32 },
    /// The user's library, fetched in pages at offsets `0, page_size,
    /// 2 * page_size, ...` until `total_cap` items were fetched or a page
    /// comes back empty.
    SavedTracks { page_size: u32, total_cap: u32 },
}

impl TrackSource {
    /// Recently played source with `limit` clamped to `1..=50`.
    pub fn recently_played(limit: u32) -> Self {
        TrackSource::RecentlyPlayed {
            limit: limit.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Saved tracks source with the page size clamped to `1..=50`.
    pub fn saved_tracks(page_size: u32, total_cap: u32) -> Self {
        TrackSource::SavedTracks {
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
            total_cap,
        }
    }

    /// Retrieves the candidate tracks in provider order.
    ///
    /// Items without a track id (local files) are skipped.
    ///
    /// # Errors
    ///
    /// Any failing call aborts the whole retrieval. Pages that were already
    /// fetched are discarded, the caller never sees a partial list.
    pub async fn fetch(&self, client: &SpotifyClient) -> Result<Vec<Track>> {
        match *self {
            TrackSource::RecentlyPlayed { limit } => {
                fetch_recently_played(client, limit.clamp(1, MAX_PAGE_SIZE)).await
            }
            TrackSource::SavedTracks {
                page_size,
                total_cap,
            } => fetch_saved_tracks(client, page_size.clamp(1, MAX_PAGE_SIZE), total_cap).await,
        }
    }
}

async fn fetch_recently_played(client: &SpotifyClient, limit: u32) -> Result<Vec<Track>> {
    let path = format!("/me/player/recently-played?limit={limit}", limit = limit);
    let response: RecentlyPlayedResponse = client.get_json(&path).await?;

    Ok(response
        .items
        .into_iter()
        .filter_map(|item| item.track.into_track(item.played_at))
        .collect())
}

async fn fetch_saved_tracks(
    client: &SpotifyClient,
    page_size: u32,
    total_cap: u32,
) -> Result<Vec<Track>> {
    let mut tracks = Vec::new();
    let mut fetched: u32 = 0;
    let mut offset: u32 = 0;

    while fetched < total_cap {
        let limit = page_size.min(total_cap - fetched);
        let path = format!(
            "/me/tracks?limit={limit}&offset={offset}",
            limit = limit,
            offset = offset
        );
        let page: SavedTracksResponse = client.get_json(&path).await?;

        if page.items.is_empty() {
            break;
        }

        let page_len = u32::try_from(page.items.len()).unwrap_or(u32::MAX);
        fetched = fetched.saturating_add(page_len);
        tracks.extend(
            page.items
                .into_iter()
                .take(limit as usize)
                .filter_map(|item| item.track.into_track(item.added_at)),
        );

        offset += page_size;
    }

    info!(
        "Fetched {} saved tracks ({} usable)",
        fetched.min(total_cap),
        tracks.len()
    );
    Ok(tracks)
}
