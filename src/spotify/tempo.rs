use std::collections::HashMap;

use tokio::task::JoinSet;

use crate::{
    Result,
    spotify::SpotifyClient,
    types::{AudioFeatures, SeveralAudioFeaturesResponse},
    warning,
};

/// Most ids Spotify accepts in one `/audio-features` call.
pub const MAX_IDS_PER_BATCH: usize = 100;

/// Track id to tempo in beats per minute. Only ids whose tempo was resolved
/// are present.
pub type TempoMap = HashMap<String, f64>;

/// How tempo is resolved for a set of track ids.
///
/// Both forms tolerate failure: an id (or a whole batch) that cannot be
/// resolved is left out of the map and the lookup carries on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempoLookup {
    /// One call per id, awaited one after the other.
    PerId,
    /// Ids grouped in chunks of at most [`MAX_IDS_PER_BATCH`], one call per
    /// chunk. Chunks run concurrently; the map is complete once every chunk
    /// has finished. Cancelling the lookup cancels the pending chunks.
    Batched,
}

impl TempoLookup {
    pub async fn lookup(&self, client: &SpotifyClient, ids: &[String]) -> TempoMap {
        match self {
            TempoLookup::PerId => lookup_per_id(client, ids).await,
            TempoLookup::Batched => lookup_batched(client, ids).await,
        }
    }
}

async fn lookup_per_id(client: &SpotifyClient, ids: &[String]) -> TempoMap {
    let mut tempos = TempoMap::new();

    for id in ids {
        let path = format!("/audio-features/{id}", id = id);
        match client.get_json::<AudioFeatures>(&path).await {
            Ok(AudioFeatures {
                tempo: Some(tempo), ..
            }) => {
                tempos.insert(id.clone(), tempo);
            }
            Ok(_) => warning!("No tempo reported for track {}", id),
            Err(e) => warning!("Failed to fetch audio features for track {}: {}", id, e),
        }
    }

    tempos
}

async fn lookup_batched(client: &SpotifyClient, ids: &[String]) -> TempoMap {
    // Dropping the set aborts batches still in flight.
    let mut batches = JoinSet::new();

    for chunk in ids.chunks(MAX_IDS_PER_BATCH) {
        let first_id = chunk.first().cloned().unwrap_or_default();
        let client = client.clone();
        let chunk = chunk.to_vec();
        batches.spawn(async move { (first_id, fetch_batch(&client, &chunk).await) });
    }

    let mut tempos = TempoMap::new();
    while let Some(joined) = batches.join_next().await {
        match joined {
            Ok((_, Ok(batch))) => tempos.extend(batch),
            Ok((first_id, Err(e))) => warning!(
                "Tempo batch starting at track {} failed, skipping its tracks: {}",
                first_id,
                e
            ),
            Err(e) => warning!("Task join error: {}", e),
        }
    }

    tempos
}

async fn fetch_batch(client: &SpotifyClient, ids: &[String]) -> Result<Vec<(String, f64)>> {
    let path = format!("/audio-features?ids={ids}", ids = ids.join(","));
    let response: SeveralAudioFeaturesResponse = client.get_json(&path).await?;

    Ok(response
        .audio_features
        .into_iter()
        .flatten()
        .filter_map(|features| Some((features.id?, features.tempo?)))
        .collect())
}
