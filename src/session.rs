//! Running session playlist assembly.
//!
//! A runner's cadence (steps per minute) is estimated from pace and height and
//! halved to get the target musical tempo, two steps per beat. Candidate tracks
//! are pulled from Spotify, matched against that tempo within a tolerance band
//! and then trimmed from the end until the playlist fits the session length
//! plus a 40% margin for skipping.

use crate::{
    Result,
    error::Error,
    info,
    spotify::{
        SpotifyClient,
        tempo::{TempoLookup, TempoMap},
        tracks::{MAX_PAGE_SIZE, TrackSource},
    },
    types::{PlaylistProposal, Track},
};

/// Stride length as a fraction of body height.
pub const STRIDE_LENGTH_COEFFICIENT: f64 = 0.413;
/// Tempo tolerance, in BPM, for session playlists.
pub const SESSION_BPM_THRESHOLD: u32 = 10;
/// Extra playlist length on top of the session duration.
pub const DURATION_MARGIN: f64 = 1.4;

/// Parameters of a planned run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionParams {
    /// Minutes per kilometer.
    pub pace: f64,
    /// Kilometers.
    pub distance: f64,
    /// Centimeters.
    pub height: u32,
}

impl SessionParams {
    pub fn validate(&self) -> Result<()> {
        if !self.pace.is_finite() || self.pace <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "pace must be a positive number of minutes per km, got {}",
                self.pace
            )));
        }
        if !self.distance.is_finite() || self.distance <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "distance must be a positive number of km, got {}",
                self.distance
            )));
        }
        if self.height == 0 {
            return Err(Error::InvalidParameter(
                "height must be a positive number of cm".to_string(),
            ));
        }
        Ok(())
    }
}

/// Estimates running cadence in steps per minute, rounded to the nearest step.
///
/// ```text
/// metersPerMinute = 1000 / pace
/// strideLength    = 0.413 * height / 100
/// cadence         = round(metersPerMinute / strideLength)
/// ```
///
/// Exact halves round to the even neighbour.
pub fn calculate_cadence(pace: f64, height: u32) -> Result<u32> {
    if !pace.is_finite() || pace <= 0.0 {
        return Err(Error::InvalidParameter(format!(
            "pace must be positive, got {}",
            pace
        )));
    }
    if height == 0 {
        return Err(Error::InvalidParameter("height must be positive".to_string()));
    }

    let meters_per_minute = 1000.0 / pace;
    let stride_length = STRIDE_LENGTH_COEFFICIENT * (f64::from(height) / 100.0);
    let cadence = round_steps(meters_per_minute / stride_length);

    if !cadence.is_finite() || cadence > f64::from(u32::MAX) {
        return Err(Error::InvalidParameter(format!(
            "pace {} and height {} give no usable cadence",
            pace, height
        )));
    }
    Ok(cadence as u32)
}

fn round_steps(steps: f64) -> f64 {
    steps.round_ties_even()
}

/// Maps steps per minute to beats per minute, two steps per beat.
pub fn target_bpm(cadence: u32) -> u32 {
    cadence / 2
}

/// Session length in seconds, without margin.
pub fn session_duration_seconds(pace: f64, distance: f64) -> f64 {
    pace * distance * 60.0
}

/// Playlist length budget in seconds: the session length plus the margin.
pub fn needed_duration_seconds(pace: f64, distance: f64) -> f64 {
    session_duration_seconds(pace, distance) * DURATION_MARGIN
}

/// Keeps the tracks whose tempo lies in `[target - threshold, target + threshold]`.
///
/// Input order is preserved. Tracks without a resolved tempo are dropped.
pub fn filter_by_tempo(tracks: Vec<Track>, tempos: &TempoMap, target: u32, threshold: u32) -> Vec<Track> {
    let lower = f64::from(target) - f64::from(threshold);
    let upper = f64::from(target) + f64::from(threshold);

    tracks
        .into_iter()
        .filter(|track| {
            tempos
                .get(&track.id)
                .is_some_and(|tempo| *tempo >= lower && *tempo <= upper)
        })
        .collect()
}

/// Longest prefix of `tracks` that fits `budget_seconds`, dropping tracks from
/// the end only.
///
/// At least one track is always kept, even when it alone exceeds the budget.
pub fn trim_to_duration(tracks: &[Track], budget_seconds: f64) -> &[Track] {
    let mut end = tracks.len();
    let mut total: u64 = tracks.iter().map(|t| u64::from(t.duration_seconds)).sum();

    while end > 1 && total as f64 > budget_seconds {
        end -= 1;
        total -= u64::from(tracks[end].duration_seconds);
    }

    &tracks[..end]
}

pub fn proposal_name(distance: f64, pace: f64, bpm: u32) -> String {
    format!(
        "Running Session - {}km - {}min/km - {} BPM",
        distance, pace, bpm
    )
}

/// Pulls tracks from `source`, resolves their tempo with `lookup` and keeps
/// the ones inside the tempo band. An empty result is returned as-is.
pub async fn tracks_by_bpm(
    client: &SpotifyClient,
    source: TrackSource,
    lookup: TempoLookup,
    target: u32,
    threshold: u32,
) -> Result<Vec<Track>> {
    let tracks = source.fetch(client).await?;
    let ids: Vec<String> = tracks.iter().map(|t| t.id.clone()).collect();
    let tempos = lookup.lookup(client, &ids).await;

    let matches = filter_by_tempo(tracks, &tempos, target, threshold);
    info!(
        "{} of {} tracks within {}±{} BPM",
        matches.len(),
        ids.len(),
        target,
        threshold
    );
    Ok(matches)
}

/// Builds playlist proposals for running sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPlaylistAssembler {
    source: TrackSource,
    lookup: TempoLookup,
    threshold: u32,
}

impl SessionPlaylistAssembler {
    /// Assembler drawing from up to `track_cap` saved tracks with batched
    /// tempo lookup.
    pub fn new(track_cap: u32) -> Self {
        Self {
            source: TrackSource::saved_tracks(MAX_PAGE_SIZE, track_cap),
            lookup: TempoLookup::Batched,
            threshold: SESSION_BPM_THRESHOLD,
        }
    }

    pub fn with_source(mut self, source: TrackSource, lookup: TempoLookup) -> Self {
        self.source = source;
        self.lookup = lookup;
        self
    }

    /// Assembles a proposal for the session described by `params`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidParameter`] for non-positive pace, distance or height
    /// - [`Error::ProviderFetchFailed`] when the track listing fails
    /// - [`Error::NoMatchingTracks`] when nothing falls in the tempo band
    pub async fn assemble(
        &self,
        client: &SpotifyClient,
        params: SessionParams,
    ) -> Result<PlaylistProposal> {
        params.validate()?;

        let bpm = target_bpm(calculate_cadence(params.pace, params.height)?);
        let needed = needed_duration_seconds(params.pace, params.distance);
        info!(
            "BPM: {}, Duration: {}s, With margin: {}s",
            bpm,
            session_duration_seconds(params.pace, params.distance),
            needed
        );

        let tracks = tracks_by_bpm(client, self.source, self.lookup, bpm, self.threshold).await?;
        if tracks.is_empty() {
            return Err(Error::NoMatchingTracks);
        }

        let kept = trim_to_duration(&tracks, needed);
        let total: u64 = kept.iter().map(|t| u64::from(t.duration_seconds)).sum();
        info!(
            "Keeping {} of {} tracks, {}s of {}s needed",
            kept.len(),
            tracks.len(),
            total,
            needed
        );

        Ok(PlaylistProposal {
            name: proposal_name(params.distance, params.pace, bpm),
            target_bpm: bpm,
            needed_duration_seconds: needed as u32,
            tracks: kept.to_vec(),
        })
    }
}
