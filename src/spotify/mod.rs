//! # Spotify Integration Module
//!
//! This module is the integration layer between the backend and the Spotify
//! Web API. It turns provider responses into typed values and applies the
//! failure policy for each kind of call.
//!
//! ## Architecture
//!
//! ```text
//! HTTP handlers / CLI
//!          ↓
//! Session assembler (crate::session)
//!          ↓
//! Spotify Integration Layer
//!     ├── Authentication (authorize URL, PKCE code exchange)
//!     ├── Track sources (recently played, saved tracks)
//!     ├── Tempo lookup (per id, batched)
//!     ├── Current user
//!     └── Playlist operations (create, add tracks)
//!          ↓
//! HTTP Layer (reqwest, serde_json)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Failure Policy
//!
//! - **Track listings** are fail-fast: any non-success status aborts the whole
//!   retrieval with [`Error::ProviderFetchFailed`] and pages already fetched
//!   are dropped.
//! - **Tempo lookups** tolerate failure per id or per batch. Failed ids are
//!   left out of the tempo map and a warning is logged.
//! - **Rate limiting** is not handled. A 429 is treated like any other
//!   failure status.
//!
//! ## API Coverage
//!
//! - `GET /me` - Current user profile
//! - `GET /me/player/recently-played` - Recently played tracks
//! - `GET /me/tracks` - Saved tracks with offset pagination
//! - `GET /audio-features/{id}` - Tempo for one track
//! - `GET /audio-features?ids=...` - Tempo for up to 100 tracks
//! - `POST /users/{user_id}/playlists` - Create a playlist
//! - `POST /playlists/{playlist_id}/tracks` - Add tracks to a playlist
//! - `POST /api/token` - Authorization code exchange

pub mod auth;
pub mod playlist;
pub mod tempo;
pub mod tracks;
pub mod user;

use std::time::Duration;

use reqwest::{Client, Response};
use serde::{Serialize, de::DeserializeOwned};

use crate::{Result, error::Error};

/// Bearer-authenticated client for one user's requests.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    access_token: String,
}

impl SpotifyClient {
    pub fn new(http: Client, api_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }

    /// Builds the shared HTTP client with a per-request timeout.
    pub fn http_client(timeout: Duration) -> Result<Client> {
        Ok(Client::builder().timeout(timeout).build()?)
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Issues a GET against `path` (relative to the API base URL) and decodes
    /// the JSON body.
    ///
    /// # Errors
    ///
    /// - [`Error::ProviderFetchFailed`] for any non-success status
    /// - [`Error::MalformedResponse`] when the body does not match `T`
    /// - [`Error::Transport`] for network failures and timeouts
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .http
            .get(format!("{}{}", self.api_url, path))
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        decode(response).await
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let response = self
            .http
            .post(format!("{}{}", self.api_url, path))
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await?;

        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(Error::ProviderFetchFailed {
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
