//! # API Module
//!
//! HTTP endpoints consumed by the single-page frontend.
//!
//! ## Endpoints
//!
//! ### Authentication
//!
//! - [`login`] - Redirects to Spotify's authorization page (PKCE flow)
//! - [`callback`] - Exchanges the authorization code and sets the token cookie
//! - [`logout`] - Clears the token cookie
//!
//! ### Spotify data
//!
//! - [`user_info`] - Display name and email of the logged in user
//! - [`recently_played`] - Recently played tracks
//! - [`recently_played_by_bpm`] - Recently played tracks near a target tempo
//! - [`saved_tracks_by_bpm`] - Saved tracks near a target tempo
//! - [`create_playlist`] - Creates a playlist from a list of track ids
//!
//! ### Running sessions
//!
//! - [`session_playlist`] - Playlist proposal sized and paced for a run
//!
//! ### Monitoring
//!
//! - [`health`] - Application status and version
//!
//! Every endpoint except login, callback, logout and health needs a bearer
//! credential, see [`AccessToken`]. Failures are rendered as
//! `{"error": "..."}` with the status from [`crate::error::Error::status_code`].

mod auth;
mod error;
mod extract;
mod health;
mod session;
mod spotify;

pub use auth::{callback, login, logout};
pub use extract::{ACCESS_TOKEN_COOKIE, AccessToken};
pub use health::health;
pub use session::session_playlist;
pub use spotify::{
    create_playlist, recently_played, recently_played_by_bpm, saved_tracks_by_bpm, user_info,
    validate_new_playlist,
};
