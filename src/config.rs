//! Configuration management for the running session backend.
//!
//! Values come from environment variables, optionally seeded from `.env`
//! files. The lookup order is:
//! 1. Environment variables (highest priority)
//! 2. `.env` in the current working directory
//! 3. `.env` in the local data directory (`<data_local_dir>/sportify/.env`)
//! 4. Application defaults (where applicable)

use std::{env, path::PathBuf, time::Duration};

use crate::{Result, error::Error};

pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:5000";
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:8080";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:5000/callback";
pub const DEFAULT_SCOPE: &str = "user-read-email user-read-recently-played user-library-read playlist-modify-public playlist-modify-private";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SESSION_TRACK_CAP: u32 = 200;

/// Loads environment variables from `.env` files.
///
/// The working directory file is read first, then the one in the local data
/// directory. Variables that are already set are never overwritten, and a
/// missing file is not an error. The data directory is created when absent so
/// users know where to drop their configuration.
///
/// # Errors
///
/// Returns an error if the data directory cannot be created or if an existing
/// `.env` file cannot be parsed.
pub async fn load_env() -> Result<()> {
    let _ = dotenv::dotenv();

    let path = env_file_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if path.is_file() {
        dotenv::from_path(&path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
    }
    Ok(())
}

/// Location of the user level `.env` file.
pub fn env_file_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("sportify/.env");
    path
}

/// Runtime settings resolved once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Address the HTTP server binds to, e.g. `127.0.0.1:5000`.
    pub server_address: String,
    /// Origin of the single-page frontend; allowed by CORS and used as the
    /// post-login redirect target.
    pub frontend_url: String,
    pub client_id: String,
    /// Only sent on code exchange when configured.
    pub client_secret: Option<String>,
    /// Must match the redirect URI registered with Spotify.
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    /// Applied to every provider call.
    pub request_timeout: Duration,
    /// Upper bound on saved tracks pulled for a running session.
    pub session_track_cap: u32,
}

impl Settings {
    /// Reads every setting from the environment.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Config`] when `SPOTIFY_API_AUTH_CLIENT_ID` is not set
    /// or when a numeric setting cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server_address: var_or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS),
            frontend_url: var_or("FRONTEND_URL", DEFAULT_FRONTEND_URL)
                .trim_end_matches('/')
                .to_string(),
            client_id: required_var("SPOTIFY_API_AUTH_CLIENT_ID")?,
            client_secret: env::var("SPOTIFY_API_AUTH_CLIENT_SECRET")
                .ok()
                .filter(|s| !s.is_empty()),
            redirect_uri: var_or("SPOTIFY_API_REDIRECT_URI", DEFAULT_REDIRECT_URI),
            scope: var_or("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE),
            auth_url: var_or("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL),
            token_url: var_or("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL),
            api_url: var_or("SPOTIFY_API_URL", DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_string(),
            request_timeout: Duration::from_secs(parse_var(
                "SPOTIFY_API_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
            session_track_cap: parse_var("SESSION_TRACK_CAP", DEFAULT_SESSION_TRACK_CAP)?,
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    value_or(env::var(key).ok(), default)
}

fn required_var(key: &str) -> Result<String> {
    env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::Config(format!("{} must be set", key)))
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    parse_value(key, env::var(key).ok(), default)
}

fn value_or(raw: Option<String>, default: &str) -> String {
    raw.filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| Error::Config(format!("{} is invalid: {}", key, e))),
        _ => Ok(default),
    }
}
