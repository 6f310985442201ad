//! Error types for sportify.
//!
//! Hard failures abort the operation that raised them and surface at the HTTP
//! boundary. Soft failures (a tempo batch that could not be resolved) never
//! appear here: they are logged and only shrink the tempo map.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A primary track-listing call returned a non-success status.
    #[error("Spotify request failed with status {status}")]
    ProviderFetchFailed { status: u16 },

    /// A provider payload did not match the expected shape.
    #[error("Malformed Spotify response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    /// Network or client level failure talking to the provider.
    #[error("Spotify transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// No candidate track fell inside the tempo band.
    #[error("No tracks match the target tempo")]
    NoMatchingTracks,

    /// Session parameters that make the cadence or duration model undefined.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// No bearer credential was supplied with the request.
    #[error("Missing access token")]
    Unauthorized,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}
