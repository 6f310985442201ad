//! Running Session Playlist Backend
//!
//! This library authenticates a user against the Spotify Web API, pulls their
//! recently played or saved tracks, resolves each track's tempo and assembles a
//! playlist proposal whose tempo matches the runner's cadence and whose length
//! covers the planned session.
//!
//! # Modules
//!
//! - `api` - HTTP handlers exposed to the frontend
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - Error taxonomy shared by every layer
//! - `server` - Router, CORS and shared server state
//! - `session` - Tempo filtering, cadence model and duration fitting
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod server;
pub mod session;
pub mod spotify;
pub mod types;
pub mod utils;

pub use error::Error;

/// Result alias used throughout the crate.
///
/// # Example
///
/// ```
/// use sportify::Result;
///
/// async fn fetch_data() -> Result<String> {
///     Ok("data".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Fetching saved tracks page at offset {}", offset);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only meant for fatal errors at the top of a CLI command. Request handlers
/// must return an [`Error`] instead.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable problems, such as a tempo batch that could not be
/// resolved and was left out of the result.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
