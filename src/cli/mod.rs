//! # CLI Module
//!
//! Command implementations behind the `sportify` binary.
//!
//! - [`serve`] - Runs the HTTP backend the frontend talks to
//! - [`session`] - Assembles a running session playlist straight from the
//!   terminal, given an access token
//!
//! Both load [`crate::config::Settings`] from the environment first and stop
//! the process with a readable message when configuration is missing.

mod serve;
mod session;

pub use serve::serve;
pub use session::session;
