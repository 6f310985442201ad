use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    config::Settings,
    error, info,
    session::{SessionParams, SessionPlaylistAssembler},
    spotify::SpotifyClient,
    success, utils,
};

pub async fn session(token: String, params: SessionParams) {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => error!("Cannot load settings. Err: {}", e),
    };

    let http = match SpotifyClient::http_client(settings.request_timeout) {
        Ok(http) => http,
        Err(e) => error!("Cannot create HTTP client. Err: {}", e),
    };
    let client = SpotifyClient::new(http, &settings.api_url, token);

    let pb = ProgressBar::new_spinner();
    pb.set_message("Matching saved tracks to your cadence...");
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let result = SessionPlaylistAssembler::new(settings.session_track_cap)
        .assemble(&client, params)
        .await;
    pb.finish_and_clear();

    let proposal = match result {
        Ok(proposal) => proposal,
        Err(e) => error!("Cannot assemble playlist. Err: {}", e),
    };

    success!("{}", proposal.name);
    info!(
        "{} tracks, budget {}",
        proposal.tracks.len(),
        utils::format_duration(proposal.needed_duration_seconds)
    );

    let table = Table::new(utils::build_track_table_rows(&proposal.tracks));
    println!("{}", table);
}
