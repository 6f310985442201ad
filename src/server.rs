use std::{
    collections::HashMap,
    net::SocketAddr,
    str::FromStr,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post},
};
use reqwest::Client;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use crate::{Result, api, config::Settings, error::Error, info, spotify::SpotifyClient};

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub http: Client,
    pub pending_logins: Arc<Mutex<PendingLogins>>,
}

impl AppState {
    pub fn new(settings: Settings) -> Result<Self> {
        let http = SpotifyClient::http_client(settings.request_timeout)?;
        Ok(Self {
            settings: Arc::new(settings),
            http,
            pending_logins: Arc::new(Mutex::new(PendingLogins::default())),
        })
    }

    /// Client acting on behalf of the user owning `access_token`.
    pub fn spotify(&self, access_token: &str) -> SpotifyClient {
        SpotifyClient::new(self.http.clone(), &self.settings.api_url, access_token)
    }
}

/// How long a login may sit between `/auth/login` and `/callback`.
pub const LOGIN_TTL: Duration = Duration::from_secs(600);
/// Most logins kept in flight at once; the oldest is evicted past this.
pub const MAX_PENDING_LOGINS: usize = 256;

/// PKCE code verifiers of logins in flight, keyed by OAuth `state`.
///
/// Expired entries are purged on every insert and the map never holds more
/// than [`MAX_PENDING_LOGINS`] entries, so abandoned logins cannot pile up.
#[derive(Debug, Default)]
pub struct PendingLogins {
    entries: HashMap<String, (String, Instant)>,
}

impl PendingLogins {
    pub fn insert(&mut self, state: String, verifier: String) {
        self.insert_at(state, verifier, Instant::now());
    }

    fn insert_at(&mut self, state: String, verifier: String, now: Instant) {
        self.entries
            .retain(|_, (_, created)| now.duration_since(*created) <= LOGIN_TTL);

        while self.entries.len() >= MAX_PENDING_LOGINS {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, (_, created))| *created)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => self.entries.remove(&key),
                None => break,
            };
        }

        self.entries.insert(state, (verifier, now));
    }

    /// Removes the login for `state`, returning its verifier unless it expired.
    pub fn take(&mut self, state: &str) -> Option<String> {
        self.take_at(state, Instant::now())
    }

    fn take_at(&mut self, state: &str, now: Instant) -> Option<String> {
        let (verifier, created) = self.entries.remove(state)?;
        (now.duration_since(created) <= LOGIN_TTL).then_some(verifier)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn router(state: AppState) -> Result<Router> {
    let origin = HeaderValue::from_str(&state.settings.frontend_url)
        .map_err(|e| Error::Config(format!("invalid FRONTEND_URL: {}", e)))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true);

    Ok(Router::new()
        .route("/health", get(api::health))
        .route("/auth/login", get(api::login))
        .route("/auth/logout", get(api::logout))
        .route("/callback", get(api::callback))
        .route("/spotify/userinfo", get(api::user_info))
        .route("/spotify/recently-played", get(api::recently_played))
        .route(
            "/spotify/recently-played/bpm",
            get(api::recently_played_by_bpm),
        )
        .route("/spotify/saved-tracks/bpm", get(api::saved_tracks_by_bpm))
        .route("/spotify/playlist", post(api::create_playlist))
        .route("/runningsession/playlist", get(api::session_playlist))
        .with_state(state)
        .layer(cors))
}

pub async fn start_api_server(state: AppState) -> Result<()> {
    let addr = SocketAddr::from_str(&state.settings.server_address).map_err(|e| {
        Error::Config(format!(
            "invalid SERVER_ADDRESS {}: {}",
            state.settings.server_address, e
        ))
    })?;

    let app = router(state)?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
