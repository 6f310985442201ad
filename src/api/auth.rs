use axum::{
    extract::{Query, State},
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::{
    Result,
    api::extract::ACCESS_TOKEN_COOKIE,
    error::Error,
    info,
    server::AppState,
    spotify, utils, warning,
};

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Starts the PKCE authorization code flow by redirecting to Spotify.
///
/// The code verifier stays in memory, keyed by the `state` sent along, until
/// the callback consumes it or it expires.
pub async fn login(State(state): State<AppState>) -> Result<Redirect> {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);
    let login_state = utils::generate_state();

    let auth_url = spotify::auth::authorize_url(&state.settings, &code_challenge, &login_state)?;

    state
        .pending_logins
        .lock()
        .await
        .insert(login_state, code_verifier);

    Ok(Redirect::to(auth_url.as_str()))
}

/// Completes the login: exchanges the code, stores the access token in an
/// HttpOnly cookie and sends the browser back to the frontend.
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<Response> {
    if let Some(reason) = params.error {
        warning!("Spotify denied authorization: {}", reason);
        return Err(Error::Unauthorized);
    }

    let (Some(code), Some(login_state)) = (params.code, params.state) else {
        return Err(Error::BadRequest("missing code or state".to_string()));
    };

    let Some(verifier) = state.pending_logins.lock().await.take(&login_state) else {
        return Err(Error::BadRequest("unknown or expired login state".to_string()));
    };

    let token = spotify::auth::exchange_code_pkce(&state.http, &state.settings, &code, &verifier).await?;
    info!("Login completed, token valid for {}s", token.expires_in);

    let cookie = format!(
        "{name}={value}; HttpOnly; Path=/; SameSite=Lax; Max-Age={max_age}",
        name = ACCESS_TOKEN_COOKIE,
        value = token.access_token,
        max_age = token.expires_in
    );
    let target = format!("{}/callback", state.settings.frontend_url);

    Ok((AppendHeaders([(SET_COOKIE, cookie)]), Redirect::to(&target)).into_response())
}

/// Clears the access token cookie.
pub async fn logout() -> Response {
    let cookie = format!(
        "{name}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0",
        name = ACCESS_TOKEN_COOKIE
    );

    (AppendHeaders([(SET_COOKIE, cookie)]), Redirect::to("/")).into_response()
}
