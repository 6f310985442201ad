use reqwest::{Client, Url};

use crate::{
    Result,
    config::Settings,
    error::Error,
    types::Token,
};

/// Builds the Spotify authorization URL for the PKCE authorization code flow.
///
/// # Arguments
///
/// * `settings` - Supplies the authorize endpoint, client id, redirect URI and scope
/// * `code_challenge` - SHA256 challenge derived from the code verifier
/// * `state` - Opaque value echoed back to the callback
///
/// # Errors
///
/// Fails with [`Error::Config`] when the configured authorize URL is not a
/// valid URL.
pub fn authorize_url(settings: &Settings, code_challenge: &str, state: &str) -> Result<Url> {
    Url::parse_with_params(
        &settings.auth_url,
        &[
            ("client_id", settings.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", settings.redirect_uri.as_str()),
            ("code_challenge", code_challenge),
            ("code_challenge_method", "S256"),
            ("scope", settings.scope.as_str()),
            ("state", state),
        ],
    )
    .map_err(|e| Error::Config(format!("invalid SPOTIFY_API_AUTH_URL: {}", e)))
}

/// Exchanges an authorization code for an access token using PKCE.
///
/// The code verifier proves that the client finishing the flow is the one that
/// started it. The client secret is only sent when configured.
///
/// # Errors
///
/// - [`Error::ProviderFetchFailed`] when the token endpoint rejects the code
/// - [`Error::MalformedResponse`] when the token payload is incomplete
/// - [`Error::Transport`] for network failures
pub async fn exchange_code_pkce(
    http: &Client,
    settings: &Settings,
    code: &str,
    verifier: &str,
) -> Result<Token> {
    let mut form = vec![
        ("grant_type", "authorization_code"),
        ("client_id", settings.client_id.as_str()),
        ("code", code),
        ("code_verifier", verifier),
        ("redirect_uri", settings.redirect_uri.as_str()),
    ];
    if let Some(secret) = &settings.client_secret {
        form.push(("client_secret", secret.as_str()));
    }

    let response = http.post(&settings.token_url).form(&form).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::ProviderFetchFailed {
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
