use axum::{
    extract::FromRequestParts,
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
    },
};

use crate::{error::Error, utils};

/// Name of the cookie holding the user's Spotify access token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Bearer credential of the calling user.
///
/// Taken from an `Authorization: Bearer` header, falling back to the
/// `access_token` cookie set by the login callback.
#[derive(Debug, Clone)]
pub struct AccessToken(pub String);

impl<S: Send + Sync> FromRequestParts<S> for AccessToken {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let bearer = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string);

        let token = bearer.or_else(|| {
            parts
                .headers
                .get_all(COOKIE)
                .iter()
                .filter_map(|value| value.to_str().ok())
                .find_map(|header| utils::get_cookie(header, ACCESS_TOKEN_COOKIE))
        });

        token.map(AccessToken).ok_or(Error::Unauthorized)
    }
}
