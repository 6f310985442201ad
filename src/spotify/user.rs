use crate::{
    Result,
    spotify::SpotifyClient,
    types::{CurrentUserResponse, UserInfo},
};

/// Fetches the profile of the user owning the access token.
pub async fn get_current_user(client: &SpotifyClient) -> Result<CurrentUserResponse> {
    client.get_json("/me").await
}

pub async fn get_user_info(client: &SpotifyClient) -> Result<UserInfo> {
    let me = get_current_user(client).await?;
    Ok(UserInfo {
        display_name: me.display_name,
        email: me.email,
    })
}
