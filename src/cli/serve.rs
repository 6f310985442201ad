use crate::{config::Settings, error, server, success, warning};

pub async fn serve(address: Option<String>, open_browser: bool) {
    let mut settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => error!("Cannot load settings. Err: {}", e),
    };
    if let Some(address) = address {
        settings.server_address = address;
    }

    let state = match server::AppState::new(settings) {
        Ok(state) => state,
        Err(e) => error!("Cannot create HTTP client. Err: {}", e),
    };

    if open_browser {
        let login_url = format!("http://{}/auth/login", state.settings.server_address);
        if webbrowser::open(&login_url).is_err() {
            warning!(
                "Failed to open browser. Please navigate to the following URL manually:\n{}",
                login_url
            )
        }
    }

    success!("Starting server on {}", state.settings.server_address);
    if let Err(e) = server::start_api_server(state).await {
        error!("Server stopped. Err: {}", e);
    }
}
