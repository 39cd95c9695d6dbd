mod config;
mod error;
mod handlers;
mod routes;
mod state;

use anyhow::Result;
use config::ServerConfig;
use roomkey_token::TokenIssuer;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let config = ServerConfig::from_env()?;
    let issuer = TokenIssuer::new(config.scheme, config.app_id, &config.secret)?;

    // The secret itself never reaches the logs.
    tracing::info!(
        app_id = config.app_id,
        scheme = %config.scheme,
        secret_len = config.secret.len(),
        "issuer configured"
    );

    let app = routes::create_router(AppState::new(issuer));

    tracing::info!(address = %config.bind, "roomkey-server listening");
    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
