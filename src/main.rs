use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use reqwest::Client;
use support_console::{
    config::{get_config, init_config},
    database::pool::{create_pool, run_migrations},
    routes,
    services::line_client::HttpLineClient,
    AppState,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info,sqlx=warn")),
        )
        .init();
    init_config()?;
    let config = get_config();

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let http_client = Client::builder().timeout(config.provider_timeout).build()?;
    let line = Arc::new(HttpLineClient::new(
        http_client,
        config.line_api_base.clone(),
        config.line_data_api_base.clone(),
    ));

    let app_state = AppState::new(pool, config, line);

    if let Some((username, password)) = &config.bootstrap_owner {
        match app_state.identity_service.ensure_owner(username, password).await? {
            Some(owner) => info!(staff_id = owner.id, "bootstrap owner account created"),
            None => info!("staff accounts exist, bootstrap owner skipped"),
        }
    }

    info!("Serving uploads from: {}", config.uploads_dir);
    let app = routes::router(app_state, config.webhook_rps)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
