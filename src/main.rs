use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use placement_backend::{
    config::{get_config, init_config, LogFormat, StoreBackend},
    database::{pool::create_pool, MemoryStore, PgStore},
    routes,
    services::relay_service::RelayService,
    AppState,
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config();
    init_tracing(config.log_format);

    let app_state = match config.store {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for the postgres store"))?;
            let pool = create_pool(database_url).await?;
            sqlx::migrate!("./migrations").run(&pool).await?;

            if let (Some(_), Some(secret)) = (
                config.notification_webhook_url.as_ref(),
                config.webhook_secret.clone(),
            ) {
                let relay = RelayService::new(pool.clone(), secret);
                tokio::spawn(async move {
                    loop {
                        match relay.run_once().await {
                            Ok(true) => {}
                            Ok(false) => {
                                tokio::time::sleep(Duration::from_millis(1000)).await;
                            }
                            Err(e) => {
                                tracing::error!(error = ?e, "notification relay worker error");
                                tokio::time::sleep(Duration::from_secs(2)).await;
                            }
                        }
                    }
                });
                info!("Notification relay worker started");
            }

            let store = Arc::new(PgStore::new(pool, config.notification_webhook_url.clone()));
            AppState::new(store.clone(), store, config.notification_page_limit)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; state is lost on restart");
            let store = Arc::new(MemoryStore::new());
            AppState::new(store.clone(), store, config.notification_page_limit)
        }
    };

    let app = routes::router(app_state, config);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
