use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use motorhub_api::config::ApiConfig;
use motorhub_auth::{Identity, InMemoryUserStore, Role, UserStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    motorhub_observability::init();

    let config = ApiConfig::from_env()?;
    let users: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::new());

    if let Some(admin) = &config.bootstrap_admin {
        users
            .register(Identity::new(admin.clone(), format!("{admin}@motorhub.local"), "Bootstrap Admin").verified())
            .context("failed to register bootstrap admin")?;
        users
            .set_role(admin, Role::Admin)
            .context("failed to grant bootstrap admin role")?;
        info!(identity = %admin, "bootstrap admin registered");
    }

    let app = motorhub_api::app::build_app(&config, users);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
