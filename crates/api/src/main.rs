use anyhow::Context;

use pagecraft_infra::config::AppConfig;
use pagecraft_pages::PartCatalog;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pagecraft_observability::init();

    PartCatalog::validate().context("part catalog is inconsistent")?;
    let config = AppConfig::from_env().context("invalid configuration")?;

    let services = pagecraft_api::app::services::AppServices::from_config(&config)
        .await
        .context("failed to initialize page store")?;
    let app = pagecraft_api::app::build_app(config.jwt_secret.clone(), services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
