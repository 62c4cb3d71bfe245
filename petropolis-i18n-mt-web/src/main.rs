use anyhow::Context;
use clap::Parser;
use petropolis_i18n_mt::{BulkTranslator, DeeplProvider, LayerAllowList, PostgresRepository};
use petropolis_i18n_mt_web::{AppState, Config, PermissionChecker, app};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::parse();

    let translator = match &config.deepl_api_url {
        Some(url) => DeeplProvider::with_base_url(config.deepl_api_key.clone(), url.clone()),
        None => DeeplProvider::new(config.deepl_api_key.clone()),
    }
    .context("Failed to initialize translator")?;
    info!(endpoint = translator.base_url(), "using DeepL");

    let repository = PostgresRepository::connect(&config.database_url, config.max_connections)
        .await
        .context("Failed to connect to the database")?;

    let permissions = PermissionChecker::from_spec(&config.api_tokens)?;
    if permissions.is_empty() {
        warn!("PETROPOLIS_API_TOKENS is empty; every request will be rejected");
    }

    let allow_list = LayerAllowList::new(&config.layers);
    if allow_list.is_empty() {
        warn!("PETROPOLIS_LAYERS is empty; any table in the database can be translated");
    }

    let translator = Arc::new(translator);
    let bulk = BulkTranslator::new(translator.clone(), Arc::new(repository))
        .with_allow_list(allow_list);

    let state = AppState {
        translator,
        bulk,
        permissions: Arc::new(permissions),
    };

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
