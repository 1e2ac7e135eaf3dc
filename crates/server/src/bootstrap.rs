use std::sync::Arc;

use cropwise_core::config::{AppConfig, ConfigError, LoadOptions};
use cropwise_core::journey::{FarmingJourney, PlanStore};
use cropwise_core::ml::store::{ArtifactStoreError, ModelSet};
use cropwise_core::providers::AdviceProvider;
use cropwise_db::{connect_with_settings, migrations, DbPool, SqlModelArtifactRepository};
use cropwise_providers::{HttpAdviceProvider, HttpMarketProvider, HttpWeatherProvider};
use thiserror::Error;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub journey: Arc<FarmingJourney>,
    pub advice: Arc<dyn AdviceProvider>,
    pub plans: Arc<PlanStore>,
    pub db_pool: DbPool,
    pub model_version: String,
}

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("http client construction failed: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error(transparent)]
    ModelInit(#[from] ArtifactStoreError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let artifact_store = SqlModelArtifactRepository::new(db_pool.clone());
    let models = Arc::new(ModelSet::load_or_train(&artifact_store).await?);
    let model_version = models.classifier.version.clone();
    info!(
        event_name = "system.bootstrap.models_ready",
        correlation_id = "bootstrap",
        model_version = %model_version,
        "model artifacts ready"
    );

    let weather = Arc::new(
        HttpWeatherProvider::from_config(&config.weather).map_err(BootstrapError::HttpClient)?,
    );
    let market = Arc::new(
        HttpMarketProvider::from_config(&config.market).map_err(BootstrapError::HttpClient)?,
    );
    let advice: Arc<dyn AdviceProvider> = Arc::new(
        HttpAdviceProvider::from_config(&config.advice).map_err(BootstrapError::HttpClient)?,
    );

    let plans = Arc::new(PlanStore::new());
    let journey = Arc::new(FarmingJourney::new(
        models,
        weather,
        market,
        advice.clone(),
        plans.clone(),
    ));

    Ok(Application {
        config,
        state: AppState { journey, advice, plans, db_pool, model_version },
    })
}
