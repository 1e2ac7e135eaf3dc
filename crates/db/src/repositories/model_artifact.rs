use async_trait::async_trait;
use chrono::Utc;
use cropwise_core::ml::store::{ArtifactStoreError, ModelArtifactStore};
use sqlx::Row;

use crate::DbPool;

/// Model artifacts persisted in the `model_artifact` table, one JSON
/// payload per stable artifact name.
pub struct SqlModelArtifactRepository {
    pool: DbPool,
}

impl SqlModelArtifactRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ModelArtifactStore for SqlModelArtifactRepository {
    async fn load(&self, name: &str) -> Result<Option<String>, ArtifactStoreError> {
        let row = sqlx::query("SELECT payload FROM model_artifact WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| ArtifactStoreError::Storage(error.to_string()))?;

        Ok(row.map(|row| row.get::<String, _>("payload")))
    }

    async fn save(&self, name: &str, payload: &str) -> Result<(), ArtifactStoreError> {
        sqlx::query(
            "INSERT INTO model_artifact (name, payload, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(name) DO UPDATE SET payload = excluded.payload,
                                             updated_at = excluded.updated_at",
        )
        .bind(name)
        .bind(payload)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|error| ArtifactStoreError::Storage(error.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use cropwise_core::ml::store::{artifacts, ModelArtifactStore, ModelSet};

    use super::SqlModelArtifactRepository;
    use crate::{connect_with_settings, migrations};

    async fn repository() -> SqlModelArtifactRepository {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");
        SqlModelArtifactRepository::new(pool)
    }

    #[tokio::test]
    async fn missing_artifacts_load_as_none() {
        let repository = repository().await;
        let loaded = repository.load(artifacts::CROP_CLASSIFIER).await.expect("load");
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn save_then_load_round_trips_the_payload() {
        let repository = repository().await;

        repository.save("soil_encoder", r#"{"soil":{"classes":[]}}"#).await.expect("save");
        let loaded = repository.load("soil_encoder").await.expect("load");

        assert_eq!(loaded.as_deref(), Some(r#"{"soil":{"classes":[]}}"#));
    }

    #[tokio::test]
    async fn saving_twice_overwrites_the_previous_payload() {
        let repository = repository().await;

        repository.save("price_forecaster", "first").await.expect("first save");
        repository.save("price_forecaster", "second").await.expect("second save");

        let loaded = repository.load("price_forecaster").await.expect("load");
        assert_eq!(loaded.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn model_set_loads_identically_after_persisting() {
        let repository = repository().await;
        let trained = ModelSet::load_or_train(&repository).await.expect("train");
        let reloaded = ModelSet::load_or_train(&repository).await.expect("reload");

        let probe = vec![1.0, 6.5, 800.0, 28.0, 70.0, 50.0, 30.0, 40.0, 50_000.0, 2.0];
        assert_eq!(
            trained.classifier.predict_proba(&probe),
            reloaded.classifier.predict_proba(&probe)
        );
        assert_eq!(trained.regressor.predict(9, 2025), reloaded.regressor.predict(9, 2025));
    }
}
