use std::collections::HashMap;

use async_trait::async_trait;
use cropwise_core::ml::store::{ArtifactStoreError, ModelArtifactStore};
use tokio::sync::RwLock;

/// In-memory artifact store for tests and ephemeral deployments.
#[derive(Default)]
pub struct InMemoryModelArtifactRepository {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryModelArtifactRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ModelArtifactStore for InMemoryModelArtifactRepository {
    async fn load(&self, name: &str) -> Result<Option<String>, ArtifactStoreError> {
        Ok(self.entries.read().await.get(name).cloned())
    }

    async fn save(&self, name: &str, payload: &str) -> Result<(), ArtifactStoreError> {
        self.entries.write().await.insert(name.to_owned(), payload.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use cropwise_core::ml::store::ModelArtifactStore;

    use super::InMemoryModelArtifactRepository;

    #[tokio::test]
    async fn stores_and_replaces_payloads_by_name() {
        let repository = InMemoryModelArtifactRepository::new();

        assert!(repository.load("crop_classifier").await.expect("load").is_none());

        repository.save("crop_classifier", "one").await.expect("save");
        repository.save("crop_classifier", "two").await.expect("overwrite");

        let loaded = repository.load("crop_classifier").await.expect("load");
        assert_eq!(loaded.as_deref(), Some("two"));
    }
}
