use crate::model::SourceError;

#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetches the raw catalog text.
    async fn load(&self) -> Result<String, SourceError>;

    /// Human-readable origin, used in logs and snapshots.
    fn describe(&self) -> String;
}
