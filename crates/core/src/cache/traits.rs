use async_trait::async_trait;

use crate::dataset::{DatasetItem, DatasetKey};

use super::Result;

/// Authoritative reload operation for one dataset.
///
/// A loader only reads from the data-access layer and returns a fresh
/// sequence; it never writes to the cache itself.
#[async_trait]
pub trait Loader: Send + Sync {
    /// The dataset this loader produces.
    fn dataset(&self) -> DatasetKey;

    /// Re-fetches the full dataset.
    async fn load(&self) -> Result<Vec<DatasetItem>>;
}
