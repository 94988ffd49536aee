use std::{future::Future, time::Duration};

use async_trait::async_trait;
use shared::{domain::EntryId, error::DriveError};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{index::Index, source::Source, Drive, DriveResult};

pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(30);

/// A [`Drive`] that fetches listings and photos from a [`Source`] on first
/// use and keeps them in an [`Index`] until refreshed.
pub struct IndexedDrive<S> {
    source: S,
    index: Mutex<Index>,
    source_timeout: Duration,
}

impl<S: Source> IndexedDrive<S> {
    pub fn new(source: S, root: EntryId) -> Self {
        Self {
            source,
            index: Mutex::new(Index::new(root)),
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
        }
    }

    pub fn with_source_timeout(mut self, source_timeout: Duration) -> Self {
        self.source_timeout = source_timeout;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    async fn bounded<T, F>(&self, id: EntryId, call: F) -> DriveResult<T>
    where
        F: Future<Output = anyhow::Result<T>> + Send,
    {
        match tokio::time::timeout(self.source_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                warn!(entry = %id, "source call failed: {err:#}");
                Err(DriveError::source_failure(id, format!("{err:#}")))
            }
            Err(_) => {
                let timeout_ms = self.source_timeout.as_millis();
                warn!(entry = %id, timeout_ms, "source call timed out");
                Err(DriveError::Timeout(id))
            }
        }
    }
}

#[async_trait]
impl<S: Source> Drive for IndexedDrive<S> {
    async fn children(&self, id: EntryId) -> DriveResult<Vec<EntryId>> {
        let key = {
            let index = self.index.lock().await;
            if let Some(children) = index.cached_children(id)? {
                return Ok(children.to_vec());
            }
            index.source_key(id)?.to_string()
        };

        debug!(entry = %id, key = %key, "listing folder from source");
        let files = self.bounded(id, self.source.list_folder(&key)).await?;
        self.index.lock().await.set_children(id, files)
    }

    async fn name(&self, id: EntryId) -> DriveResult<String> {
        Ok(self.index.lock().await.name(id)?.to_string())
    }

    async fn parent(&self, id: EntryId) -> DriveResult<EntryId> {
        self.index.lock().await.parent(id)
    }

    async fn is_directory(&self, id: EntryId) -> DriveResult<bool> {
        self.index.lock().await.is_directory(id)
    }

    async fn is_fully_loaded(&self, id: EntryId) -> DriveResult<bool> {
        self.index.lock().await.is_fully_loaded(id)
    }

    async fn refresh(&self, id: EntryId) -> DriveResult<()> {
        debug!(entry = %id, "invalidating cached entry");
        self.index.lock().await.invalidate(id)
    }

    async fn photo_path(&self, id: EntryId) -> DriveResult<String> {
        let key = {
            let index = self.index.lock().await;
            if let Some(path) = index.cached_photo_path(id)? {
                return Ok(path.to_string());
            }
            index.source_key(id)?.to_string()
        };

        debug!(entry = %id, key = %key, "fetching photo from source");
        let path = self.bounded(id, self.source.fetch_photo(&key)).await?;
        self.index.lock().await.set_photo_path(id, path.clone())?;
        Ok(path)
    }
}

#[cfg(test)]
#[path = "tests/indexed_tests.rs"]
mod tests;
