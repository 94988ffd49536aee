//! Drive collaborator seam and a lazily indexed reference implementation.

use std::sync::Arc;

use async_trait::async_trait;
use shared::{domain::EntryId, error::DriveError};

mod index;
mod indexed;
mod source;

pub use index::{Index, FOLDER_MIME_TYPE, ROOT_KEY};
pub use indexed::{IndexedDrive, DEFAULT_SOURCE_TIMEOUT};
pub use source::{photo_mime_type, FsSource, RawPreviews, RemoteFile, Source, NEF_MIME_TYPE};

pub type DriveResult<T> = Result<T, DriveError>;

/// Lookups and mutations against a photo store, keyed by entry id.
///
/// Every call may hit remote I/O. Implementations decide their own caching;
/// `refresh` must make the next `children` call observe the store again.
#[async_trait]
pub trait Drive: Send + Sync {
    async fn children(&self, id: EntryId) -> DriveResult<Vec<EntryId>>;
    async fn name(&self, id: EntryId) -> DriveResult<String>;
    async fn parent(&self, id: EntryId) -> DriveResult<EntryId>;
    async fn is_directory(&self, id: EntryId) -> DriveResult<bool>;
    async fn is_fully_loaded(&self, id: EntryId) -> DriveResult<bool>;
    async fn refresh(&self, id: EntryId) -> DriveResult<()>;
    async fn photo_path(&self, id: EntryId) -> DriveResult<String>;
}

#[async_trait]
impl<D: Drive + ?Sized> Drive for Arc<D> {
    async fn children(&self, id: EntryId) -> DriveResult<Vec<EntryId>> {
        (**self).children(id).await
    }

    async fn name(&self, id: EntryId) -> DriveResult<String> {
        (**self).name(id).await
    }

    async fn parent(&self, id: EntryId) -> DriveResult<EntryId> {
        (**self).parent(id).await
    }

    async fn is_directory(&self, id: EntryId) -> DriveResult<bool> {
        (**self).is_directory(id).await
    }

    async fn is_fully_loaded(&self, id: EntryId) -> DriveResult<bool> {
        (**self).is_fully_loaded(id).await
    }

    async fn refresh(&self, id: EntryId) -> DriveResult<()> {
        (**self).refresh(id).await
    }

    async fn photo_path(&self, id: EntryId) -> DriveResult<String> {
        (**self).photo_path(id).await
    }
}
