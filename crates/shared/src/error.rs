use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::EntryId;

/// Failure reported by a drive collaborator for a single lookup or mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "code", content = "detail", rename_all = "snake_case")]
pub enum DriveError {
    #[error("entry {0} does not exist")]
    NotFound(EntryId),
    #[error("entry {0} is not a directory")]
    NotADirectory(EntryId),
    #[error("entry {0} is not a photo")]
    NotAPhoto(EntryId),
    #[error("source failure for entry {id}: {message}")]
    Source { id: EntryId, message: String },
    #[error("source timed out for entry {0}")]
    Timeout(EntryId),
    /// No id is left to name a new child of this folder.
    #[error("no entry ids left for the children of entry {0}")]
    IdsExhausted(EntryId),
}

impl DriveError {
    pub fn source_failure(id: EntryId, message: impl Into<String>) -> Self {
        Self::Source {
            id,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("failed to resolve entry {id}: {cause}")]
pub struct ResolutionError {
    pub id: EntryId,
    #[source]
    pub cause: DriveError,
}

impl ResolutionError {
    pub fn new(id: EntryId, cause: DriveError) -> Self {
        Self { id, cause }
    }
}
