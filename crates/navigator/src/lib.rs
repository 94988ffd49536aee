//! Per-window navigation state: where the user is, and what to show next.

use std::{fmt, str::FromStr};

use drive::Drive;
use serde::{Deserialize, Serialize};
use shared::{
    domain::{DirectoryEntryView, DirectoryView, EntryId, PhotoView, ViewModel},
    error::{DriveError, ResolutionError},
};
use tracing::{debug, warn};

mod session;

pub use session::Session;

/// What `go_back` does while the home entry is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HomeParent {
    /// Stay at home and re-list it without asking the drive.
    #[default]
    Stay,
    /// Ask the drive for the parent of home and follow it.
    Delegate,
}

impl FromStr for HomeParent {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stay" => Ok(Self::Stay),
            "delegate" => Ok(Self::Delegate),
            other => Err(format!(
                "unknown home parent policy '{other}' (expected 'stay' or 'delegate')"
            )),
        }
    }
}

impl fmt::Display for HomeParent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stay => f.write_str("stay"),
            Self::Delegate => f.write_str("delegate"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigatorOptions {
    pub home: EntryId,
    pub home_parent: HomeParent,
}

impl Default for NavigatorOptions {
    fn default() -> Self {
        Self {
            home: EntryId::HOME,
            home_parent: HomeParent::default(),
        }
    }
}

fn resolution(id: EntryId) -> impl FnOnce(DriveError) -> ResolutionError {
    move |cause| ResolutionError::new(id, cause)
}

/// Owns `current` for one session and mediates every drive call made on its
/// behalf.
///
/// `current` is updated before the drive is consulted and is never rolled
/// back, so after a failed operation it names the entry that failed.
pub struct NavigationController<D> {
    drive: D,
    current: EntryId,
    options: NavigatorOptions,
}

impl<D: Drive> NavigationController<D> {
    pub fn new(drive: D, options: NavigatorOptions) -> Self {
        Self {
            drive,
            current: options.home,
            options,
        }
    }

    pub fn current(&self) -> EntryId {
        self.current
    }

    pub fn home(&self) -> EntryId {
        self.options.home
    }

    pub fn options(&self) -> NavigatorOptions {
        self.options
    }

    pub fn drive(&self) -> &D {
        &self.drive
    }

    pub async fn enter(&mut self, target: EntryId) -> Result<ViewModel, ResolutionError> {
        self.current = target;
        let is_directory = self
            .drive
            .is_directory(target)
            .await
            .map_err(resolution(target))?;

        if is_directory {
            debug!(entry = %target, "entered directory");
            return Ok(ViewModel::Directory(self.list_current().await?));
        }

        let path = self
            .drive
            .photo_path(target)
            .await
            .map_err(resolution(target))?;
        debug!(entry = %target, path = %path, "entered photo");
        Ok(ViewModel::Photo(PhotoView { id: target, path }))
    }

    pub async fn go_back(&mut self) -> Result<DirectoryView, ResolutionError> {
        let from = self.current;
        if from == self.options.home && self.options.home_parent == HomeParent::Stay {
            debug!(entry = %from, "already home; re-listing");
            return self.list_current().await;
        }

        self.current = self.drive.parent(from).await.map_err(resolution(from))?;
        debug!(from = %from, to = %self.current, "moved to parent");
        self.list_current().await
    }

    pub async fn go_home(&mut self) -> Result<DirectoryView, ResolutionError> {
        self.current = self.options.home;
        self.list_current().await
    }

    /// Re-lists the current directory after asking the drive to drop its
    /// cached state. Returns `None`, and touches nothing, while a photo is
    /// current.
    pub async fn refresh_current(&mut self) -> Result<Option<DirectoryView>, ResolutionError> {
        let current = self.current;
        let is_directory = self
            .drive
            .is_directory(current)
            .await
            .map_err(resolution(current))?;
        if !is_directory {
            debug!(entry = %current, "refresh ignored for photo");
            return Ok(None);
        }

        self.drive
            .refresh(current)
            .await
            .map_err(resolution(current))?;
        self.list_current().await.map(Some)
    }

    /// Pairs each child of `current` with its name and loaded flag, in the
    /// order the drive returned them.
    ///
    /// Any failure is reported against the folder being listed; the cause
    /// names the child whose lookup failed.
    pub async fn list_current(&self) -> Result<DirectoryView, ResolutionError> {
        let parent = self.current;
        let children = self
            .drive
            .children(parent)
            .await
            .map_err(resolution(parent))?;

        let mut entries = Vec::with_capacity(children.len());
        for id in children {
            let child = async {
                let name = self.drive.name(id).await?;
                let loaded = self.drive.is_fully_loaded(id).await?;
                Ok::<_, DriveError>(DirectoryEntryView { id, name, loaded })
            };
            match child.await {
                Ok(entry) => entries.push(entry),
                Err(cause) => {
                    warn!(listing = %parent, entry = %id, "child lookup failed: {cause}");
                    return Err(ResolutionError::new(parent, cause));
                }
            }
        }

        Ok(DirectoryView { parent, entries })
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
