use std::collections::HashMap;

use shared::{domain::EntryId, error::DriveError};

use crate::{source::RemoteFile, DriveResult};

pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Key every source uses for its top-level folder.
pub const ROOT_KEY: &str = "";

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    key: String,
    mime_type: String,
    parent: EntryId,
    is_directory: bool,
    children: Option<Vec<EntryId>>,
    photo_path: Option<String>,
}

impl Entry {
    fn new(name: String, key: String, mime_type: String, parent: EntryId) -> Self {
        let is_directory = mime_type == FOLDER_MIME_TYPE;
        Self {
            name,
            key,
            mime_type,
            parent,
            is_directory,
            children: None,
            photo_path: None,
        }
    }
}

/// Compresses source keys into small integer ids and remembers what has
/// already been fetched for each entry.
#[derive(Debug)]
pub struct Index {
    root: EntryId,
    compressed_ids: HashMap<String, EntryId>,
    entries: HashMap<EntryId, Entry>,
    /// `None` once the id space above the root is used up.
    next_id: Option<u32>,
}

impl Index {
    /// Creates an index whose root folder is `root`. The root is its own parent.
    /// Children get ids counting up from `root + 1`.
    pub fn new(root: EntryId) -> Self {
        let mut index = Self {
            root,
            compressed_ids: HashMap::new(),
            entries: HashMap::new(),
            next_id: root.0.checked_add(1),
        };
        index.compressed_ids.insert(ROOT_KEY.to_string(), root);
        index.entries.insert(
            root,
            Entry::new(
                "root".to_string(),
                ROOT_KEY.to_string(),
                FOLDER_MIME_TYPE.to_string(),
                root,
            ),
        );
        index
    }

    pub fn root(&self) -> EntryId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, id: EntryId) -> DriveResult<&Entry> {
        self.entries.get(&id).ok_or(DriveError::NotFound(id))
    }

    fn entry_mut(&mut self, id: EntryId) -> DriveResult<&mut Entry> {
        self.entries.get_mut(&id).ok_or(DriveError::NotFound(id))
    }

    fn directory_mut(&mut self, id: EntryId) -> DriveResult<&mut Entry> {
        let entry = self.entry_mut(id)?;
        if !entry.is_directory {
            return Err(DriveError::NotADirectory(id));
        }
        Ok(entry)
    }

    /// Records `file` as a child of `parent`, re-using the id of a key that
    /// was already seen. A child is listed at most once per parent.
    ///
    /// Fails with [`DriveError::IdsExhausted`] when a new key arrives and no
    /// id is left to give it.
    pub fn insert_child(&mut self, parent: EntryId, file: RemoteFile) -> DriveResult<EntryId> {
        self.directory_mut(parent)?;

        let child_id = match self.compressed_ids.get(&file.key) {
            Some(&id) => id,
            None => {
                let raw = self.next_id.ok_or(DriveError::IdsExhausted(parent))?;
                let id = EntryId(raw);
                self.next_id = raw.checked_add(1);
                self.compressed_ids.insert(file.key.clone(), id);
                self.entries
                    .insert(id, Entry::new(file.name, file.key, file.mime_type, parent));
                id
            }
        };

        let entry = self.directory_mut(parent)?;
        let children = entry.children.get_or_insert_with(Vec::new);
        if !children.contains(&child_id) {
            children.push(child_id);
        }
        Ok(child_id)
    }

    /// Replaces the known listing of `parent` with `files`, in order.
    pub fn set_children(
        &mut self,
        parent: EntryId,
        files: Vec<RemoteFile>,
    ) -> DriveResult<Vec<EntryId>> {
        self.directory_mut(parent)?.children = Some(Vec::new());
        for file in files {
            self.insert_child(parent, file)?;
        }
        Ok(self.cached_children(parent)?.unwrap_or_default().to_vec())
    }

    /// `None` until the listing of `id` has been loaded.
    pub fn cached_children(&self, id: EntryId) -> DriveResult<Option<&[EntryId]>> {
        let entry = self.entry(id)?;
        if !entry.is_directory {
            return Err(DriveError::NotADirectory(id));
        }
        Ok(entry.children.as_deref())
    }

    pub fn set_photo_path(&mut self, id: EntryId, path: impl Into<String>) -> DriveResult<()> {
        let entry = self.entry_mut(id)?;
        if entry.is_directory {
            return Err(DriveError::NotAPhoto(id));
        }
        entry.photo_path = Some(path.into());
        Ok(())
    }

    pub fn cached_photo_path(&self, id: EntryId) -> DriveResult<Option<&str>> {
        let entry = self.entry(id)?;
        if entry.is_directory {
            return Err(DriveError::NotAPhoto(id));
        }
        Ok(entry.photo_path.as_deref())
    }

    /// Forgets what was fetched for `id`: a directory's listing or a photo's
    /// local path. Ids already handed out stay valid.
    pub fn invalidate(&mut self, id: EntryId) -> DriveResult<()> {
        let entry = self.entry_mut(id)?;
        if entry.is_directory {
            entry.children = None;
        } else {
            entry.photo_path = None;
        }
        Ok(())
    }

    pub fn is_fully_loaded(&self, id: EntryId) -> DriveResult<bool> {
        let entry = self.entry(id)?;
        Ok(if entry.is_directory {
            entry.children.is_some()
        } else {
            entry.photo_path.is_some()
        })
    }

    pub fn name(&self, id: EntryId) -> DriveResult<&str> {
        Ok(&self.entry(id)?.name)
    }

    pub fn parent(&self, id: EntryId) -> DriveResult<EntryId> {
        Ok(self.entry(id)?.parent)
    }

    pub fn is_directory(&self, id: EntryId) -> DriveResult<bool> {
        Ok(self.entry(id)?.is_directory)
    }

    pub fn source_key(&self, id: EntryId) -> DriveResult<&str> {
        Ok(&self.entry(id)?.key)
    }

    pub fn mime_type(&self, id: EntryId) -> DriveResult<&str> {
        Ok(&self.entry(id)?.mime_type)
    }
}

#[cfg(test)]
#[path = "tests/index_tests.rs"]
mod tests;
