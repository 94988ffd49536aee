use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(EntryId);

impl EntryId {
    /// Well-known id of the drive root when no other home is configured.
    pub const HOME: EntryId = EntryId(1);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntryView {
    pub id: EntryId,
    pub name: String,
    /// Whether the collaborator already holds this child's own contents.
    pub loaded: bool,
}

/// Children of `parent`, in the order the collaborator returned them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryView {
    pub parent: EntryId,
    pub entries: Vec<DirectoryEntryView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoView {
    pub id: EntryId,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ViewModel {
    Directory(DirectoryView),
    Photo(PhotoView),
}

impl ViewModel {
    pub fn entry_id(&self) -> EntryId {
        match self {
            ViewModel::Directory(view) => view.parent,
            ViewModel::Photo(view) => view.id,
        }
    }
}
