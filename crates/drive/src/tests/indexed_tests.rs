use super::*;

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use crate::{source::RemoteFile, FsSource};

#[derive(Default)]
struct ScriptedSource {
    folders: std::sync::Mutex<HashMap<String, Vec<RemoteFile>>>,
    list_calls: Arc<AtomicUsize>,
    fetch_calls: Arc<AtomicUsize>,
    fail_with: Option<String>,
    delay: Option<Duration>,
}

impl ScriptedSource {
    fn with_folder(self, key: &str, files: Vec<RemoteFile>) -> Self {
        self.folders
            .lock()
            .expect("folders")
            .insert(key.to_string(), files);
        self
    }

    fn replace_folder(&self, key: &str, files: Vec<RemoteFile>) {
        self.folders
            .lock()
            .expect("folders")
            .insert(key.to_string(), files);
    }
}

#[async_trait]
impl Source for ScriptedSource {
    async fn list_folder(&self, key: &str) -> anyhow::Result<Vec<RemoteFile>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = &self.fail_with {
            return Err(anyhow::anyhow!(err.clone()));
        }
        Ok(self
            .folders
            .lock()
            .expect("folders")
            .get(key)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_photo(&self, key: &str) -> anyhow::Result<String> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("cache/{key}"))
    }
}

fn vacation_source() -> ScriptedSource {
    ScriptedSource::default()
        .with_folder("", vec![RemoteFile::folder("vacation", "Vacation")])
        .with_folder(
            "vacation",
            vec![RemoteFile::photo("vacation/beach.jpg", "beach.jpg", "image/jpeg")],
        )
}

#[tokio::test]
async fn lists_each_folder_from_source_once() {
    let source = vacation_source();
    let list_calls = source.list_calls.clone();
    let drive = IndexedDrive::new(source, EntryId(1));

    assert!(!drive.is_fully_loaded(EntryId(1)).await.expect("loaded"));
    let first = drive.children(EntryId(1)).await.expect("children");
    let second = drive.children(EntryId(1)).await.expect("children");

    assert_eq!(first, vec![EntryId(2)]);
    assert_eq!(first, second);
    assert_eq!(list_calls.load(Ordering::SeqCst), 1);
    assert!(drive.is_fully_loaded(EntryId(1)).await.expect("loaded"));
    assert_eq!(drive.name(EntryId(2)).await.expect("name"), "Vacation");
    assert_eq!(drive.parent(EntryId(2)).await.expect("parent"), EntryId(1));
    assert!(drive.is_directory(EntryId(2)).await.expect("kind"));
}

#[tokio::test]
async fn refresh_makes_next_listing_hit_source_again() {
    let source = vacation_source();
    let list_calls = source.list_calls.clone();
    let drive = IndexedDrive::new(source, EntryId(1));

    drive.children(EntryId(1)).await.expect("children");
    drive.source().replace_folder(
        "",
        vec![
            RemoteFile::folder("vacation", "Vacation"),
            RemoteFile::folder("work", "Work"),
        ],
    );
    drive.refresh(EntryId(1)).await.expect("refresh");
    let refreshed = drive.children(EntryId(1)).await.expect("children");

    assert_eq!(list_calls.load(Ordering::SeqCst), 2);
    assert_eq!(refreshed, vec![EntryId(2), EntryId(3)]);
}

#[tokio::test]
async fn photo_path_is_fetched_once() {
    let source = vacation_source();
    let fetch_calls = source.fetch_calls.clone();
    let drive = IndexedDrive::new(source, EntryId(1));

    drive.children(EntryId(1)).await.expect("root");
    let photos = drive.children(EntryId(2)).await.expect("vacation");
    let beach = photos[0];

    assert!(!drive.is_directory(beach).await.expect("kind"));
    assert_eq!(
        drive.photo_path(beach).await.expect("path"),
        "cache/vacation/beach.jpg"
    );
    drive.photo_path(beach).await.expect("cached path");
    assert_eq!(fetch_calls.load(Ordering::SeqCst), 1);
    assert!(drive.is_fully_loaded(beach).await.expect("loaded"));
}

#[tokio::test]
async fn maps_source_failures_and_timeouts_to_drive_errors() {
    let failing = IndexedDrive::new(
        ScriptedSource {
            fail_with: Some("quota exceeded".to_string()),
            ..Default::default()
        },
        EntryId(1),
    );
    let err = failing.children(EntryId(1)).await.expect_err("should fail");
    assert!(matches!(
        err,
        DriveError::Source { id: EntryId(1), ref message } if message.contains("quota exceeded")
    ));
    assert!(!failing.is_fully_loaded(EntryId(1)).await.expect("loaded"));

    let slow = IndexedDrive::new(
        ScriptedSource {
            delay: Some(Duration::from_secs(5)),
            ..Default::default()
        },
        EntryId(1),
    )
    .with_source_timeout(Duration::from_millis(20));
    assert_eq!(
        slow.children(EntryId(1)).await.expect_err("should time out"),
        DriveError::Timeout(EntryId(1))
    );
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let drive = IndexedDrive::new(vacation_source(), EntryId(1));
    assert_eq!(
        drive.is_directory(EntryId(42)).await.expect_err("missing"),
        DriveError::NotFound(EntryId(42))
    );
}

#[tokio::test]
async fn shared_drive_serves_local_folder_tree() {
    let tree = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir(tree.path().join("Album")).expect("folder");
    std::fs::write(tree.path().join("Album").join("cat.jpg"), b"jpg").expect("photo");

    let drive = Arc::new(IndexedDrive::new(FsSource::new(tree.path()), EntryId(1)));
    let album = drive.children(EntryId(1)).await.expect("root")[0];
    let cat = drive.children(album).await.expect("album")[0];

    let path = drive.photo_path(cat).await.expect("path");
    assert!(path.ends_with("cat.jpg"));
    assert_eq!(drive.parent(cat).await.expect("parent"), album);
}
