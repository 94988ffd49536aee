use super::*;

use std::fs;

fn sample_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir(dir.path().join("Vacation")).expect("folder");
    fs::write(dir.path().join("Vacation").join("beach.PNG"), b"png").expect("photo");
    fs::write(dir.path().join("b.jpg"), b"jpg").expect("photo");
    fs::write(dir.path().join("notes.txt"), b"text").expect("text");
    fs::write(dir.path().join(".hidden.jpg"), b"jpg").expect("hidden");
    dir
}

#[test]
fn classifies_photo_extensions_case_insensitively() {
    assert_eq!(photo_mime_type("JPG"), Some("image/jpeg"));
    assert_eq!(photo_mime_type("NEF"), Some(NEF_MIME_TYPE));
    assert_eq!(photo_mime_type("txt"), None);
}

#[test]
fn raw_formats_without_a_preview_step_are_not_photos() {
    for ext in ["cr2", "arw", "dng"] {
        assert_eq!(photo_mime_type(ext), None, "{ext}");
    }
}

#[test]
fn cache_folder_names_keep_keys_apart() {
    assert_eq!(cache_dir_name("Trip/dsc_01.NEF"), "Trip%2Fdsc_01.NEF");
    assert_ne!(cache_dir_name("a/b"), cache_dir_name("a_b"));
    assert_ne!(cache_dir_name("a/b"), cache_dir_name("a%2Fb"));
}

#[tokio::test]
async fn lists_folders_and_photos_sorted_by_name() {
    let tree = sample_tree();
    let source = FsSource::new(tree.path());

    let files = source.list_folder(ROOT_KEY).await.expect("list root");
    assert_eq!(
        files,
        vec![
            RemoteFile::photo("b.jpg", "b.jpg", "image/jpeg"),
            RemoteFile::folder("Vacation", "Vacation"),
        ]
    );

    let nested = source.list_folder("Vacation").await.expect("list nested");
    assert_eq!(
        nested,
        vec![RemoteFile::photo("Vacation/beach.PNG", "beach.PNG", "image/png")]
    );
}

#[tokio::test]
async fn fetch_photo_returns_absolute_path() {
    let tree = sample_tree();
    let source = FsSource::new(tree.path());

    let path = source.fetch_photo("Vacation/beach.PNG").await.expect("fetch");
    assert!(Path::new(&path).is_absolute());
    assert!(path.ends_with("beach.PNG"));
}

#[tokio::test]
async fn rejects_missing_entries_and_parent_traversal() {
    let tree = sample_tree();
    let source = FsSource::new(tree.path());

    assert!(source.list_folder("missing").await.is_err());
    assert!(source.fetch_photo("Vacation").await.is_err());
    assert!(source.list_folder("../").await.is_err());
}

#[tokio::test]
async fn raw_files_are_skipped_without_a_preview_extractor() {
    let tree = sample_tree();
    fs::write(tree.path().join("dsc_01.nef"), b"raw").expect("raw");
    let source = FsSource::new(tree.path());

    let files = source.list_folder(ROOT_KEY).await.expect("list root");
    assert!(files.iter().all(|file| file.mime_type != NEF_MIME_TYPE));

    let err = source.fetch_photo("dsc_01.nef").await.expect_err("no extractor");
    assert!(err.to_string().contains("preview extractor"));
}

/// Stands in for `exiv2 -ep3 -l <dir> <file>`: writes `<dir>/<stem>-preview3.jpg`
/// and appends one line to `calls.log` next to itself.
#[cfg(unix)]
fn fake_exiv2(dir: &Path, exit_code: i32) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("exiv2");
    let log = dir.join("calls.log");
    fs::write(
        &script,
        format!(
            "#!/bin/sh\n\
             echo \"$@\" >> '{log}'\n\
             [ {exit_code} -eq 0 ] || {{ echo 'no preview' >&2; exit {exit_code}; }}\n\
             name=$(basename \"$4\")\n\
             printf jpg > \"$3/${{name%.*}}-preview3.jpg\"\n",
            log = log.display(),
        ),
    )
    .expect("script");
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).expect("chmod");
    script
}

#[cfg(unix)]
#[tokio::test]
async fn raw_photo_resolves_to_extracted_preview_once() {
    let tree = sample_tree();
    fs::create_dir(tree.path().join("Trip")).expect("folder");
    fs::write(tree.path().join("Trip").join("dsc_01.NEF"), b"raw").expect("raw");
    let tools = tempfile::tempdir().expect("tools");
    let exiv2 = fake_exiv2(tools.path(), 0);
    let cache = tools.path().join("cache");
    let source = FsSource::new(tree.path()).with_raw_previews(RawPreviews::new(&exiv2, &cache));

    let files = source.list_folder("Trip").await.expect("list");
    assert_eq!(
        files,
        vec![RemoteFile::photo("Trip/dsc_01.NEF", "dsc_01.NEF", NEF_MIME_TYPE)]
    );

    let path = source.fetch_photo("Trip/dsc_01.NEF").await.expect("preview");
    assert!(Path::new(&path).is_absolute());
    assert!(path.ends_with("dsc_01-preview3.jpg"));
    assert_eq!(fs::read(&path).expect("preview bytes"), b"jpg");

    let again = source.fetch_photo("Trip/dsc_01.NEF").await.expect("cached");
    assert_eq!(again, path);
    let calls = fs::read_to_string(tools.path().join("calls.log")).expect("log");
    assert_eq!(calls.lines().count(), 1);
    assert!(calls.starts_with("-ep3 -l "));
}

#[cfg(unix)]
#[tokio::test]
async fn failed_extraction_is_reported_with_tool_output() {
    let tree = sample_tree();
    fs::write(tree.path().join("dsc_02.nef"), b"raw").expect("raw");
    let tools = tempfile::tempdir().expect("tools");
    let exiv2 = fake_exiv2(tools.path(), 2);
    let source = FsSource::new(tree.path())
        .with_raw_previews(RawPreviews::new(&exiv2, tools.path().join("cache")));

    let err = source.fetch_photo("dsc_02.nef").await.expect_err("extraction fails");
    assert!(format!("{err:#}").contains("no preview"));

    let missing = FsSource::new(tree.path()).with_raw_previews(RawPreviews::new(
        tools.path().join("not-installed"),
        tools.path().join("cache"),
    ));
    assert!(missing.fetch_photo("dsc_02.nef").await.is_err());
}
