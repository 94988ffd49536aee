use std::{
    path::{Path, PathBuf},
    process::Stdio,
};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, trace};

use crate::index::{FOLDER_MIME_TYPE, ROOT_KEY};

/// One listing row as the underlying store describes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub key: String,
    pub name: String,
    pub mime_type: String,
}

impl RemoteFile {
    pub fn folder(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            mime_type: FOLDER_MIME_TYPE.to_string(),
        }
    }

    pub fn photo(
        key: impl Into<String>,
        name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// Raw access to a photo store addressed by opaque string keys.
#[async_trait]
pub trait Source: Send + Sync {
    async fn list_folder(&self, key: &str) -> Result<Vec<RemoteFile>>;
    /// Returns a path the presentation layer can display directly.
    async fn fetch_photo(&self, key: &str) -> Result<String>;
}

pub fn photo_mime_type(extension: &str) -> Option<&'static str> {
    let mime = match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",
        "nef" => NEF_MIME_TYPE,
        _ => return None,
    };
    Some(mime)
}

/// Nikon RAW. Only shown through the JPEG preview embedded in the file.
pub const NEF_MIME_TYPE: &str = "image/x-nikon-nef";

/// Index of the largest JPEG preview exiv2 finds inside a NEF file.
const NEF_PREVIEW: u32 = 3;

/// Pulls embedded JPEG previews out of RAW files with `exiv2` and keeps
/// them under `cache_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPreviews {
    exiv2: PathBuf,
    cache_dir: PathBuf,
}

impl RawPreviews {
    pub fn new(exiv2: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            exiv2: exiv2.into(),
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the absolute path of the preview for the RAW file at `raw`,
    /// running `exiv2` only when no preview is cached for `key` yet.
    async fn preview_for(&self, key: &str, raw: &Path) -> Result<String> {
        let stem = raw
            .file_stem()
            .and_then(|stem| stem.to_str())
            .with_context(|| format!("'{}' has no usable file name", raw.display()))?;
        let dir = self.cache_dir.join(cache_dir_name(key));
        let preview = dir.join(format!("{stem}-preview{NEF_PREVIEW}.jpg"));

        if tokio::fs::metadata(&preview).await.is_err() {
            tokio::fs::create_dir_all(&dir)
                .await
                .with_context(|| format!("failed to create '{}'", dir.display()))?;
            debug!(key, exiv2 = %self.exiv2.display(), "extracting raw preview");
            let output = Command::new(&self.exiv2)
                .arg(format!("-ep{NEF_PREVIEW}"))
                .arg("-l")
                .arg(&dir)
                .arg(raw)
                .stdin(Stdio::null())
                .output()
                .await
                .with_context(|| format!("failed to run '{}'", self.exiv2.display()))?;
            if !output.status.success() {
                bail!(
                    "'{}' failed for '{}' ({}): {}",
                    self.exiv2.display(),
                    raw.display(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                );
            }
        }

        let absolute = tokio::fs::canonicalize(&preview)
            .await
            .with_context(|| format!("no embedded preview in '{}'", raw.display()))?;
        Ok(absolute.to_string_lossy().into_owned())
    }
}

/// One cache folder per key; bytes outside `[A-Za-z0-9._-]` become `%XX`
/// so distinct keys never share a folder.
fn cache_dir_name(key: &str) -> String {
    let mut name = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'-' | b'_') {
            name.push(byte as char);
        } else {
            name.push_str(&format!("%{byte:02X}"));
        }
    }
    name
}

/// Serves a local folder tree. Keys are `/`-separated paths relative to the root.
///
/// NEF files are listed only when [`RawPreviews`] are configured, since the
/// file itself cannot be displayed.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
    raw_previews: Option<RawPreviews>,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            raw_previews: None,
        }
    }

    pub fn with_raw_previews(mut self, raw_previews: RawPreviews) -> Self {
        self.raw_previews = Some(raw_previews);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        if key.split('/').any(|part| part == "..") {
            bail!("key '{key}' escapes the store root");
        }
        if key == ROOT_KEY {
            return Ok(self.root.clone());
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl Source for FsSource {
    async fn list_folder(&self, key: &str) -> Result<Vec<RemoteFile>> {
        let dir = self.resolve(key)?;
        let mut read_dir = tokio::fs::read_dir(&dir)
            .await
            .with_context(|| format!("failed to read folder '{}'", dir.display()))?;

        let mut files = Vec::new();
        while let Some(dir_entry) = read_dir
            .next_entry()
            .await
            .with_context(|| format!("failed to list folder '{}'", dir.display()))?
        {
            let name = dir_entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            let child_key = if key == ROOT_KEY {
                name.clone()
            } else {
                format!("{key}/{name}")
            };

            let file_type = dir_entry.file_type().await?;
            if file_type.is_dir() {
                files.push(RemoteFile::folder(child_key, name));
                continue;
            }

            let mime_type = Path::new(&name)
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(photo_mime_type);
            match mime_type {
                Some(NEF_MIME_TYPE) if self.raw_previews.is_none() => {
                    trace!(file = %child_key, "skipping raw file without a preview extractor")
                }
                Some(mime_type) => files.push(RemoteFile::photo(child_key, name, mime_type)),
                None => trace!(file = %child_key, "skipping non-photo file"),
            }
        }

        files.sort_by_key(|file| file.name.to_lowercase());
        Ok(files)
    }

    async fn fetch_photo(&self, key: &str) -> Result<String> {
        let path = self.resolve(key)?;
        let absolute = tokio::fs::canonicalize(&path)
            .await
            .with_context(|| format!("photo '{}' is not readable", path.display()))?;
        if !tokio::fs::metadata(&absolute).await?.is_file() {
            bail!("'{}' is not a regular file", absolute.display());
        }

        let is_nef = absolute
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(photo_mime_type)
            == Some(NEF_MIME_TYPE);
        if is_nef {
            return match &self.raw_previews {
                Some(previews) => previews.preview_for(key, &absolute).await,
                None => bail!("raw photo '{key}' needs a preview extractor"),
            };
        }
        Ok(absolute.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
#[path = "tests/source_tests.rs"]
mod tests;
