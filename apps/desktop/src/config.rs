use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use drive::{RawPreviews, DEFAULT_SOURCE_TIMEOUT};
use navigator::{HomeParent, NavigatorOptions};
use serde::Deserialize;
use shared::domain::EntryId;

pub const DEFAULT_CONFIG_FILE: &str = "photoman.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub store_root: PathBuf,
    pub home_id: EntryId,
    pub home_parent: HomeParent,
    pub source_timeout: Duration,
    pub log_filter: String,
    pub json_output: bool,
    /// `exiv2` binary used to show NEF files; NEF files are hidden when unset.
    pub exiv2_path: Option<PathBuf>,
    pub preview_cache_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_root: PathBuf::from("."),
            home_id: EntryId::HOME,
            home_parent: HomeParent::Stay,
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
            log_filter: "info".into(),
            json_output: false,
            exiv2_path: None,
            preview_cache_dir: PathBuf::from("cache"),
        }
    }
}

impl Settings {
    pub fn navigator_options(&self) -> NavigatorOptions {
        NavigatorOptions {
            home: self.home_id,
            home_parent: self.home_parent,
        }
    }

    pub fn raw_previews(&self) -> Option<RawPreviews> {
        self.exiv2_path
            .as_ref()
            .map(|exiv2| RawPreviews::new(exiv2, &self.preview_cache_dir))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileSettings {
    store_root: Option<PathBuf>,
    home_id: Option<u32>,
    home_parent: Option<HomeParent>,
    source_timeout_ms: Option<u64>,
    log_filter: Option<String>,
    json_output: Option<bool>,
    exiv2_path: Option<PathBuf>,
    preview_cache_dir: Option<PathBuf>,
}

/// Defaults, then the config file, then environment overrides.
///
/// A missing default config file is fine; a missing explicit one is not.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?,
        Err(err) if config_path.is_none() && err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;

    if let Some(v) = file_cfg.store_root {
        settings.store_root = v;
    }
    if let Some(v) = file_cfg.home_id {
        settings.home_id = EntryId(v);
    }
    if let Some(v) = file_cfg.home_parent {
        settings.home_parent = v;
    }
    if let Some(v) = file_cfg.source_timeout_ms {
        settings.source_timeout = Duration::from_millis(v);
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
    if let Some(v) = file_cfg.json_output {
        settings.json_output = v;
    }
    if let Some(v) = file_cfg.exiv2_path {
        settings.exiv2_path = Some(v);
    }
    if let Some(v) = file_cfg.preview_cache_dir {
        settings.preview_cache_dir = v;
    }
    Ok(())
}

/// Unparseable values are ignored and the previous value kept.
fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("PHOTOMAN_STORE_ROOT") {
        settings.store_root = PathBuf::from(v);
    }
    if let Some(v) = lookup("APP__STORE_ROOT") {
        settings.store_root = PathBuf::from(v);
    }

    if let Some(v) = lookup("APP__HOME_ID") {
        if let Ok(parsed) = v.trim().parse::<u32>() {
            settings.home_id = EntryId(parsed);
        }
    }

    if let Some(v) = lookup("APP__HOME_PARENT") {
        if let Ok(parsed) = v.parse::<HomeParent>() {
            settings.home_parent = parsed;
        }
    }

    if let Some(v) = lookup("APP__SOURCE_TIMEOUT_MS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.source_timeout = Duration::from_millis(parsed);
        }
    }

    if let Some(v) = lookup("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    if let Some(v) = lookup("APP__EXIV2_PATH") {
        if !v.trim().is_empty() {
            settings.exiv2_path = Some(PathBuf::from(v));
        }
    }
    if let Some(v) = lookup("APP__PREVIEW_CACHE_DIR") {
        if !v.trim().is_empty() {
            settings.preview_cache_dir = PathBuf::from(v);
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
