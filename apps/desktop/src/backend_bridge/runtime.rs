//! Runtime bridge between UI command queue and the navigation session.
//!
//! The worker owns one session on a single-threaded tokio runtime and handles
//! commands strictly in arrival order, so the event for an intent is always
//! sent before anything caused by a later intent.

use std::thread;

use anyhow::{bail, Context};
use crossbeam_channel::{Receiver, Sender};
use drive::{Drive, FsSource, IndexedDrive};
use navigator::{NavigatorOptions, Session};
use tracing::{debug, error, info};

use crate::backend_bridge::commands::BackendCommand;
use crate::config::Settings;
use crate::controller::events::UiEvent;

pub fn launch(
    settings: Settings,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> thread::JoinHandle<()> {
    let options = settings.navigator_options();
    launch_with(move || open_store(&settings), options, cmd_rx, ui_tx)
}

fn open_store(settings: &Settings) -> anyhow::Result<IndexedDrive<FsSource>> {
    let root = &settings.store_root;
    let metadata = std::fs::metadata(root)
        .with_context(|| format!("photo store '{}' is not accessible", root.display()))?;
    if !metadata.is_dir() {
        bail!("photo store '{}' is not a folder", root.display());
    }

    let mut source = FsSource::new(root);
    if let Some(previews) = settings.raw_previews() {
        info!(cache_dir = %previews.cache_dir().display(), "raw previews enabled");
        source = source.with_raw_previews(previews);
    }

    info!(store_root = %root.display(), home = %settings.home_id, "opened photo store");
    Ok(IndexedDrive::new(source, settings.home_id).with_source_timeout(settings.source_timeout))
}

pub fn launch_with<D, F>(
    open_drive: F,
    options: NavigatorOptions,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> thread::JoinHandle<()>
where
    D: Drive + 'static,
    F: FnOnce() -> anyhow::Result<D> + Send + 'static,
{
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                error!("failed to build navigation runtime: {err}");
                let _ = ui_tx.send(UiEvent::Error(format!(
                    "navigation worker startup failure: failed to build runtime: {err}"
                )));
                return;
            }
        };

        runtime.block_on(async move {
            let drive = match open_drive() {
                Ok(drive) => drive,
                Err(err) => {
                    error!("failed to open photo store: {err:#}");
                    let _ = ui_tx.send(UiEvent::Error(format!(
                        "navigation worker startup failure: {err:#}"
                    )));
                    return;
                }
            };

            let mut session = Session::new(drive, options);
            let _ = ui_tx.send(UiEvent::Info("Navigation worker ready".to_string()));
            if ui_tx.send(session.start().await.into()).is_err() {
                return;
            }

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::Navigate(intent) => {
                        let Some(event) = session.dispatch(intent).await else {
                            continue;
                        };
                        if ui_tx.send(event.into()).is_err() {
                            debug!("ui event receiver dropped; stopping navigation worker");
                            break;
                        }
                    }
                    BackendCommand::Shutdown => {
                        debug!("navigation worker shutting down");
                        break;
                    }
                }
            }
        });
    })
}

#[cfg(test)]
#[path = "../tests/runtime_tests.rs"]
mod tests;
