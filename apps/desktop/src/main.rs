use std::{io, path::PathBuf};

use anyhow::{anyhow, Result};
use clap::Parser;
use crossbeam_channel::bounded;
use navigator::HomeParent;
use shared::domain::EntryId;
use tracing::info;

mod backend_bridge;
mod config;
mod controller;
mod ui;

use backend_bridge::{commands::BackendCommand, runtime};
use config::{load_settings, Settings};
use controller::events::UiEvent;

const COMMAND_QUEUE_CAPACITY: usize = 64;
const UI_EVENT_CAPACITY: usize = 256;

/// Browse a folder-organized photo store one step at a time.
#[derive(Parser, Debug)]
#[command(name = "photoman", version)]
struct Args {
    /// Folder to browse; overrides the config file and environment.
    #[arg(long)]
    store_root: Option<PathBuf>,
    #[arg(long)]
    home_id: Option<u32>,
    /// Behavior of `back` at home: stay, or ask the store for a parent.
    #[arg(long)]
    home_parent: Option<HomeParent>,
    /// `exiv2` binary used to show embedded previews of NEF files.
    #[arg(long)]
    exiv2: Option<PathBuf>,
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print events as JSON lines.
    #[arg(long)]
    json: bool,
}

impl Args {
    fn apply(self, settings: &mut Settings) {
        if let Some(v) = self.store_root {
            settings.store_root = v;
        }
        if let Some(v) = self.home_id {
            settings.home_id = EntryId(v);
        }
        if let Some(v) = self.home_parent {
            settings.home_parent = v;
        }
        if let Some(v) = self.exiv2 {
            settings.exiv2_path = Some(v);
        }
        if self.json {
            settings.json_output = true;
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref())?;
    args.apply(&mut settings);

    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .with_writer(io::stderr)
        .init();
    info!(
        store_root = %settings.store_root.display(),
        home = %settings.home_id,
        home_parent = %settings.home_parent,
        "starting photo browser"
    );

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(COMMAND_QUEUE_CAPACITY);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(UI_EVENT_CAPACITY);
    let printer = ui::spawn_printer(ui_rx, settings.json_output);
    let worker = runtime::launch(settings, cmd_rx, ui_tx);

    ui::run_prompt(io::stdin().lock(), io::stderr(), &cmd_tx)?;
    drop(cmd_tx);

    worker
        .join()
        .map_err(|_| anyhow!("navigation worker panicked"))?;
    printer
        .join()
        .map_err(|_| anyhow!("event printer panicked"))?;
    info!("photo browser closed");
    Ok(())
}
