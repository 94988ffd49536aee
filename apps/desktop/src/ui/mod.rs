//! Terminal presentation layer: reads navigation commands, prints views.

use std::{
    io::{self, BufRead, Write},
    thread,
};

use crossbeam_channel::{Receiver, Sender};
use shared::domain::{DirectoryView, PhotoView, ViewModel};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{UiErrorCategory, UiEvent},
    orchestration::{dispatch_backend_command, parse_input, UserInput, USAGE},
};

pub fn render_event(event: &UiEvent) -> String {
    match event {
        UiEvent::Info(message) => format!("-- {message}"),
        UiEvent::View(ViewModel::Directory(view)) => render_directory(view),
        UiEvent::View(ViewModel::Photo(view)) => render_photo(view),
        UiEvent::NavigationFailed { intent, error } => {
            let category = UiErrorCategory::classify(error);
            format!(
                "!! {} failed: {error}\n!! {}",
                intent.name(),
                category.hint()
            )
        }
        UiEvent::Error(message) => format!("!! {message}"),
    }
}

fn render_directory(view: &DirectoryView) -> String {
    let mut out = format!("== folder {} ({} entries)", view.parent, view.entries.len());
    for entry in &view.entries {
        let marker = if entry.loaded { '*' } else { ' ' };
        out.push_str(&format!("\n{:>6} {marker} {}", entry.id.0, entry.name));
    }
    out
}

fn render_photo(view: &PhotoView) -> String {
    format!("== photo {}\n{}", view.id, view.path)
}

pub fn render_json(event: &UiEvent) -> String {
    serde_json::to_string(event).unwrap_or_else(|err| json_error(&err.to_string()))
}

/// An `error` event line, shaped like a serialized [`UiEvent::Error`].
fn json_error(message: &str) -> String {
    serde_json::json!({ "type": "error", "payload": message }).to_string()
}

/// Prints every event from the worker until it hangs up.
pub fn spawn_printer(ui_rx: Receiver<UiEvent>, json: bool) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let stdout = io::stdout();
        for event in ui_rx.iter() {
            let text = if json {
                render_json(&event)
            } else {
                render_event(&event)
            };
            let mut out = stdout.lock();
            if writeln!(out, "{text}").and_then(|_| out.flush()).is_err() {
                break;
            }
        }
    })
}

/// Reads commands line by line until `quit` or end of input.
pub fn run_prompt(
    input: impl BufRead,
    mut errors: impl Write,
    cmd_tx: &Sender<BackendCommand>,
) -> io::Result<()> {
    for line in input.lines() {
        let line = line?;
        let cmd = match parse_input(&line) {
            Ok(UserInput::Command(cmd)) => cmd,
            Ok(UserInput::Help) => {
                writeln!(errors, "{USAGE}")?;
                continue;
            }
            Ok(UserInput::Empty) => continue,
            Err(message) => {
                writeln!(errors, "{message}\n{USAGE}")?;
                continue;
            }
        };

        let quitting = cmd == BackendCommand::Shutdown;
        let mut status = String::new();
        dispatch_backend_command(cmd_tx, cmd, &mut status);
        if !status.is_empty() {
            writeln!(errors, "{status}")?;
        }
        if quitting {
            return Ok(());
        }
    }

    let mut status = String::new();
    dispatch_backend_command(cmd_tx, BackendCommand::Shutdown, &mut status);
    Ok(())
}
