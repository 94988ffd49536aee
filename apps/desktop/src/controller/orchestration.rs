//! Turns terminal input into backend commands and queues them.

use crossbeam_channel::{Sender, TrySendError};
use shared::{domain::EntryId, protocol::NavigationIntent};

use crate::backend_bridge::commands::BackendCommand;

pub const USAGE: &str =
    "commands: <id> | enter <id> | back (..) | home (~) | refresh (r) | help (?) | quit (q)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    Command(BackendCommand),
    Help,
    Empty,
}

pub fn parse_input(line: &str) -> Result<UserInput, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(UserInput::Empty);
    };
    let arg = words.next();
    if words.next().is_some() {
        return Err(format!("too many arguments in '{}'", line.trim()));
    }

    let navigate = |intent: NavigationIntent| -> Result<UserInput, String> {
        Ok(UserInput::Command(BackendCommand::Navigate(intent)))
    };
    match (head.to_ascii_lowercase().as_str(), arg) {
        ("enter" | "cd", Some(id)) => navigate(NavigationIntent::Enter(parse_entry_id(id)?)),
        ("enter" | "cd", None) => Err("enter needs an entry id".to_string()),
        ("back" | "..", None) => navigate(NavigationIntent::GoBack),
        ("home" | "~", None) => navigate(NavigationIntent::GoHome),
        ("refresh" | "r", None) => navigate(NavigationIntent::RefreshCurrent),
        ("quit" | "q" | "exit", None) => Ok(UserInput::Command(BackendCommand::Shutdown)),
        ("help" | "?", None) => Ok(UserInput::Help),
        (other, None) if other.chars().all(|c| c.is_ascii_digit()) => {
            navigate(NavigationIntent::Enter(parse_entry_id(other)?))
        }
        (other, _) => Err(format!("unknown command '{other}'")),
    }
}

fn parse_entry_id(raw: &str) -> Result<EntryId, String> {
    raw.parse::<u32>()
        .map(EntryId)
        .map_err(|_| format!("'{raw}' is not an entry id"))
}

pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) {
    let cmd_name = cmd.name();
    match cmd_tx.try_send(cmd) {
        Ok(()) => tracing::debug!(command = cmd_name, "queued ui->backend command"),
        Err(TrySendError::Full(_)) => {
            *status = "Navigation queue is full; please retry".to_string();
        }
        Err(TrySendError::Disconnected(_)) => {
            *status = "Navigation worker disconnected (possible startup failure); restart the browser"
                .to_string();
        }
    }
}
