//! Backend commands queued from UI to backend worker.

use shared::protocol::NavigationIntent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    Navigate(NavigationIntent),
    Shutdown,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Navigate(intent) => intent.name(),
            BackendCommand::Shutdown => "shutdown",
        }
    }
}
