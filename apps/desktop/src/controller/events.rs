//! Backend-to-UI events and error classification for the terminal shell.

use serde::Serialize;
use shared::{
    domain::ViewModel,
    error::{DriveError, ResolutionError},
    protocol::{NavigationIntent, SessionEvent},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum UiEvent {
    Info(String),
    View(ViewModel),
    NavigationFailed {
        intent: NavigationIntent,
        error: ResolutionError,
    },
    /// Worker-level failure not tied to a single intent.
    Error(String),
}

impl From<SessionEvent> for UiEvent {
    fn from(event: SessionEvent) -> Self {
        match event {
            SessionEvent::View(view) => UiEvent::View(view),
            SessionEvent::Failed { intent, error } => UiEvent::NavigationFailed { intent, error },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    /// The entry is gone or is not what the UI thought it was.
    Stale,
    Transport,
    /// The store holds more entries than the id range above home can name.
    Capacity,
}

impl UiErrorCategory {
    pub fn classify(error: &ResolutionError) -> Self {
        match error.cause {
            DriveError::NotFound(_) | DriveError::NotADirectory(_) | DriveError::NotAPhoto(_) => {
                UiErrorCategory::Stale
            }
            DriveError::Source { .. } | DriveError::Timeout(_) => UiErrorCategory::Transport,
            DriveError::IdsExhausted(_) => UiErrorCategory::Capacity,
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            UiErrorCategory::Stale => "the listing may be out of date; type 'home' or 'refresh'",
            UiErrorCategory::Transport => "the photo store did not answer; retry or type 'home'",
            UiErrorCategory::Capacity => "restart with a lower --home-id to browse this folder",
        }
    }
}
