use serde::{Deserialize, Serialize};

use crate::{
    domain::{EntryId, ViewModel},
    error::ResolutionError,
};

/// Single-step navigation requested by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum NavigationIntent {
    Enter(EntryId),
    GoBack,
    GoHome,
    RefreshCurrent,
}

impl NavigationIntent {
    pub fn name(&self) -> &'static str {
        match self {
            NavigationIntent::Enter(_) => "enter",
            NavigationIntent::GoBack => "go_back",
            NavigationIntent::GoHome => "go_home",
            NavigationIntent::RefreshCurrent => "refresh_current",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SessionEvent {
    View(ViewModel),
    Failed {
        intent: NavigationIntent,
        error: ResolutionError,
    },
}
