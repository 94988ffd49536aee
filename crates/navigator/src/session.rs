use drive::Drive;
use shared::{
    domain::ViewModel,
    error::ResolutionError,
    protocol::{NavigationIntent, SessionEvent},
};
use tracing::{debug, warn};

use crate::{NavigationController, NavigatorOptions};

/// One window's navigation session. Intents must be dispatched one at a time;
/// `&mut self` keeps a second one from starting while another is in flight.
pub struct Session<D> {
    controller: NavigationController<D>,
}

impl<D: Drive> Session<D> {
    pub fn new(drive: D, options: NavigatorOptions) -> Self {
        Self {
            controller: NavigationController::new(drive, options),
        }
    }

    pub fn controller(&self) -> &NavigationController<D> {
        &self.controller
    }

    /// Populates the initial view by going home.
    pub async fn start(&mut self) -> SessionEvent {
        let outcome = self
            .controller
            .go_home()
            .await
            .map(ViewModel::Directory);
        to_event(NavigationIntent::GoHome, outcome)
    }

    /// Runs `intent` to completion. Yields no event only for a refresh while
    /// a photo is shown.
    pub async fn dispatch(&mut self, intent: NavigationIntent) -> Option<SessionEvent> {
        debug!(
            intent = intent.name(),
            current = %self.controller.current(),
            "dispatching navigation intent"
        );

        let outcome = match intent {
            NavigationIntent::Enter(target) => self.controller.enter(target).await,
            NavigationIntent::GoBack => self.controller.go_back().await.map(ViewModel::Directory),
            NavigationIntent::GoHome => self.controller.go_home().await.map(ViewModel::Directory),
            NavigationIntent::RefreshCurrent => match self.controller.refresh_current().await {
                Ok(Some(view)) => Ok(ViewModel::Directory(view)),
                Ok(None) => return None,
                Err(error) => Err(error),
            },
        };

        Some(to_event(intent, outcome))
    }
}

fn to_event(intent: NavigationIntent, outcome: Result<ViewModel, ResolutionError>) -> SessionEvent {
    match outcome {
        Ok(view) => {
            debug!(intent = intent.name(), entry = %view.entry_id(), "navigation resolved");
            SessionEvent::View(view)
        }
        Err(error) => {
            warn!(intent = intent.name(), entry = %error.id, "navigation failed: {error}");
            SessionEvent::Failed { intent, error }
        }
    }
}
