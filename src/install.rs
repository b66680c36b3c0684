//! PWA install prompt management.
//!
//! The platform fires an install-availability event once it considers the
//! app installable. The default mini-infobar is suppressed, the event kept,
//! and replayed from the custom prompt's Install button. A retained event
//! can only be replayed once: `InstallPrompt::prompt` takes it by value.

use futures::future::LocalBoxFuture;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::host::{HostError, HostSurface};

/// Outcome of the platform install dialog
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserChoice {
    Accepted,
    Dismissed,
}

impl UserChoice {
    /// Map the platform's `userChoice.outcome` string
    pub fn from_outcome(outcome: &str) -> Self {
        if outcome == "accepted" {
            UserChoice::Accepted
        } else {
            UserChoice::Dismissed
        }
    }
}

/// Platform install-availability event
pub trait InstallPrompt {
    /// Suppress the browser's own install UI. Must run synchronously inside
    /// the event dispatch.
    fn prevent_default(&self);

    /// Show the platform install dialog and wait for the user's choice
    fn prompt(self) -> LocalBoxFuture<'static, Result<UserChoice, HostError>>;
}

/// Pending navigation to the destination when launched as an installed app
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redirect {
    pub url: String,
    pub delay: Duration,
}

#[derive(Debug)]
pub struct InstallPromptManager<P> {
    standalone_at_launch: bool,
    installed: bool,
    deferred: Option<P>,
    prompt_visible: bool,
}

impl<P: InstallPrompt> InstallPromptManager<P> {
    /// `standalone` is the display-mode check at launch. It is not re-evaluated
    /// later in the session.
    pub fn new(standalone: bool) -> Self {
        Self {
            standalone_at_launch: standalone,
            installed: standalone,
            deferred: None,
            prompt_visible: false,
        }
    }

    /// Build from the host's display mode
    pub fn detect(host: &impl HostSurface) -> Self {
        Self::new(host.is_standalone())
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    pub fn prompt_visible(&self) -> bool {
        self.prompt_visible
    }

    pub fn has_deferred(&self) -> bool {
        self.deferred.is_some()
    }

    /// Handle the platform's install-availability event. Returns true if the
    /// custom prompt is now showing.
    pub fn on_install_available(&mut self, event: P) -> bool {
        event.prevent_default();
        self.deferred = Some(event);
        if self.installed {
            debug!("Install prompt suppressed, app already installed");
            return false;
        }
        self.prompt_visible = true;
        true
    }

    /// Install button: hide the prompt and hand out the retained event for
    /// replay. `None` if there is nothing to replay.
    pub fn begin_install(&mut self) -> Option<P> {
        self.prompt_visible = false;
        self.deferred.take()
    }

    /// Record the outcome of a replayed prompt
    pub fn finish_install(&mut self, result: Result<UserChoice, HostError>) {
        match result {
            Ok(UserChoice::Accepted) => {
                info!("PWA installed");
                self.installed = true;
            }
            Ok(UserChoice::Dismissed) => debug!("Install dialog dismissed"),
            Err(e) => warn!("Install prompt failed: {}", e),
        }
    }

    /// Not-now button: hide the prompt, nothing else changes
    pub fn dismiss(&mut self) {
        self.prompt_visible = false;
    }

    /// Redirect scheduled when the page was launched as an installed app
    pub fn launch_redirect(&self, url: &str, delay: Duration) -> Option<Redirect> {
        self.standalone_at_launch.then(|| Redirect {
            url: url.to_string(),
            delay,
        })
    }
}

/// Replay the retained event from the Install button and record the choice.
pub async fn accept_install<P: InstallPrompt>(
    event: Option<P>,
) -> Option<Result<UserChoice, HostError>> {
    match event {
        Some(event) => Some(event.prompt().await),
        None => None,
    }
}
