//! Embed controller context.
//!
//! Owns the page's `EmbedController` in a signal and runs its watchdog
//! tasks on the Dioxus scheduler against a browser timer.

use dioxus::prelude::*;

use super::host::{sleep, PageHost};
use crate::embed::EmbedController;
use crate::host::FrameId;
use crate::settings::LauncherSettings;
use crate::watchdog::WatchdogTask;

#[derive(Clone, Copy)]
pub struct LauncherContext {
    host: PageHost,
    pub embed: Signal<EmbedController>,
}

impl LauncherContext {
    /// Page load: swap preview for skeleton and start embedding
    pub fn boot(&self) {
        let mut host = self.host;
        let mut embed = self.embed;
        let task = embed.write().boot(&mut host);
        self.watch(task);
    }

    /// Manual play button
    pub fn play(&self) {
        let mut host = self.host;
        let mut embed = self.embed;
        let task = embed.write().play(&mut host);
        self.watch(task);
    }

    pub fn frame_loaded(&self, frame: FrameId) {
        let mut host = self.host;
        let mut embed = self.embed;
        embed.write().on_frame_loaded(&mut host, frame);
    }

    pub fn toggle_fullscreen(&self) {
        let mut host = self.host;
        self.embed.peek().toggle_fullscreen(&mut host);
    }

    pub fn open_in_new_tab(&self) {
        let mut host = self.host;
        self.embed.peek().open_in_new_tab(&mut host);
    }

    pub fn play_url(&self) -> String {
        self.embed.peek().play_url().to_string()
    }

    fn watch(&self, task: Option<WatchdogTask>) {
        let Some(task) = task else {
            return;
        };
        let mut host = self.host;
        let mut embed = self.embed;
        spawn(async move {
            if let Some(id) = task.run(sleep).await {
                embed.write().on_watchdog_elapsed(&mut host, id);
            }
        });
    }
}

/// Initialize the embed context and boot the embed - call once at app root
pub fn use_launcher_provider(host: PageHost, settings: LauncherSettings) -> LauncherContext {
    let embed = use_signal(move || EmbedController::new(settings));
    let ctx = use_context_provider(|| LauncherContext { host, embed });

    // Mirrors the window `load` handler: runs once after the first render
    use_effect(move || ctx.boot());

    ctx
}

/// Get the embed context - use in any component
pub fn use_launcher() -> LauncherContext {
    use_context::<LauncherContext>()
}
