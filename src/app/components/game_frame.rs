//! Game container: preview, skeleton, the embedded frame and the fallback overlay.

use dioxus::prelude::*;

use crate::app::host::{use_page, GAME_CONTAINER_ID};
use crate::app::launcher::use_launcher;
use crate::host::Slot;

/// Features the embedded game may use
const FRAME_ALLOW: &str = "fullscreen; gamepad; xr-spatial-tracking; autoplay";

fn display(visible: bool) -> &'static str {
    if visible {
        "block"
    } else {
        "none"
    }
}

#[component]
pub fn GameFrame(
    /// Accessible title of the embedded frame
    title: String,
) -> Element {
    let page = use_page();
    let launcher = use_launcher();
    let view = page.view.read();

    let preview = display(view.is_visible(Slot::Preview));
    let skeleton = display(view.is_visible(Slot::Skeleton));
    let overlay = if view.is_visible(Slot::Overlay) {
        "flex"
    } else {
        "none"
    };
    let frame = view.frame;
    let frame_key = view.frame_key().unwrap_or_default();
    let frame_url = view.frame_url.clone().unwrap_or_default();

    rsx! {
        div {
            id: GAME_CONTAINER_ID,
            class: "game-frame",
            style: "aspect-ratio: 16 / 9;",

            img {
                id: "framePreview",
                class: "frame-preview",
                style: "display: {preview};",
                src: "/assets/icon.svg",
                alt: "Slow Roads preview",
            }
            div {
                id: "gameSkeleton",
                class: "game-skeleton",
                style: "display: {skeleton};",
                aria_hidden: "true",
            }
            if let Some(frame) = frame {
                iframe {
                    // New key per navigation: a fresh element always loads,
                    // even when the URL is unchanged
                    key: "{frame_key}",
                    id: "gameIframe",
                    title: "{title}",
                    allow: FRAME_ALLOW,
                    referrerpolicy: "no-referrer",
                    style: "width: 100%; height: 100%; border: 0;",
                    src: "{frame_url}",
                    onload: move |_| launcher.frame_loaded(frame),
                }
            }
            div {
                id: "frameOverlay",
                class: "frame-overlay",
                style: "display: {overlay};",
                div { class: "overlay-card",
                    p { "Slow Roads can't be embedded here." }
                    button {
                        id: "overlayOpen",
                        class: "btn btn-primary",
                        onclick: move |_| launcher.open_in_new_tab(),
                        "Open in New Tab"
                    }
                }
            }
        }
    }
}

/// Buttons under the game frame
#[component]
pub fn GameControls() -> Element {
    let page = use_page();
    let launcher = use_launcher();
    let fullscreen_enabled = page.view.read().fullscreen_enabled;

    rsx! {
        div { class: "game-controls",
            button {
                id: "btnPlay",
                class: "btn btn-ghost",
                onclick: move |_| launcher.play(),
                "Reload game"
            }
            button {
                id: "btnNewTab",
                class: "btn btn-ghost",
                onclick: move |_| launcher.open_in_new_tab(),
                "Open in New Tab"
            }
            button {
                id: "btnFullscreen",
                class: if fullscreen_enabled { "btn btn-primary enabled" } else { "btn btn-primary" },
                disabled: !fullscreen_enabled,
                aria_disabled: if fullscreen_enabled { "false" } else { "true" },
                onclick: move |_| launcher.toggle_fullscreen(),
                "Fullscreen"
            }
        }
    }
}
