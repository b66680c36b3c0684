//! Offline fallback page, served by the service worker when the network is down.
//!
//! Rendered to static HTML by the exporter, so it takes no context.

use dioxus::prelude::*;

#[component]
pub fn OfflinePage(
    /// Where the game lives once the connection is back
    play_url: String,
) -> Element {
    rsx! {
        main { class: "site-main offline",
            section { class: "hero",
                h1 { "You're offline" }
                p { class: "text-muted",
                    "Slow Roads needs a connection to stream the road ahead. "
                    "Check your network and try again."
                }
            }
            div { class: "game-controls",
                a { class: "btn btn-primary", href: "/", "Try again" }
                a {
                    class: "btn btn-ghost",
                    href: "{play_url}",
                    target: "_blank",
                    rel: "noopener",
                    "Open Slow Roads"
                }
            }
        }
    }
}
