//! Custom PWA install prompt.

use dioxus::prelude::*;

use crate::app::install::use_install;

#[component]
pub fn InstallCard() -> Element {
    let install = use_install();

    if !install.prompt_visible() {
        return rsx! {};
    }

    rsx! {
        div { class: "install-prompt",
            div { class: "install-card",
                h4 { "Install Slow Roads" }
                p { "Get the best experience with our app" }
                div { class: "install-actions",
                    button {
                        id: "installBtn",
                        class: "btn btn-primary",
                        onclick: move |_| install.accept(),
                        "Install"
                    }
                    button {
                        id: "dismissBtn",
                        class: "btn btn-ghost",
                        onclick: move |_| install.dismiss(),
                        "Not now"
                    }
                }
            }
        }
    }
}
