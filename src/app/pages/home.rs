//! Launcher page.

use dioxus::prelude::*;

use crate::app::components::{GameControls, GameFrame, InstallCard, Layout, Notice};
use crate::app::host::use_page;
use crate::app::use_settings;

#[component]
pub fn Home() -> Element {
    let mut page = use_page();
    let settings = use_settings();
    let notice = page.view.read().notice.clone();

    rsx! {
        Layout { title: settings.frame_title.clone(),
            section { class: "hero",
                h1 { "{settings.frame_title}" }
                p { class: "text-muted", "An endless, relaxing drive. Right in your browser." }
            }
            if let Some(message) = notice {
                Notice { message, on_dismiss: move |_| page.dismiss_notice() }
            }
            GameFrame { title: settings.frame_title.clone() }
            GameControls {}
            InstallCard {}
        }
    }
}
