//! Page chrome: head links, header with the theme toggle, footer.

use dioxus::prelude::*;

use super::theme_toggle::ThemeToggle;

#[derive(Props, Clone, PartialEq)]
pub struct LayoutProps {
    /// Page title (shown in browser tab)
    pub title: String,
    /// Page content
    pub children: Element,
}

#[component]
pub fn Layout(props: LayoutProps) -> Element {
    let version = crate::VERSION;
    let git_sha = crate::GIT_SHA;

    rsx! {
        // Head elements - Dioxus hoists these to the real <head>
        document::Title { "{props.title}" }
        // Fixed paths: these are the shell assets the service worker caches
        document::Link { rel: "stylesheet", href: "/assets/styles.css" }
        document::Link { rel: "manifest", href: "/manifest.webmanifest" }
        document::Link { rel: "icon", r#type: "image/svg+xml", href: "/assets/icon.svg" }

        header { class: "site-header",
            a { class: "brand", href: "/", "Slow Roads" }
            ThemeToggle {}
        }
        main { class: "site-main",
            {props.children}
        }
        footer { class: "site-footer",
            small { class: "text-muted", "Launcher v{version} ({git_sha})" }
        }
    }
}
