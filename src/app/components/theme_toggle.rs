//! Theme toggle button: cycles dark, sunset and light.

use dioxus::prelude::*;

use crate::app::theme::use_theme;

#[component]
pub fn ThemeToggle() -> Element {
    let theme_ctx = use_theme();
    let theme = theme_ctx.get();

    rsx! {
        button {
            id: "themeToggle",
            class: "btn btn-ghost theme-toggle",
            title: "Switch theme",
            onclick: move |_| theme_ctx.toggle(),
            svg {
                width: "18",
                height: "18",
                view_box: "0 0 24 24",
                fill: "currentColor",
                "aria-hidden": "true",
                path { d: theme.icon_path() }
            }
            span { id: "themeLabel", "{theme.label()}" }
        }
    }
}
