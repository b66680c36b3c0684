//! Dismissable notice banner.

use dioxus::prelude::*;

/// A dismissable notice with a close button.
#[component]
pub fn Notice(
    /// The message to display
    message: String,
    /// Called when the dismiss button is clicked
    on_dismiss: EventHandler<()>,
) -> Element {
    rsx! {
        div { class: "notice", role: "alert",
            span { "{message}" }
            button {
                class: "btn btn-ghost btn-sm",
                aria_label: "Dismiss",
                onclick: move |_| on_dismiss.call(()),
                "×"
            }
        }
    }
}
