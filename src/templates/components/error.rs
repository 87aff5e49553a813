use crate::templates::layouts::mobile::mobile_layout;
use maud::{html, Markup};

/// Body of every error response.
pub fn error_page(status: u16, title: &str, message: &str) -> Markup {
    mobile_layout(
        &format!("Error {status}"),
        Some("/history"),
        html! {
            main {
                h2 { (title) }
                p class="banner" { (message) }
                p { a href="/history" { "← Back to history" } }
            }
        },
    )
}
