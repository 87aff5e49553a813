use crate::templates::layouts::mobile::mobile_layout;
use maud::{html, Markup};

pub fn success_page() -> Markup {
    mobile_layout(
        "Success",
        Some("/history"),
        html! {
            div class="success" {
                div class="check" { "✓" }
                h2 { "Recycle Waste Collected Successfully!" }
                a class="ok" href="/history" { "Ok" }
                p { "Recycle More, Earn More!" }
            }
        },
    )
}
