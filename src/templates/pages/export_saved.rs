use crate::export::ExportReport;
use crate::templates::layouts::mobile::mobile_layout;
use maud::{html, Markup};

/// Shown when the export finished but there was nothing to share it with.
pub fn export_saved_page(report: &ExportReport) -> Markup {
    mobile_layout(
        "Download",
        Some("/history"),
        html! {
            main {
                p { "Sharing is not available on this device." }
                p { "Saved " (report.rows) " records to " code { (report.artifact.path().display()) } }
                @if let Some(asset) = &report.asset {
                    p { "Added to the " strong { (asset.album) } " album." }
                }
                @if let Some(err) = &report.persist_error {
                    p class="banner" { (err.user_message()) }
                }
                p { a href="/history" { "← Back to history" } }
            }
        },
    )
}
