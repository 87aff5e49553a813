use crate::db::exports::ExportEvent;
use crate::history::{Projection, Tab};
use crate::templates::components::{record_item, tab_link};
use crate::templates::layouts::mobile::mobile_layout;
use chrono::{DateTime, Utc};
use maud::{html, Markup};

pub struct HistoryVm<'a> {
    pub projection: &'a Projection,
    pub total_records: usize,
    pub feed_error: Option<String>,
    pub subscribed: bool,
    pub recent_exports: &'a [ExportEvent],
}

pub fn history_page(vm: &HistoryVm) -> Markup {
    let tab = vm.projection.tab;

    mobile_layout(
        "Scanning History",
        Some("/success"),
        html! {
            @if let Some(err) = &vm.feed_error {
                div class="banner" role="alert" {
                    p { (err) }
                    @if !vm.subscribed {
                        a href=(format!("/history?tab={tab}&reconnect=1")) { "Reconnect" }
                    }
                }
            }

            nav class="tabs" {
                (tab_link(Tab::Today, tab))
                (tab_link(Tab::All, tab))
                a class="download-all" href=(format!("/export?tab={tab}")) { "Download All" }
                a class="tab" href=(format!("/export/preview?tab={tab}")) { "Preview" }
            }

            @if vm.projection.is_empty() {
                p class="empty" {
                    @match tab {
                        Tab::Today => "No collections recorded today.",
                        Tab::All => "No collections recorded yet.",
                    }
                }
            } @else {
                ul class="list" {
                    @for record in &vm.projection.records {
                        (record_item(record))
                    }
                }
            }

            p class="ledger" {
                "Showing " (vm.projection.len()) " of " (vm.total_records) " records."
            }

            @if !vm.recent_exports.is_empty() {
                section class="ledger" {
                    h3 { "Recent downloads" }
                    ul {
                        @for event in vm.recent_exports {
                            li {
                                (format_unix(event.created_at)) " - " (event.tab) " - "
                                (event.row_count) " rows - " (event.outcome)
                            }
                        }
                    }
                }
            }
        },
    )
}

fn format_unix(secs: i64) -> String {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| secs.to_string())
}
