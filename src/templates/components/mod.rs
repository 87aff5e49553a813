use crate::domain::record::CollectionRecord;
use crate::export::document::ReportRow;
use crate::history::Tab;
use maud::{html, Markup};

pub mod error;

pub use error::error_page;

pub fn tab_link(tab: Tab, selected: Tab) -> Markup {
    html! {
        a.tab.selected[tab == selected] href=(format!("/history?tab={}", tab)) {
            (tab.as_str())
        }
    }
}

/// One history entry: address, owner, date, and a link to its report.
/// Blank fields show the same placeholders as the exported report.
pub fn record_item(record: &CollectionRecord) -> Markup {
    let row = ReportRow::from_record(record);

    html! {
        li class="item" data-id=(record.id) {
            div class="item-text" {
                div class="item-title" { (row.house_address) }
                div class="item-subtitle" { (row.owner_name) }
                div class="item-subtitle" { (row.date) }
            }
            a class="view" href=(format!("/report?id={}", encode(&record.id))) { "View" }
        }
    }
}

pub fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
