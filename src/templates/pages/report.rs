use crate::domain::record::CollectionRecord;
use crate::export::document::{NO_DATE, NO_HOUSE_ADDRESS, NO_OWNER_NAME};
use crate::templates::layouts::mobile::mobile_layout;
use maud::{html, Markup};

/// Detail view for a single collection record.
pub fn report_page(record: &CollectionRecord) -> Markup {
    let or = |v: &Option<String>, placeholder: &'static str| -> String {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(placeholder)
            .to_string()
    };

    mobile_layout(
        "Collection Report",
        Some("/history"),
        html! {
            dl class="report" data-id=(record.id) {
                dt { "House Address" }
                dd { (or(&record.house_address, NO_HOUSE_ADDRESS)) }
                dt { "Owner Name" }
                dd { (or(&record.owner_name, NO_OWNER_NAME)) }
                dt { "Date" }
                dd { (or(&record.readable_date, NO_DATE)) }
                dt { "Recorded At" }
                dd { (or(&record.date_and_time, NO_DATE)) }
                dt { "Review Status" }
                dd { (or(&record.review_status, "No Review Status Available")) }
            }
        },
    )
}
