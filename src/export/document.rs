// src/export/document.rs
use crate::domain::record::CollectionRecord;
use crate::history::Tab;
use chrono::NaiveDateTime;
use maud::{html, Markup, DOCTYPE};

pub const REPORT_TITLE: &str = "Recycle Waste Collection Report";
pub const COLUMNS: [&str; 3] = ["House Address", "Owner Name", "Date"];

pub const NO_HOUSE_ADDRESS: &str = "No House Address Available";
pub const NO_OWNER_NAME: &str = "No Owner Name Available";
pub const NO_DATE: &str = "No Date Available";

/// One table row, with placeholders already substituted for missing fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub id: String,
    pub house_address: String,
    pub owner_name: String,
    pub date: String,
}

impl ReportRow {
    pub fn from_record(record: &CollectionRecord) -> Self {
        let date = present(record.readable_date.as_deref())
            .or_else(|| present(record.date_and_time.as_deref()));

        Self {
            id: record.id.clone(),
            house_address: present(record.house_address.as_deref())
                .unwrap_or(NO_HOUSE_ADDRESS)
                .to_string(),
            owner_name: present(record.owner_name.as_deref())
                .unwrap_or(NO_OWNER_NAME)
                .to_string(),
            date: date.unwrap_or(NO_DATE).to_string(),
        }
    }

    pub fn cells(&self) -> [&str; 3] {
        [&self.house_address, &self.owner_name, &self.date]
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// The export's document: one table, rows in projection order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDocument {
    pub title: String,
    pub tab: Tab,
    pub generated_at: NaiveDateTime,
    pub rows: Vec<ReportRow>,
}

impl ReportDocument {
    pub fn build(records: &[CollectionRecord], tab: Tab, generated_at: NaiveDateTime) -> Self {
        Self {
            title: REPORT_TITLE.to_string(),
            tab,
            generated_at,
            rows: records.iter().map(ReportRow::from_record).collect(),
        }
    }

    pub fn subtitle(&self) -> String {
        format!(
            "{} - {} records - generated {}",
            self.tab,
            self.rows.len(),
            self.generated_at.format("%-m/%-d/%Y, %-I:%M:%S %p")
        )
    }

    pub fn markup(&self) -> Markup {
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="utf-8";
                    title { (self.title) }
                    style {
                        "body { font-family: Helvetica, Arial, sans-serif; margin: 24px; }"
                        "table { width: 100%; border-collapse: collapse; }"
                        "th, td { border: 1px solid #6EC6B2; padding: 6px; text-align: left; }"
                        "th { background: #00CE5E; color: #ffffff; }"
                    }
                }
                body {
                    h1 { (self.title) }
                    p class="subtitle" { (self.subtitle()) }
                    table {
                        thead {
                            tr {
                                @for col in COLUMNS {
                                    th { (col) }
                                }
                            }
                        }
                        tbody {
                            @for row in &self.rows {
                                tr data-id=(row.id) {
                                    @for cell in row.cells() {
                                        td { (cell) }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use scraper::{Html, Selector};

    fn generated() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 2)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap()
    }

    fn table_rows(html: &str) -> Vec<Vec<String>> {
        let doc = Html::parse_document(html);
        let tr = Selector::parse("tbody tr").unwrap();
        let td = Selector::parse("td").unwrap();
        doc.select(&tr)
            .map(|row| row.select(&td).map(|c| c.text().collect::<String>()).collect())
            .collect()
    }

    #[test]
    fn missing_fields_render_placeholders() {
        let records = vec![
            CollectionRecord {
                owner_name: Some("Ana Cruz".into()),
                house_address: Some("12 Mabini St".into()),
                readable_date: Some("March 2, 2024".into()),
                date_and_time: Some("3/2/2024, 9:00:00 AM".into()),
                ..CollectionRecord::new("a")
            },
            CollectionRecord {
                owner_name: Some("   ".into()),
                date_and_time: Some("3/1/2024, 9:00:00 AM".into()),
                ..CollectionRecord::new("b")
            },
            CollectionRecord::new("c"),
        ];

        let doc = ReportDocument::build(&records, Tab::All, generated());
        let rows = table_rows(&doc.markup().into_string());

        assert_eq!(
            rows,
            vec![
                vec!["12 Mabini St", "Ana Cruz", "March 2, 2024"],
                vec![NO_HOUSE_ADDRESS, NO_OWNER_NAME, "3/1/2024, 9:00:00 AM"],
                vec![NO_HOUSE_ADDRESS, NO_OWNER_NAME, NO_DATE],
            ]
        );
    }

    #[test]
    fn header_lists_the_three_columns() {
        let doc = ReportDocument::build(&[], Tab::Today, generated());
        let html = Html::parse_document(&doc.markup().into_string());
        let th = Selector::parse("thead th").unwrap();
        let headers: Vec<String> = html.select(&th).map(|h| h.text().collect()).collect();
        assert_eq!(headers, COLUMNS);
        assert!(table_rows(&doc.markup().into_string()).is_empty());
    }

    #[test]
    fn markup_escapes_record_text() {
        let records = vec![CollectionRecord {
            house_address: Some("<script>alert(1)</script>".into()),
            ..CollectionRecord::new("x")
        }];
        let html = ReportDocument::build(&records, Tab::All, generated()).markup().into_string();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn subtitle_names_tab_and_count() {
        let doc = ReportDocument::build(&[CollectionRecord::new("a")], Tab::Today, generated());
        assert_eq!(doc.subtitle(), "Today - 1 records - generated 3/2/2024, 2:05:00 PM");
    }
}
