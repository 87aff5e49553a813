// src/tests/router_tests/export_tests.rs

use crate::config::ShareMode;
use crate::db::exports::list_recent_exports;
use crate::db::media::count_assets_in_album;
use crate::tests::utils::{body_bytes, body_string, get, make_app, record, stamp};
use scraper::{Html, Selector};
use std::collections::HashSet;

#[test]
fn download_all_returns_pdf_and_records_the_export() {
    let app = make_app(
        "export_pdf",
        ShareMode::Download,
        vec![
            record("a", "1 Luna St", Some("Ana"), Some(stamp(0, 9))),
            record("b", "2 Luna St", None, Some(stamp(2, 9))),
        ],
    );

    let mut resp = get(&app, "/export?tab=All");
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers().get("Content-Type").unwrap(), "application/pdf");
    let disposition = resp
        .headers()
        .get("Content-Disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"recycle-report-"));

    let bytes = body_bytes(&mut resp);
    assert!(bytes.starts_with(b"%PDF"));

    let events = app
        .state
        .db
        .with_conn(|conn| list_recent_exports(conn, 5))
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].outcome, "shared");
    assert_eq!(events[0].row_count, 2);
    assert_eq!(events[0].tab, "All");

    let albums = app
        .state
        .db
        .with_conn(|conn| count_assets_in_album(conn, "Download"))
        .unwrap();
    assert_eq!(albums, 1);
}

#[test]
fn without_share_target_the_export_is_saved_and_reported() {
    let app = make_app(
        "export_saved",
        ShareMode::None,
        vec![record("a", "1 Luna St", Some("Ana"), Some(stamp(0, 9)))],
    );

    let mut resp = get(&app, "/export?tab=Today");
    assert_eq!(resp.status(), 200);
    let html = body_string(&mut resp);
    assert!(html.contains("Sharing is not available on this device."));
    assert!(html.contains("Saved 1 records"));

    let events = app
        .state
        .db
        .with_conn(|conn| list_recent_exports(conn, 5))
        .unwrap();
    assert_eq!(events[0].outcome, "saved");
}

#[test]
fn unwritable_export_dir_is_a_permission_error() {
    let app = make_app("export_denied", ShareMode::Download, vec![]);
    // Occupy the export directory path with a file.
    std::fs::write(app.dir.join("exports"), b"not a directory").unwrap();

    let mut resp = get(&app, "/export?tab=All");
    assert_eq!(resp.status(), 403);
    let html = body_string(&mut resp);
    assert!(html.contains("Storage permission is required to save files."));

    let events = app
        .state
        .db
        .with_conn(|conn| list_recent_exports(conn, 5))
        .unwrap();
    assert_eq!(events[0].outcome, "permission_denied");
    assert_eq!(events[0].artifact_path, None);
}

#[test]
fn history_lists_recent_downloads() {
    let app = make_app(
        "export_ledger",
        ShareMode::Download,
        vec![record("a", "1 Luna St", None, Some(stamp(0, 9)))],
    );
    get(&app, "/export?tab=Today");

    let html = body_string(&mut get(&app, "/history"));
    assert!(html.contains("Recent downloads"));
    assert!(html.contains("Today - 1 rows - shared"));
}

#[test]
fn concurrent_exports_each_get_their_own_pdf() {
    let records = (0..50)
        .map(|i| record(&format!("-N{i:03}"), &format!("{i} Luna St"), None, Some(stamp(0, 9))))
        .collect();
    let app = make_app("export_concurrent", ShareMode::Download, records);

    let names: Vec<String> = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    let mut names = Vec::new();
                    for _ in 0..5 {
                        let mut resp = get(&app, "/export?tab=All");
                        assert_eq!(resp.status(), 200);
                        let disposition = resp
                            .headers()
                            .get("Content-Disposition")
                            .unwrap()
                            .to_str()
                            .unwrap()
                            .to_string();
                        assert!(body_bytes(&mut resp).starts_with(b"%PDF"));
                        names.push(disposition);
                    }
                    names
                })
            })
            .collect();
        workers
            .into_iter()
            .flat_map(|w| w.join().unwrap())
            .collect()
    });

    assert_eq!(names.len(), 40);
    let distinct: HashSet<_> = names.iter().collect();
    assert_eq!(distinct.len(), 40);

    let events = app
        .state
        .db
        .with_conn(|conn| list_recent_exports(conn, 100))
        .unwrap();
    assert_eq!(events.len(), 40);
    assert!(events.iter().all(|e| e.outcome == "shared"));
}

#[test]
fn preview_shows_the_export_table_without_exporting() {
    let app = make_app(
        "export_preview",
        ShareMode::Download,
        vec![
            record("a", "1 Luna St", Some("Ana"), Some(stamp(0, 9))),
            record("b", "2 Luna St", None, Some(stamp(0, 11))),
        ],
    );

    let mut resp = get(&app, "/export/preview?tab=Today");
    assert_eq!(resp.status(), 200);
    let html = Html::parse_document(&body_string(&mut resp));

    let tr = Selector::parse("tbody tr").unwrap();
    let ids: Vec<_> = html
        .select(&tr)
        .filter_map(|row| row.value().attr("data-id"))
        .collect();
    assert_eq!(ids, vec!["b", "a"]);

    let td = Selector::parse("tbody tr td").unwrap();
    let cells: Vec<String> = html.select(&td).map(|c| c.text().collect()).collect();
    assert!(cells.contains(&"No Owner Name Available".to_string()));

    let events = app
        .state
        .db
        .with_conn(|conn| list_recent_exports(conn, 5))
        .unwrap();
    assert!(events.is_empty());
}
