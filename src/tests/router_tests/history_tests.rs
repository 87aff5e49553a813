// src/tests/router_tests/history_tests.rs

use crate::config::ShareMode;
use crate::feed::FeedError;
use crate::tests::utils::{body_string, get, make_app, record, stamp};
use scraper::{Html, Selector};

fn listed_ids(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let item = Selector::parse("ul.list li.item").unwrap();
    doc.select(&item)
        .filter_map(|li| li.value().attr("data-id").map(str::to_string))
        .collect()
}

fn seeded_app(tag: &str) -> crate::tests::utils::TestApp {
    make_app(
        tag,
        ShareMode::Download,
        vec![
            record("old", "1 Rizal Ave", Some("Ana"), Some(stamp(3, 9))),
            record("morning", "2 Rizal Ave", Some("Ben"), Some(stamp(0, 8))),
            record("undated", "3 Rizal Ave", None, None),
            record("evening", "4 Rizal Ave", Some("Cy"), Some(stamp(0, 18))),
        ],
    )
}

#[test]
fn today_tab_is_the_default() {
    let app = seeded_app("history_today");
    let mut resp = get(&app, "/history");
    assert_eq!(resp.status(), 200);

    let html = body_string(&mut resp);
    assert_eq!(listed_ids(&html), vec!["evening", "morning"]);
    assert!(html.contains("Showing 2 of 4 records."));
}

#[test]
fn all_tab_lists_everything_newest_first_with_undated_last() {
    let app = seeded_app("history_all");
    let mut resp = get(&app, "/history?tab=All");
    let html = body_string(&mut resp);
    assert_eq!(listed_ids(&html), vec!["evening", "morning", "old", "undated"]);
    assert!(html.contains("No Owner Name Available"));
}

#[test]
fn feed_changes_show_up_on_next_request() {
    let app = seeded_app("history_live");
    get(&app, "/history?tab=All");

    app.feed.remove("old");
    app.feed
        .upsert(record("new", "5 Rizal Ave", None, Some(stamp(0, 20))));

    let html = body_string(&mut get(&app, "/history?tab=All"));
    assert_eq!(listed_ids(&html), vec!["new", "evening", "morning", "undated"]);
}

#[test]
fn unknown_tab_is_a_bad_request() {
    let app = seeded_app("history_bad_tab");
    let resp = get(&app, "/history?tab=Week");
    assert_eq!(resp.status(), 400);
}

#[test]
fn lost_feed_shows_banner_and_can_reconnect() {
    let app = seeded_app("history_reconnect");
    get(&app, "/history");

    app.feed.fail(FeedError::Stream("connection reset".into()));
    let html = body_string(&mut get(&app, "/history?tab=All"));
    assert!(html.contains("connection reset"));
    assert!(html.contains("reconnect=1"));
    assert_eq!(listed_ids(&html).len(), 4);

    let html = body_string(&mut get(&app, "/history?tab=All&reconnect=1"));
    assert!(!html.contains("connection reset"));
    assert_eq!(app.feed.subscriber_count(), 1);
}

#[test]
fn success_and_unknown_routes() {
    let app = seeded_app("history_misc");
    let html = body_string(&mut get(&app, "/success"));
    assert!(html.contains("Recycle Waste Collected Successfully!"));

    assert_eq!(get(&app, "/nope").status(), 404);
}
