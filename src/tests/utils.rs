use crate::config::{AppConfig, ShareMode};
use crate::db::connection::{init_db, Database};
use crate::domain::record::CollectionRecord;
use crate::feed::MemoryFeed;
use crate::router::handle;
use crate::state::AppState;
use astra::{Body, Response};
use chrono::{Duration, Local};
use http::Method;
use std::io::Read;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

pub struct TestApp {
    pub state: AppState,
    pub feed: MemoryFeed,
    pub dir: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

/// Fresh temp directory holding the ledger database and the export folder.
pub fn temp_dir(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("recycle_{tag}_{nanos}"));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn make_app(tag: &str, share: ShareMode, records: Vec<CollectionRecord>) -> TestApp {
    let dir = temp_dir(tag);
    let config = AppConfig {
        export_dir: dir.join("exports"),
        sqlite_path: dir.join("ledger.sqlite"),
        share,
        ..AppConfig::default()
    };

    let db = Database::new(&config.sqlite_path);
    init_db(&db, "sql/schema.sql").expect("Failed to initialize DB");

    let feed = MemoryFeed::with_records(records);
    let state = AppState::new(&config, db, Box::new(feed.clone()));
    TestApp { state, feed, dir }
}

/// Unpadded `M/d/yyyy, h:mm:ss a`, as the app writes it, for a moment `days_ago` days before now, at `hour`.
pub fn stamp(days_ago: i64, hour: u32) -> String {
    let day = Local::now().date_naive() - Duration::days(days_ago);
    day.and_hms_opt(hour, 0, 0)
        .unwrap()
        .format("%-m/%-d/%Y, %-I:%M:%S %p")
        .to_string()
}

pub fn record(id: &str, address: &str, owner: Option<&str>, date_and_time: Option<String>) -> CollectionRecord {
    CollectionRecord {
        house_address: Some(address.to_string()),
        owner_name: owner.map(str::to_string),
        date_and_time,
        ..CollectionRecord::new(id)
    }
}

pub fn get(app: &TestApp, uri: &str) -> Response {
    let req = http::Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    match handle(req, &app.state) {
        Ok(resp) => resp,
        Err(err) => crate::responses::error_to_response(err),
    }
}

pub fn body_bytes(resp: &mut Response) -> Vec<u8> {
    let mut bytes = Vec::new();
    resp.body_mut().reader().read_to_end(&mut bytes).unwrap();
    bytes
}

pub fn body_string(resp: &mut Response) -> String {
    String::from_utf8(body_bytes(resp)).unwrap()
}
