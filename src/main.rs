use crate::config::AppConfig;
use crate::db::connection::{init_db, Database};
use crate::responses::error_to_response;
use crate::router::handle;
use crate::state::{build_feed, AppState};
use astra::Server;
use std::time::Duration;

mod config;
mod db;
mod domain;
mod errors;
mod export;
mod feed;
mod history;
mod responses;
mod router;
mod state;
mod templates;

#[cfg(test)]
mod tests;

const FIRST_SNAPSHOT_WAIT: Duration = Duration::from_secs(5);

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 1️⃣ Configuration
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    // 2️⃣ Export ledger
    let db = Database::new(&config.sqlite_path);
    if let Err(e) = init_db(&db, "sql/schema.sql") {
        log::error!("❌ Database initialization failed: {e}");
        std::process::exit(1);
    }

    // 3️⃣ Collection feed and history session
    let feed = match build_feed(&config) {
        Ok(feed) => feed,
        Err(e) => {
            log::error!("❌ Collection feed unavailable: {e}");
            std::process::exit(1);
        }
    };
    let state = AppState::new(&config, db, feed);

    if let Ok(mut session) = state.session.lock() {
        match session.wait_for_update(FIRST_SNAPSHOT_WAIT) {
            Ok(true) => log::info!("loaded {} records", session.snapshot_len()),
            Ok(false) => log::warn!("no snapshot yet, serving an empty history"),
            Err(e) => log::error!("history feed failed at startup: {e}"),
        }
    }

    // 4️⃣ Serve
    log::info!("Starting server at http://{}", config.bind_addr);
    let server = Server::bind(&config.bind_addr).max_workers(8);

    let result = server.serve(move |req, _info| match handle(req, &state) {
        Ok(resp) => resp,
        Err(err) => error_to_response(err),
    });

    if let Err(e) = result {
        log::error!("Server ended with error: {e}");
    }

    log::info!("Server shut down cleanly.");
}
