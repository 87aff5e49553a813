// src/state.rs
use crate::config::{AppConfig, ShareMode};
use crate::db::connection::Database;
use crate::export::capabilities::ShareTarget;
use crate::export::{
    AlbumLibrary, DirectoryPermission, DownloadShare, ExportPipeline, FsArtifactStore, PdfRenderer,
    UnavailableShare,
};
use crate::feed::{CollectionFeed, FeedError, FirebaseFeed, MemoryFeed};
use crate::history::HistorySession;
use std::sync::Mutex;

pub type SharedFeed = Box<dyn CollectionFeed + Send + Sync>;

/// Everything a request handler needs. One history session for the process,
/// one export pipeline, guarded so a single export runs at a time.
pub struct AppState {
    pub db: Database,
    pub feed: SharedFeed,
    pub session: Mutex<HistorySession>,
    pub exporter: Mutex<ExportPipeline>,
}

impl AppState {
    pub fn new(config: &AppConfig, db: Database, feed: SharedFeed) -> Self {
        let session = HistorySession::open(feed.as_ref());
        let exporter = match config.share {
            ShareMode::Download => build_pipeline(config, &db, DownloadShare),
            ShareMode::None => build_pipeline(config, &db, UnavailableShare),
        };

        Self {
            db,
            feed,
            session: Mutex::new(session),
            exporter: Mutex::new(exporter),
        }
    }
}

/// Remote stream when a database URL is configured, otherwise the in-memory
/// collection (optionally seeded from a JSON export).
pub fn build_feed(config: &AppConfig) -> Result<SharedFeed, FeedError> {
    if let Some(url) = &config.database_url {
        let feed = FirebaseFeed::new(url, &config.collection_path, config.order_by.as_deref())?;
        log::info!("using realtime database feed {}", feed.endpoint());
        return Ok(Box::new(feed));
    }

    log::warn!("RECYCLE_DATABASE_URL not set, using in-memory feed");
    let feed = match &config.seed_file {
        Some(path) => MemoryFeed::from_seed_file(path)?,
        None => MemoryFeed::new(),
    };
    Ok(Box::new(feed))
}

fn build_pipeline<S>(config: &AppConfig, db: &Database, share: S) -> ExportPipeline
where
    S: ShareTarget + Send + 'static,
{
    let pipeline = ExportPipeline::new(
        DirectoryPermission::new(&config.export_dir),
        PdfRenderer::new(&config.export_dir),
        FsArtifactStore,
        share,
    )
    .on_stage(|stage| log::info!("export: {stage}"));

    if config.media_library {
        let library = AlbumLibrary::new(config.export_dir.join("media"), db.clone());
        pipeline.with_media_library(library, config.album.clone())
    } else {
        pipeline
    }
}
