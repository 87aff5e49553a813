// src/export/capabilities.rs
//
// The outside world the export pipeline talks to, one trait per capability,
// plus the implementations used when running as a local server.

use crate::db::connection::Database;
use crate::db::media;
use crate::export::document::ReportDocument;
use crate::export::ExportError;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Where a rendered artifact lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef(PathBuf);

impl ArtifactRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.as_os_str().is_empty()
    }

    pub fn file_name(&self) -> String {
        self.0
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "report.pdf".to_string())
    }
}

/// An artifact registered into the shared album.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetHandle {
    pub id: i64,
    pub album: String,
    pub path: PathBuf,
    pub sha256: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

pub trait PermissionGate {
    fn request_storage_permission(&self) -> Permission;
}

pub trait Renderer {
    fn render(&self, document: &ReportDocument) -> Result<ArtifactRef, ExportError>;
}

pub trait ArtifactStore {
    fn exists(&self, artifact: &ArtifactRef) -> bool;
}

pub trait MediaLibrary {
    fn register(&self, artifact: &ArtifactRef, album: &str) -> Result<AssetHandle, ExportError>;
}

pub trait ShareTarget {
    fn is_available(&self) -> bool;
    fn share(&self, artifact: &ArtifactRef) -> Result<(), ExportError>;
}

/// Grants storage access when the export directory exists (or can be made)
/// and is writable.
#[derive(Debug, Clone)]
pub struct DirectoryPermission {
    dir: PathBuf,
}

impl DirectoryPermission {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl PermissionGate for DirectoryPermission {
    fn request_storage_permission(&self) -> Permission {
        if let Err(e) = fs::create_dir_all(&self.dir) {
            log::warn!("cannot create {}: {e}", self.dir.display());
            return Permission::Denied;
        }
        match fs::metadata(&self.dir) {
            Ok(meta) if meta.is_dir() && !meta.permissions().readonly() => Permission::Granted,
            Ok(_) => Permission::Denied,
            Err(e) => {
                log::warn!("cannot stat {}: {e}", self.dir.display());
                Permission::Denied
            }
        }
    }
}

/// Local filesystem check: a regular, non-empty file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsArtifactStore;

impl ArtifactStore for FsArtifactStore {
    fn exists(&self, artifact: &ArtifactRef) -> bool {
        fs::metadata(artifact.path())
            .map(|m| m.is_file() && m.len() > 0)
            .unwrap_or(false)
    }
}

/// Album folders under one root, indexed in SQLite.
#[derive(Clone)]
pub struct AlbumLibrary {
    root: PathBuf,
    db: Database,
}

impl AlbumLibrary {
    pub fn new(root: impl Into<PathBuf>, db: Database) -> Self {
        Self {
            root: root.into(),
            db,
        }
    }
}

impl MediaLibrary for AlbumLibrary {
    fn register(&self, artifact: &ArtifactRef, album: &str) -> Result<AssetHandle, ExportError> {
        let bytes = fs::read(artifact.path())
            .map_err(|e| ExportError::Persist(format!("read {}: {e}", artifact.path().display())))?;
        let sha256 = format!("{:x}", Sha256::digest(&bytes));

        let album_dir = self.root.join(album);
        fs::create_dir_all(&album_dir)
            .map_err(|e| ExportError::Persist(format!("create album {album}: {e}")))?;

        let file_name = artifact.file_name();
        let target = album_dir.join(&file_name);
        fs::write(&target, &bytes)
            .map_err(|e| ExportError::Persist(format!("write {}: {e}", target.display())))?;

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);

        let target_str = target.to_string_lossy().into_owned();
        let id = self
            .db
            .with_conn(|conn| {
                media::insert_asset(conn, album, &file_name, &target_str, &sha256, now)
            })
            .map_err(|e| ExportError::Persist(e.to_string()))?;

        Ok(AssetHandle {
            id,
            album: album.to_string(),
            path: target,
            sha256,
        })
    }
}

/// Share target for the HTTP front end: the request that ran the export
/// streams its own artifact back as the download, so sharing only checks the
/// file can still be opened.
#[derive(Debug, Clone, Copy, Default)]
pub struct DownloadShare;

impl ShareTarget for DownloadShare {
    fn is_available(&self) -> bool {
        true
    }

    fn share(&self, artifact: &ArtifactRef) -> Result<(), ExportError> {
        fs::File::open(artifact.path())
            .map(|_| ())
            .map_err(|e| ExportError::Share(format!("open {}: {e}", artifact.path().display())))
    }
}

/// No share mechanism on this target.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableShare;

impl ShareTarget for UnavailableShare {
    fn is_available(&self) -> bool {
        false
    }

    fn share(&self, _artifact: &ArtifactRef) -> Result<(), ExportError> {
        Err(ExportError::Share("sharing is not available on this device".into()))
    }
}
