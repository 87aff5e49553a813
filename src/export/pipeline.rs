// src/export/pipeline.rs
use crate::export::capabilities::{
    ArtifactRef, ArtifactStore, AssetHandle, MediaLibrary, Permission, PermissionGate, Renderer,
    ShareTarget,
};
use crate::export::document::ReportDocument;
use crate::export::ExportError;
use crate::history::session::{local_now, Clock};
use crate::history::Projection;
use std::fmt;

/// Where one export invocation currently is. `Idle` before and after a run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExportStage {
    #[default]
    Idle,
    RequestingPermission,
    Building,
    Rendering,
    Verifying,
    Persisting,
    Sharing,
    Done,
    Failed(ExportError),
}

impl ExportStage {
    pub fn label(&self) -> &'static str {
        match self {
            ExportStage::Idle => "idle",
            ExportStage::RequestingPermission => "requesting permission",
            ExportStage::Building => "building",
            ExportStage::Rendering => "rendering",
            ExportStage::Verifying => "verifying",
            ExportStage::Persisting => "persisting",
            ExportStage::Sharing => "sharing",
            ExportStage::Done => "done",
            ExportStage::Failed(_) => "failed",
        }
    }

    /// True while a presentation layer should show a busy indicator.
    pub fn is_busy(&self) -> bool {
        !matches!(
            self,
            ExportStage::Idle | ExportStage::Done | ExportStage::Failed(_)
        )
    }
}

impl fmt::Display for ExportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportStage::Failed(e) => write!(f, "failed ({})", e.kind()),
            other => f.write_str(other.label()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    /// No share mechanism on this platform. Informational, not a failure.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub artifact: ArtifactRef,
    pub rows: usize,
    pub asset: Option<AssetHandle>,
    /// Set when album registration failed; Share was still attempted.
    pub persist_error: Option<ExportError>,
    pub share: ShareOutcome,
}

pub type StageObserver = Box<dyn FnMut(&ExportStage) + Send>;

/// Permission, build, render, verify, persist, share, in that order.
///
/// A failing step ends the invocation and later steps are skipped, except a
/// persist failure which is recorded and followed by Share. Without a media
/// library the persist step is skipped. Each `run` starts over from scratch.
pub struct ExportPipeline {
    permission: Box<dyn PermissionGate + Send>,
    renderer: Box<dyn Renderer + Send>,
    store: Box<dyn ArtifactStore + Send>,
    media: Option<(Box<dyn MediaLibrary + Send>, String)>,
    share: Box<dyn ShareTarget + Send>,
    stage: ExportStage,
    observer: Option<StageObserver>,
    clock: Clock,
}

impl ExportPipeline {
    pub fn new(
        permission: impl PermissionGate + Send + 'static,
        renderer: impl Renderer + Send + 'static,
        store: impl ArtifactStore + Send + 'static,
        share: impl ShareTarget + Send + 'static,
    ) -> Self {
        Self {
            permission: Box::new(permission),
            renderer: Box::new(renderer),
            store: Box::new(store),
            media: None,
            share: Box::new(share),
            stage: ExportStage::Idle,
            observer: None,
            clock: Box::new(local_now),
        }
    }

    pub fn with_media_library(
        mut self,
        library: impl MediaLibrary + Send + 'static,
        album: impl Into<String>,
    ) -> Self {
        self.media = Some((Box::new(library), album.into()));
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn on_stage<F>(mut self, observer: F) -> Self
    where
        F: FnMut(&ExportStage) + Send + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn stage(&self) -> &ExportStage {
        &self.stage
    }

    pub fn run(&mut self, projection: &Projection) -> Result<ExportReport, ExportError> {
        let result = self.run_stages(projection);

        match &result {
            Ok(report) => {
                log::info!(
                    "✅ export of {} rows done ({:?})",
                    report.rows,
                    report.share
                );
                self.enter(ExportStage::Done);
            }
            Err(e) => {
                log::error!("❌ export failed: {e}");
                self.enter(ExportStage::Failed(e.clone()));
            }
        }

        self.enter(ExportStage::Idle);
        result
    }

    fn run_stages(&mut self, projection: &Projection) -> Result<ExportReport, ExportError> {
        self.enter(ExportStage::RequestingPermission);
        if self.permission.request_storage_permission() == Permission::Denied {
            return Err(ExportError::PermissionDenied(
                "storage permission refused".into(),
            ));
        }

        self.enter(ExportStage::Building);
        let document = ReportDocument::build(&projection.records, projection.tab, (self.clock)());

        self.enter(ExportStage::Rendering);
        let artifact = self.renderer.render(&document)?;
        if artifact.is_empty() {
            return Err(ExportError::Render("renderer returned no artifact".into()));
        }

        self.enter(ExportStage::Verifying);
        if !self.store.exists(&artifact) {
            return Err(ExportError::Integrity(format!(
                "{} does not exist",
                artifact.path().display()
            )));
        }

        let (asset, persist_error) = if self.media.is_some() {
            self.enter(ExportStage::Persisting);
            match self.persist(&artifact) {
                Ok(asset) => (asset, None),
                Err(e) => {
                    log::warn!("⚠️ {e}; continuing to share");
                    (None, Some(e))
                }
            }
        } else {
            log::debug!("no media library, skipping persist");
            (None, None)
        };

        self.enter(ExportStage::Sharing);
        let share = if self.share.is_available() {
            self.share.share(&artifact)?;
            ShareOutcome::Shared
        } else {
            log::warn!("sharing is not available on this device");
            ShareOutcome::Unavailable
        };

        Ok(ExportReport {
            artifact,
            rows: document.rows.len(),
            asset,
            persist_error,
            share,
        })
    }

    fn persist(&self, artifact: &ArtifactRef) -> Result<Option<AssetHandle>, ExportError> {
        let Some((library, album)) = &self.media else {
            return Ok(None);
        };
        library.register(artifact, album).map(Some)
    }

    fn enter(&mut self, stage: ExportStage) {
        log::debug!("export stage -> {stage}");
        if let Some(observer) = self.observer.as_mut() {
            observer(&stage);
        }
        self.stage = stage;
    }
}
