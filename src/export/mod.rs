//! Renders the active projection to a PDF and hands it to the user.

pub mod capabilities;
pub mod document;
mod export_error;
pub mod pdf;
pub mod pipeline;

pub use capabilities::{
    AlbumLibrary, ArtifactRef, DirectoryPermission, DownloadShare, FsArtifactStore,
    UnavailableShare,
};
pub use document::ReportDocument;
pub use export_error::ExportError;
pub use pdf::PdfRenderer;
pub use pipeline::{ExportPipeline, ExportReport, ExportStage, ShareOutcome};
