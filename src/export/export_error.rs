use std::error::Error;
use std::fmt;

/// Why one export invocation stopped (or, for `Persist`, what went wrong
/// while it carried on). Every variant has its own user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    PermissionDenied(String),
    Render(String),
    Integrity(String),
    Persist(String),
    Share(String),
}

impl ExportError {
    /// Stable label stored in the export ledger.
    pub fn kind(&self) -> &'static str {
        match self {
            ExportError::PermissionDenied(_) => "permission_denied",
            ExportError::Render(_) => "render_failed",
            ExportError::Integrity(_) => "artifact_missing",
            ExportError::Persist(_) => "persist_failed",
            ExportError::Share(_) => "share_failed",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            ExportError::PermissionDenied(_) => "Storage permission is required to save files.",
            ExportError::Render(_) => "Failed to create the PDF report. Please try again.",
            ExportError::Integrity(_) => "The PDF report could not be found after it was created. Please try again.",
            ExportError::Persist(_) => "Failed to save the PDF to the album.",
            ExportError::Share(_) => "Failed to share the PDF. Please try again.",
        }
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::PermissionDenied(msg) => write!(f, "Permission denied: {msg}"),
            ExportError::Render(msg) => write!(f, "Render error: {msg}"),
            ExportError::Integrity(msg) => write!(f, "Artifact missing: {msg}"),
            ExportError::Persist(msg) => write!(f, "Persist error: {msg}"),
            ExportError::Share(msg) => write!(f, "Share error: {msg}"),
        }
    }
}

impl Error for ExportError {}
