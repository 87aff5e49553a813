// errors.rs
use crate::export::ExportError;
use std::fmt;

/// Errors surfaced by the HTTP layer: its own (routing, bad input) or
/// bubbled up from the ledger or an export. Feed errors never end a request;
/// the history page shows them as a banner instead.
#[derive(Debug)]
pub enum ServerError {
    NotFound,
    BadRequest(String),
    DbError(String),
    InternalError,
    Export(ExportError),
}

impl ServerError {
    pub fn status(&self) -> u16 {
        match self {
            ServerError::NotFound => 404,
            ServerError::BadRequest(_) => 400,
            ServerError::Export(ExportError::PermissionDenied(_)) => 403,
            ServerError::DbError(_) | ServerError::InternalError | ServerError::Export(_) => 500,
        }
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::NotFound => write!(f, "Not Found"),
            ServerError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            ServerError::DbError(msg) => write!(f, "Database Error: {msg}"),
            ServerError::InternalError => write!(f, "Internal Server Error"),
            ServerError::Export(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<ExportError> for ServerError {
    fn from(e: ExportError) -> Self {
        ServerError::Export(e)
    }
}
