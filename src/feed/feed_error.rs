use std::error::Error;
use std::fmt;

/// The live subscription could not be established, or it was lost.
/// Reported to the view; the feed never retries on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    Connect(String),
    Http(u16, String),
    Stream(String),
    Protocol(String),
    Cancelled(String),
    Closed,
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::Connect(msg) => write!(f, "Could not connect to the collection feed: {msg}"),
            FeedError::Http(status, msg) => write!(f, "Collection feed returned HTTP {status}: {msg}"),
            FeedError::Stream(msg) => write!(f, "Collection feed stream failed: {msg}"),
            FeedError::Protocol(msg) => write!(f, "Unexpected collection feed event: {msg}"),
            FeedError::Cancelled(reason) => write!(f, "Collection feed cancelled by server: {reason}"),
            FeedError::Closed => write!(f, "Collection feed closed"),
        }
    }
}

impl Error for FeedError {}
