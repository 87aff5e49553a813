pub mod projection;
pub mod session;

pub use projection::{project, Projection, Tab};
pub use session::HistorySession;
