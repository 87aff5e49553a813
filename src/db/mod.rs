pub mod connection;
pub mod exports;
pub mod media;

pub use connection::{init_db, Database};
