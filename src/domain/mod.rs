pub mod record;

pub use record::CollectionRecord;
