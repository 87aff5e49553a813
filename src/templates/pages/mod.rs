pub mod export_saved;
pub mod history;
pub mod report;
pub mod success;

pub use export_saved::export_saved_page;
pub use history::{history_page, HistoryVm};
pub use report::report_page;
pub use success::success_page;
