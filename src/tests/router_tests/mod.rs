mod export_tests;
mod history_tests;
mod report_tests;
