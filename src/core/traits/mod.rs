pub mod content_engine;
pub mod ledger;
pub mod user_directory;
