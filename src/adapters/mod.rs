pub mod content;
pub mod directory;
pub mod file_io;
pub mod ledger;
