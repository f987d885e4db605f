pub mod actor;
pub mod alias_identity;
pub mod audit_entry;
pub mod content_object;
pub mod decision;
