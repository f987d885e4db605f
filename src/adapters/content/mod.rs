pub mod json_content_store;
