pub mod catalog;
pub mod file_store;
