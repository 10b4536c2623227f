pub mod context;
pub mod entry;
pub mod translation;
