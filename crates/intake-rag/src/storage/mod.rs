//! Persistent storage for document status records

mod doc_status;

pub use doc_status::{DocStatusStore, JsonDocStatusStore};
