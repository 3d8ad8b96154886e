//! Core types for the intake service

pub mod doc_status;
pub mod response;

pub use doc_status::{DocStatus, DocStatusRecord};
pub use response::{InsertResponse, InsertStatus, StatusesResponse, TrackStatusResponse};
