//! intake-rag: document intake service for a RAG system
//!
//! This crate is the upload-facing edge of a RAG deployment. It validates
//! incoming files, persists them (plus optional metadata sidecars) into an
//! input directory, and hands accepted files to an external indexing
//! pipeline through a fire-and-forget queue, returning a tracking id the
//! caller can poll for progress.

pub mod config;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod processing;
pub mod server;
pub mod storage;
pub mod tracking;
pub mod types;

pub use config::IntakeConfig;
pub use error::{Error, Result};
pub use types::{
    doc_status::{DocStatus, DocStatusRecord},
    response::{InsertResponse, InsertStatus},
};
