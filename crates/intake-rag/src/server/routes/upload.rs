//! Document upload endpoint

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::ingest::{metadata, sanitize_filename};
use crate::server::state::AppState;
use crate::tracking::generate_track_id;
use crate::types::InsertResponse;

/// POST /documents/upload - Upload a file into the input directory
///
/// Accepts a multipart form with a `file` field and an optional `metadata`
/// text field. The file is validated, persisted, and handed to the indexing
/// worker; the response carries a tracking id for status polling.
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<InsertResponse>> {
    let mut filename: Option<String> = None;
    let mut data: Option<Bytes> = None;
    let mut metadata_str: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Internal(format!("Failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "metadata" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| Error::Internal(format!("Failed to read metadata: {}", e)))?;
                metadata_str = Some(text);
            }
            "file" => {
                filename = Some(
                    field
                        .file_name()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| format!("file_{}.bin", Uuid::new_v4())),
                );
                data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| Error::Internal(format!("Failed to read file: {}", e)))?,
                );
            }
            other => {
                tracing::debug!("Ignoring unexpected multipart field '{}'", other);
            }
        }
    }

    let (filename, data) = match (filename, data) {
        (Some(filename), Some(data)) => (filename, data),
        _ => return Err(Error::Internal("No file field in upload".to_string())),
    };

    match handle_upload(&state, &filename, data, metadata_str.as_deref()).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            tracing::error!("Error /documents/upload: {}: {}", filename, e);
            Err(e)
        }
    }
}

/// Core upload sequence, separated from multipart extraction so it can be
/// driven directly in tests and by other ingestion fronts.
pub async fn handle_upload(
    state: &AppState,
    original_filename: &str,
    data: Bytes,
    metadata_str: Option<&str>,
) -> Result<InsertResponse> {
    let manager = state.doc_manager();

    let safe_filename = sanitize_filename(original_filename, manager.input_dir())?;

    if !manager.is_supported_file(&safe_filename) {
        return Err(Error::UnsupportedFileType(format!(
            "Unsupported file type. Supported types: {}",
            manager.supported_extensions().join(", ")
        )));
    }

    // Serialize the duplicate checks and the write against concurrent
    // uploads of the same filename.
    let _guard = state.path_locks().acquire(&safe_filename).await;

    // The status store is checked first (it knows documents whose files may
    // have moved on), the filesystem second (it knows files the store has
    // not seen yet). Neither check alone is sufficient.
    if let Some(existing) = state
        .doc_status()
        .get_doc_by_file_path(&safe_filename)
        .await?
    {
        return Ok(InsertResponse::duplicated(format!(
            "File '{}' already exists in document storage (Status: {}).",
            safe_filename,
            existing.status.as_str()
        )));
    }

    let file_path = manager.target_path(&safe_filename);
    if tokio::fs::try_exists(&file_path).await? {
        return Ok(InsertResponse::duplicated(format!(
            "File '{}' already exists in the input directory.",
            safe_filename
        )));
    }

    // Point of no return: once the file is written the upload is accepted.
    manager.persist_upload(&file_path, &data).await?;

    let track_id = generate_track_id("upload");

    // A metadata string that fails to parse is wrapped, never fatal; a
    // sidecar write failure still propagates after the file is saved.
    if let Some(raw) = metadata_str.filter(|m| !m.is_empty()) {
        let parsed = metadata::parse_or_wrap(raw);
        let sidecar = metadata::write_sidecar(&file_path, &parsed).await?;
        tracing::info!("Metadata saved for {}: {}", safe_filename, sidecar.display());
    }

    state.enqueue_index(file_path, track_id.clone()).await;

    Ok(InsertResponse::success(
        format!(
            "File '{}' uploaded successfully. Processing will continue in background.",
            safe_filename
        ),
        track_id,
    ))
}
