//! Status polling endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{DocStatus, DocStatusRecord, StatusesResponse, TrackStatusResponse};

/// GET /documents/track_status/:track_id - Progress of one upload
pub async fn track_status(
    State(state): State<AppState>,
    Path(track_id): Path<String>,
) -> Result<Json<TrackStatusResponse>> {
    let queue = state.index_queue().get_progress(&track_id);
    let documents = state.doc_status().get_docs_by_track_id(&track_id).await?;

    if queue.is_none() && documents.is_empty() {
        return Err(Error::TrackIdNotFound(track_id));
    }

    Ok(Json(TrackStatusResponse {
        track_id,
        queue,
        documents,
    }))
}

/// GET /documents/statuses - All known documents grouped by status
pub async fn statuses(State(state): State<AppState>) -> Result<Json<StatusesResponse>> {
    let mut grouped: HashMap<DocStatus, Vec<DocStatusRecord>> = HashMap::new();
    for record in state.doc_status().all().await? {
        grouped.entry(record.status).or_default().push(record);
    }

    Ok(Json(StatusesResponse {
        statuses: grouped,
        queue: state.index_queue().stats(),
    }))
}
