//! Tracking identifiers for accepted uploads

use chrono::Utc;
use uuid::Uuid;

/// Generate a tracking id scoped to one ingestion request.
///
/// The namespace prefix distinguishes ingestion paths (e.g. "upload" for
/// file uploads vs "insert" for text pastes) so a status poller can tell
/// where a document entered the system.
pub fn generate_track_id(prefix: &str) -> String {
    let timestamp = Utc::now().format("%Y%m%d%H%M%S");
    let unique = Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}", prefix, timestamp, &unique[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_ids_carry_the_namespace_prefix() {
        let id = generate_track_id("upload");
        assert!(id.starts_with("upload_"));
    }

    #[test]
    fn track_ids_are_unique_across_calls() {
        let a = generate_track_id("upload");
        let b = generate_track_id("upload");
        assert_ne!(a, b);
    }
}
