//! HTTP server for the intake service

pub mod routes;
pub mod state;

use axum::{routing::get, Router};
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::IntakeConfig;
use crate::error::Result;
use state::AppState;

/// Intake HTTP server
pub struct IntakeServer {
    config: IntakeConfig,
    state: AppState,
}

impl IntakeServer {
    /// Create a server with the bundled status store and a no-op pipeline
    pub async fn new(config: IntakeConfig) -> Result<Self> {
        let state = AppState::new(config.clone()).await?;
        Ok(Self { config, state })
    }

    /// Create a server around existing state (injected collaborators)
    pub fn with_state(config: IntakeConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let router = Router::new()
            // Health checks
            .route("/health", get(health_check))
            .route("/ready", get(readiness))
            // Document routes with body limit for uploads
            .nest(
                "/documents",
                routes::document_routes(self.config.server.max_upload_size),
            )
            .with_state(self.state.clone())
            // Middleware layers (order matters - applied bottom to top)
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new());

        if self.config.server.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            router.layer(cors)
        } else {
            router
        }
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.server.host, self.config.server.port)
            .parse()
            .map_err(|e| crate::error::Error::Config(format!("Invalid address: {}", e)))?;

        let router = self.build_router();

        tracing::info!("Starting intake server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| crate::error::Error::Config(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| crate::error::Error::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Readiness check endpoint
async fn readiness(state: axum::extract::State<AppState>) -> axum::http::StatusCode {
    if state.is_ready() {
        axum::http::StatusCode::OK
    } else {
        axum::http::StatusCode::SERVICE_UNAVAILABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InsertResponse, InsertStatus};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn test_server(tmp: &TempDir) -> IntakeServer {
        let mut config = IntakeConfig::default();
        config.storage.input_dir = tmp.path().join("inputs");
        config.storage.working_dir = tmp.path().join("storage");

        IntakeServer::new(config).await.unwrap()
    }

    fn multipart_body(boundary: &str, filename: &str, content: &str, metadata: Option<&str>) -> String {
        let mut body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: application/octet-stream\r\n\r\n{c}\r\n",
            b = boundary,
            f = filename,
            c = content
        );
        if let Some(meta) = metadata {
            body.push_str(&format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"metadata\"\r\n\r\n{m}\r\n",
                b = boundary,
                m = meta
            ));
        }
        body.push_str(&format!("--{}--\r\n", boundary));
        body
    }

    fn upload_request(boundary: &str, body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/documents/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn health_and_readiness_respond() {
        let tmp = TempDir::new().unwrap();
        let router = test_server(&tmp).await.build_router();

        let response = router
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn upload_route_accepts_multipart_uploads() {
        let tmp = TempDir::new().unwrap();
        let server = test_server(&tmp).await;
        let router = server.build_router();

        let boundary = "intake-test-boundary";
        let body = multipart_body(boundary, "notes.txt", "hello world", Some(r#"{"author": "Ada"}"#));

        let response = router
            .oneshot(upload_request(boundary, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let insert: InsertResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(insert.status, InsertStatus::Success);
        assert!(insert.track_id.starts_with("upload_"));

        assert!(tmp.path().join("inputs/notes.txt").exists());
        assert!(tmp.path().join("inputs/notes.txt.meta.json").exists());
    }

    #[tokio::test]
    async fn unsupported_uploads_get_a_400_with_detail() {
        let tmp = TempDir::new().unwrap();
        let router = test_server(&tmp).await.build_router();

        let boundary = "intake-test-boundary";
        let body = multipart_body(boundary, "tool.exe", "MZ", None);

        let response = router
            .oneshot(upload_request(boundary, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(error["detail"]
            .as_str()
            .unwrap()
            .contains("Unsupported file type"));
    }

    #[tokio::test]
    async fn repeated_uploads_report_duplicated() {
        let tmp = TempDir::new().unwrap();
        let server = test_server(&tmp).await;
        let router = server.build_router();

        let boundary = "intake-test-boundary";

        let first = router
            .clone()
            .oneshot(upload_request(
                boundary,
                multipart_body(boundary, "dup.txt", "content", None),
            ))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = router
            .oneshot(upload_request(
                boundary,
                multipart_body(boundary, "dup.txt", "content", None),
            ))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(second.into_body(), usize::MAX)
            .await
            .unwrap();
        let insert: InsertResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(insert.status, InsertStatus::Duplicated);
        assert!(insert.track_id.is_empty());
    }

    #[tokio::test]
    async fn unknown_track_ids_get_a_404() {
        let tmp = TempDir::new().unwrap();
        let router = test_server(&tmp).await.build_router();

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/documents/track_status/upload_missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
