//! # API REST
//!
//! REST API implementation for QPhotos.
//!
//! Handles:
//! - HTTP endpoints with axum, as used by the mobile client and the web UI
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (multipart uploads, JSON, CORS, request limits)
//!
//! Uses `api-shared` for the request and response bodies. The process
//! bootstrap (configuration, logging, listening) lives in the `qphotos-run` binary.

#![warn(rust_2018_idioms)]

mod error;
mod handlers;

pub use error::ApiError;

use api_shared::{BrowseItem, ErrorRes, HealthRes, LastProjectRes, RenameReq, SuccessRes};
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use qphotos_core::PhotoStore;
use qphotos_media::ThumbnailService;
use std::sync::Arc;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Default request body limit for uploads (50 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Default number of requests served at the same time.
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 8;

/// Application state for the REST API server
///
/// Shared by all request handlers. Both services point at the same
/// [`PhotoStore`], so every mutation goes through one mutation lock.
#[derive(Clone)]
pub struct AppState {
    store: Arc<PhotoStore>,
    thumbnails: Arc<ThumbnailService>,
}

impl AppState {
    pub fn new(store: Arc<PhotoStore>) -> Self {
        let thumbnails = Arc::new(ThumbnailService::new(store.clone()));
        Self { store, thumbnails }
    }
}

/// Limits applied to incoming requests.
#[derive(Debug, Clone, Copy)]
pub struct ServerLimits {
    pub max_upload_bytes: usize,
    pub max_concurrent_requests: usize,
}

impl Default for ServerLimits {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::upload,
        handlers::rename_project,
        handlers::delete_project,
        handlers::delete_photo,
        handlers::last_project,
        handlers::projects_current_month,
        handlers::browse_root,
        handlers::browse_path,
        handlers::serve_upload,
        handlers::serve_thumbnail,
    ),
    components(schemas(
        HealthRes,
        SuccessRes,
        ErrorRes,
        RenameReq,
        LastProjectRes,
        BrowseItem,
        handlers::UploadForm,
    ))
)]
struct ApiDoc;

/// Builds the QPhotos router with its middleware.
///
/// Paths after `/project/`, `/browse/`, `/uploads/`, `/thumbnail/` and
/// `/photo/` are logical paths relative to the storage root, e.g.
/// `09 SETIEMBRE/Wedding/2025-09-10/abc123.jpg`.
pub fn router(state: AppState, limits: ServerLimits) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/upload",
            post(handlers::upload).layer(DefaultBodyLimit::max(limits.max_upload_bytes)),
        )
        .route(
            "/project/*path",
            put(handlers::rename_project).delete(handlers::delete_project),
        )
        .route("/last-project", get(handlers::last_project))
        .route(
            "/projects_current_month",
            get(handlers::projects_current_month),
        )
        .route("/browse", get(handlers::browse_root))
        .route("/browse/", get(handlers::browse_root))
        .route("/browse/*path", get(handlers::browse_path))
        .route("/uploads/*path", get(handlers::serve_upload))
        .route("/thumbnail/*path", get(handlers::serve_thumbnail))
        .route("/photo/*path", delete(handlers::delete_photo))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(GlobalConcurrencyLimitLayer::new(
            limits.max_concurrent_requests,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use qphotos_core::{CoreConfig, InMemoryLastProjectStore};
    use qphotos_media::{PassthroughAnnotator, WatermarkAnnotator};
    use serde_json::{json, Value};
    use std::fs;
    use std::io::Cursor;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const BOUNDARY: &str = "qphotos-test-boundary";

    struct TestApp {
        _temp: TempDir,
        store: Arc<PhotoStore>,
        app: Router,
    }

    impl TestApp {
        fn root(&self) -> PathBuf {
            self.store.resolver().root().to_path_buf()
        }

        async fn send(&self, req: Request<Body>) -> (StatusCode, Vec<u8>) {
            let resp = self.app.clone().oneshot(req).await.unwrap();
            let status = resp.status();
            let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
                .await
                .unwrap();
            (status, body.to_vec())
        }

        async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
            let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let (status, body) = self.send(req).await;
            (status, serde_json::from_slice(&body).unwrap())
        }

        async fn delete_json(&self, uri: &str) -> (StatusCode, Value) {
            let req = Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            let (status, body) = self.send(req).await;
            (status, serde_json::from_slice(&body).unwrap())
        }

        async fn rename(&self, uri: &str, body: Value) -> (StatusCode, Value) {
            let req = Request::builder()
                .method("PUT")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap();
            let (status, body) = self.send(req).await;
            (status, serde_json::from_slice(&body).unwrap())
        }

        async fn upload(&self, fields: &[(&str, &[u8])]) -> (StatusCode, Value) {
            let req = Request::builder()
                .method("POST")
                .uri("/upload")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(multipart_body(fields)))
                .unwrap();
            let (status, body) = self.send(req).await;
            (status, serde_json::from_slice(&body).unwrap())
        }

        /// Writes a photo directly into the hierarchy and returns its logical path.
        fn place_photo(&self, relative: &str, bytes: &[u8]) -> String {
            let path = self.root().join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, bytes).unwrap();
            relative.to_owned()
        }
    }

    fn test_app_with(annotator: Arc<dyn qphotos_core::Annotator>) -> TestApp {
        let temp = TempDir::new().unwrap();
        let cfg = CoreConfig::new(temp.path().join("upload"), temp.path().join("lp.txt")).unwrap();
        let store = Arc::new(
            PhotoStore::new(
                Arc::new(cfg),
                annotator,
                Arc::new(InMemoryLastProjectStore::default()),
            )
            .unwrap(),
        );
        let app = router(AppState::new(store.clone()), ServerLimits::default());
        TestApp {
            _temp: temp,
            store,
            app,
        }
    }

    fn test_app() -> TestApp {
        test_app_with(Arc::new(PassthroughAnnotator))
    }

    fn multipart_body(fields: &[(&str, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            if *name == "file" {
                body.extend_from_slice(
                    b"Content-Disposition: form-data; name=\"file\"; filename=\"photo.jpg\"\r\n\
                      Content-Type: image/jpeg\r\n\r\n",
                );
            } else {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
            }
            body.extend_from_slice(value);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([180, 40, 40]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    /// Walks month, project and day to the only stored photo.
    fn only_photo(store: &PhotoStore) -> String {
        let mut path = String::new();
        for _ in 0..4 {
            let entries = store.browse(&path).unwrap();
            assert_eq!(entries.len(), 1, "expected a single entry under {path:?}");
            path = entries[0].path.clone();
        }
        path
    }

    #[tokio::test]
    async fn test_health_ok() {
        let app = test_app();
        let (status, body) = app.get_json("/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true, "message": "QPhotos is alive" }));
    }

    #[tokio::test]
    async fn test_upload_stores_then_ignores_duplicate() {
        let app = test_app();
        let fields: &[(&str, &[u8])] = &[
            ("uuid", b"abc123"),
            ("project_name", b"Wedding"),
            ("file", b"photo-bytes"),
        ];

        let (status, body) = app.upload(fields).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": "File uploaded successfully." }));

        let (status, body) = app.upload(fields).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": "Duplicate ignored." }));

        let photo = only_photo(&app.store);
        assert!(photo.contains("/Wedding/") && photo.ends_with("/abc123.jpg"));
        assert_eq!(fs::read(app.root().join(&photo)).unwrap(), b"photo-bytes");

        let (_, body) = app.get_json("/last-project").await;
        assert_eq!(body, json!({ "last_project": "Wedding" }));

        let (_, body) = app.get_json("/projects_current_month").await;
        assert_eq!(body, json!(["Wedding"]));
    }

    #[tokio::test]
    async fn test_upload_validation_errors() {
        let app = test_app();

        let (status, body) = app
            .upload(&[("project_name", b"Wedding"), ("file", b"x")])
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Missing unique ID (uuid)" }));

        let (status, body) = app
            .upload(&[("uuid", b"abc"), ("project_name", b"Wedding")])
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "No file part in the request" }));

        let (status, body) = app
            .upload(&[("uuid", b"abc"), ("project_name", b"   "), ("file", b"x")])
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Missing file or project name" }));

        assert!(app.store.browse("").unwrap().is_empty());
        let (_, body) = app.get_json("/last-project").await;
        assert_eq!(body, json!({ "last_project": "" }));
    }

    #[tokio::test]
    async fn test_upload_of_non_image_fails_with_watermarking() {
        let app = test_app_with(Arc::new(WatermarkAnnotator::with_font_data(None)));

        let (status, body) = app
            .upload(&[
                ("uuid", b"abc"),
                ("project_name", b"Wedding"),
                ("file", b"not an image"),
            ])
            .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_upload_with_watermarking_stores_jpeg() {
        let app = test_app_with(Arc::new(WatermarkAnnotator::with_font_data(None)));
        let photo_bytes = png(64, 32);

        let (status, _) = app
            .upload(&[
                ("uuid", b"abc"),
                ("project_name", b"Wedding"),
                ("file", photo_bytes.as_slice()),
            ])
            .await;
        assert_eq!(status, StatusCode::OK);

        let photo = only_photo(&app.store);
        let req = Request::builder()
            .uri(format!("/uploads/{}", photo.replace(' ', "%20")))
            .body(Body::empty())
            .unwrap();
        let resp = app.app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/jpeg");
    }

    #[tokio::test]
    async fn test_browse_lists_classified_entries() {
        let app = test_app();
        app.place_photo("09 SETIEMBRE/Wedding/2025-09-10/abc123.jpg", b"x");
        app.place_photo("11 NOVIEMBRE/Obra/2025-11-01/def.jpg", b"x");

        let (status, body) = app.get_json("/browse/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([
                { "name": "11 NOVIEMBRE", "path": "11 NOVIEMBRE", "type": "month" },
                { "name": "09 SETIEMBRE", "path": "09 SETIEMBRE", "type": "month" }
            ])
        );

        let (_, body) = app.get_json("/browse").await;
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (status, body) = app.get_json("/browse/09%20SETIEMBRE/Wedding").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{
                "name": "2025-09-10",
                "path": "09 SETIEMBRE/Wedding/2025-09-10",
                "type": "day"
            }])
        );

        let (_, body) = app
            .get_json("/browse/09%20SETIEMBRE/Wedding/2025-09-10")
            .await;
        assert_eq!(body[0]["type"], "photo");
        assert_eq!(body[0]["path"], "09 SETIEMBRE/Wedding/2025-09-10/abc123.jpg");
    }

    #[tokio::test]
    async fn test_browse_errors() {
        let app = test_app();

        let (status, body) = app.get_json("/browse/01%20ENERO").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());

        let (status, _) = app.get_json("/browse/%2E%2E/%2E%2E/etc").await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app.get_json("/browse/%2E%2E/upload").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_rename_project_folder() {
        let app = test_app();
        app.place_photo("09 SETIEMBRE/Wedding/2025-09-10/a.jpg", b"x");
        app.place_photo("09 SETIEMBRE/Obra/2025-09-10/b.jpg", b"x");

        let (status, body) = app
            .rename("/project/09%20SETIEMBRE/Wedding", json!({ "new_name": "Boda" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": "Project renamed" }));
        assert!(app.root().join("09 SETIEMBRE/Boda/2025-09-10/a.jpg").is_file());

        let (status, _) = app
            .rename("/project/09%20SETIEMBRE/Boda", json!({ "new_name": "Obra" }))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = app
            .rename("/project/09%20SETIEMBRE/Boda", json!({ "new_name": "  " }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "New name not provided" }));

        let (status, _) = app
            .rename("/project/09%20SETIEMBRE/Nope", json!({ "new_name": "X" }))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app
            .rename("/project/%2E%2E/outside", json!({ "new_name": "X" }))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_delete_project_and_photo() {
        let app = test_app();
        let photo = app.place_photo("09 SETIEMBRE/Wedding/2025-09-10/a.jpg", b"x");
        app.place_photo("09 SETIEMBRE/Obra/2025-09-10/b.jpg", b"x");

        let (status, body) = app
            .delete_json("/photo/09%20SETIEMBRE/Wedding/2025-09-10/a.jpg")
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": format!("Photo '{photo}' deleted.") }));
        assert!(!app.root().join(&photo).exists());

        let (status, _) = app.delete_json("/photo/09%20SETIEMBRE/Obra").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = app.delete_json("/project/09%20SETIEMBRE/Obra").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "success": "Project '09 SETIEMBRE/Obra' deleted." })
        );
        assert!(!app.root().join("09 SETIEMBRE/Obra").exists());

        let (status, _) = app.delete_json("/project/09%20SETIEMBRE/Obra").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_serve_upload_sniffs_content_type() {
        let app = test_app();
        app.place_photo("09 SETIEMBRE/Wedding/2025-09-10/a.jpg", &png(8, 8));
        app.place_photo("09 SETIEMBRE/Wedding/2025-09-10/b.jpg", b"plain bytes");

        let req = Request::builder()
            .uri("/uploads/09%20SETIEMBRE/Wedding/2025-09-10/a.jpg")
            .body(Body::empty())
            .unwrap();
        let resp = app.app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/png");

        let req = Request::builder()
            .uri("/uploads/09%20SETIEMBRE/Wedding/2025-09-10/b.jpg")
            .body(Body::empty())
            .unwrap();
        let resp = app.app.clone().oneshot(req).await.unwrap();
        assert_eq!(
            resp.headers()[header::CONTENT_TYPE],
            "application/octet-stream"
        );

        let req = Request::builder()
            .uri("/uploads/09%20SETIEMBRE/Wedding/2025-09-10/missing.jpg")
            .body(Body::empty())
            .unwrap();
        let (status, _) = app.send(req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_serve_thumbnail_bounds_size() {
        let app = test_app();
        app.place_photo("09 SETIEMBRE/Wedding/2025-09-10/a.jpg", &png(800, 600));
        app.place_photo("09 SETIEMBRE/Wedding/2025-09-10/bad.jpg", b"not an image");

        let req = Request::builder()
            .uri("/thumbnail/09%20SETIEMBRE/Wedding/2025-09-10/a.jpg")
            .body(Body::empty())
            .unwrap();
        let resp = app.app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/jpeg");
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let thumb = image::load_from_memory(&body).unwrap();
        assert_eq!((thumb.width(), thumb.height()), (400, 300));

        let req = Request::builder()
            .uri("/thumbnail/09%20SETIEMBRE/Wedding/2025-09-10/bad.jpg")
            .body(Body::empty())
            .unwrap();
        let (status, _) = app.send(req).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let req = Request::builder()
            .uri("/thumbnail/09%20SETIEMBRE/Wedding/2025-09-10/none.jpg")
            .body(Body::empty())
            .unwrap();
        let (status, _) = app.send(req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let app = test_app();
        let (status, body) = app.get_json("/api-docs/openapi.json").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/upload"].is_object());
        assert!(body["paths"]["/browse/{path}"].is_object());
    }
}
