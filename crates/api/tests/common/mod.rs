#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::{Method, Request, Response};
use catalog_api::config::ServerConfig;
use catalog_api::router::{build_app_router, App};
use catalog_api::state::AppState;
use catalog_core::status::EntityStatus;
use catalog_db::models::category::{Category, CreateCategory};
use catalog_db::repositories::CategoryRepo;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

/// Upload ceiling used by the test server.
pub const TEST_UPLOAD_MAX_BYTES: usize = 64 * 1024;

/// Build a test `ServerConfig` writing uploads under `upload_root`.
pub fn test_config(upload_root: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 30,
        upload_root,
        upload_max_bytes: TEST_UPLOAD_MAX_BYTES,
        image_quality: 50,
    }
}

/// A running test application and the directory its uploads land in.
///
/// The directory is deleted when this is dropped.
pub struct TestApp {
    pub app: App,
    pub uploads: TempDir,
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    /// A bodiless POST, as sent by the delete and restore buttons.
    pub async fn post(&self, uri: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_form(&self, uri: &str, form: MultipartBody) -> Response<Body> {
        self.send(form.into_request(uri)).await
    }

    /// Whether a stored image reference exists on disk.
    pub fn stored(&self, relative: &str) -> bool {
        self.uploads.path().join(relative).is_file()
    }

    /// Number of files stored under one image directory.
    pub fn stored_count(&self, directory: &str) -> usize {
        std::fs::read_dir(self.uploads.path().join(directory))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

/// Build the full application, using the given database pool and a fresh
/// temporary upload directory.
///
/// This goes through the same [`build_app_router`] as `main.rs` so
/// integration tests exercise the same middleware stack and method override
/// that production uses.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let uploads = tempfile::tempdir().unwrap();
    let state = AppState::new(pool, test_config(uploads.path().to_path_buf()));
    TestApp {
        app: build_app_router(state),
        uploads,
    }
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// The redirect target of a response.
pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(LOCATION)
        .expect("response should redirect")
        .to_str()
        .unwrap()
        .to_string()
}

/// The notice carried by a redirect to a listing page.
pub fn notice(response: &Response<Body>) -> String {
    let target = location(response);
    let (_, encoded) = target
        .split_once("?success=")
        .expect("redirect should carry a notice");
    urlencoding::decode(encoded).unwrap().into_owned()
}

// ---------------------------------------------------------------------------
// Multipart bodies
// ---------------------------------------------------------------------------

const BOUNDARY: &str = "catalog-test-boundary-7MA4YWxkTrZu0gW";

/// A `multipart/form-data` body as a browser would submit it.
#[derive(Default)]
pub struct MultipartBody {
    bytes: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                 filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.bytes.extend_from_slice(data);
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    /// The empty file part browsers send when no file was chosen.
    pub fn no_file(self, name: &str) -> Self {
        self.file(name, "", "application/octet-stream", b"")
    }

    pub fn into_request(mut self, uri: &str) -> Request<Body> {
        self.bytes
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(self.bytes))
            .unwrap()
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A small generated PNG.
pub fn png_bytes() -> Vec<u8> {
    encode(image::ImageFormat::Png)
}

/// A small generated JPEG.
pub fn jpeg_bytes() -> Vec<u8> {
    encode(image::ImageFormat::Jpeg)
}

fn encode(format: image::ImageFormat) -> Vec<u8> {
    let img = image::RgbImage::from_fn(8, 8, |x, y| image::Rgb([(x * 30) as u8, (y * 30) as u8, 90]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).unwrap();
    out.into_inner()
}

pub async fn seed_category(pool: &PgPool, name: &str, parent_id: Option<i64>) -> Category {
    seed_category_with_status(pool, name, parent_id, EntityStatus::Active).await
}

pub async fn seed_category_with_status(
    pool: &PgPool,
    name: &str,
    parent_id: Option<i64>,
    status: EntityStatus,
) -> Category {
    let slug = CategoryRepo::unique_slug(pool, name, None).await.unwrap();
    CategoryRepo::create(
        pool,
        &CreateCategory {
            name: name.to_string(),
            slug,
            parent_id,
            description: None,
            image_path: None,
            status,
        },
    )
    .await
    .unwrap()
}

/// A complete, valid product form for `category_id` with a PNG image.
pub fn product_form(name: &str, category_id: i64) -> MultipartBody {
    MultipartBody::new()
        .text("name", name)
        .text("description", "Comfortable and bright.")
        .text("price", "1234.5")
        .text("quantity", "3")
        .text("category_id", &category_id.to_string())
        .text("status", "active")
        .file("image", "shoe.png", "image/png", &png_bytes())
}
