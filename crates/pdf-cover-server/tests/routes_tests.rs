use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use image::{Rgba, RgbaImage};
use lopdf::{Dictionary, Document, Object, Stream};
use pdf_cover::{ComposeError, DocumentInfo, PageRasterizer, Size};
use pdf_cover_server::{AppConfig, AppState, router};
use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "pdfcover-test-boundary";

fn create_test_pdf(num_pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for i in 0..num_pages {
        let content = format!("BT /F1 12 Tf 72 720 Td (Page {}) Tj ET", i + 1);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(600 + i as i64),
                    Object::Integer(792),
                ]),
            ),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Paints every page grey at its nominal size
struct GreyRasterizer {
    info: DocumentInfo,
}

impl PageRasterizer for GreyRasterizer {
    fn page_count(&self) -> usize {
        self.info.page_count()
    }

    fn page_size(&self, page_index: usize) -> Option<Size> {
        self.info.page_size(page_index)
    }

    fn render(&self, page_index: usize, scale: f32) -> pdf_cover::Result<RgbaImage> {
        let size = self
            .info
            .page_size(page_index)
            .ok_or(ComposeError::PageOutOfRange {
                page: page_index,
                page_count: self.page_count(),
            })?;
        let width = (size.width * scale).round().max(1.0) as u32;
        let height = (size.height * scale).round().max(1.0) as u32;
        Ok(RgbaImage::from_pixel(width, height, Rgba([128, 128, 128, 255])))
    }
}

fn grey_rasterizer(bytes: Vec<u8>) -> pdf_cover::Result<Arc<dyn PageRasterizer>> {
    Ok(Arc::new(GreyRasterizer {
        info: DocumentInfo::from_bytes(&bytes)?,
    }))
}

struct TestServer {
    app: Router,
    _dir: TempDir,
}

fn server_with(max_upload_bytes: usize, rasterize: bool) -> TestServer {
    let dir = TempDir::new().unwrap();
    let mut config = AppConfig::default();
    config.storage.upload_dir = dir.path().join("uploads");
    config.storage.output_dir = dir.path().join("output");
    config.limits.max_upload_bytes = max_upload_bytes;
    config.limits.thumbnail_width = 60;

    let state = AppState::new(config);
    let state = if rasterize {
        state.with_rasterizer(Arc::new(grey_rasterizer))
    } else {
        state.without_rasterizer()
    };

    TestServer {
        app: router(Arc::new(state)),
        _dir: dir,
    }
}

fn server() -> TestServer {
    server_with(50 * 1024 * 1024, true)
}

fn multipart_request(field: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"doc.pdf\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn compose_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/compose")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn upload(app: &Router, pages: usize) -> String {
    let pdf = create_test_pdf(pages);
    let (status, body) = send_json(app, multipart_request("pdf", "application/pdf", &pdf)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["fileId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let server = server();
    let (status, body) = send_json(&server.app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    let timestamp = body["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test]
async fn test_upload_returns_pages_and_thumbnails() {
    let server = server();
    let pdf = create_test_pdf(3);
    let (status, body) =
        send_json(&server.app, multipart_request("pdf", "application/pdf", &pdf)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pageCount"], 3);
    let thumbnails = body["thumbnails"].as_array().unwrap();
    assert_eq!(thumbnails.len(), 3);
    for thumbnail in thumbnails {
        assert!(
            thumbnail
                .as_str()
                .unwrap()
                .starts_with("data:image/png;base64,")
        );
    }
    assert!(uuid::Uuid::parse_str(body["fileId"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_upload_without_rasterizer_has_no_thumbnails() {
    let server = server_with(50 * 1024 * 1024, false);
    let pdf = create_test_pdf(2);
    let (status, body) =
        send_json(&server.app, multipart_request("pdf", "application/pdf", &pdf)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pageCount"], 2);
    assert_eq!(body["thumbnails"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_upload_rejects_wrong_mime() {
    let server = server();
    let pdf = create_test_pdf(1);
    let (status, body) = send_json(&server.app, multipart_request("pdf", "text/plain", &pdf)).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["code"], "unsupported_format");
}

#[tokio::test]
async fn test_upload_rejects_missing_magic() {
    let server = server();
    let (status, _) = send_json(
        &server.app,
        multipart_request("pdf", "application/pdf", b"GIF89a not a pdf"),
    )
    .await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_upload_rejects_oversize_file() {
    let server = server_with(1024, true);
    let mut data = b"%PDF-1.7\n".to_vec();
    data.resize(4096, b' ');
    let (status, body) =
        send_json(&server.app, multipart_request("pdf", "application/pdf", &data)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["code"], "file_too_large");
}

#[tokio::test]
async fn test_upload_requires_pdf_field() {
    let server = server();
    let pdf = create_test_pdf(1);
    let (status, body) =
        send_json(&server.app, multipart_request("file", "application/pdf", &pdf)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
}

#[tokio::test]
async fn test_compose_and_download() {
    let server = server();
    let file_id = upload(&server.app, 4).await;

    let (status, body) = send_json(
        &server.app,
        compose_request(json!({
            "fileId": file_id,
            "selectedPages": [2, 0],
            "coverPage": 3,
            "coverPlacement": "bottom",
            "exportFormat": "pdf",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let filename = body["filename"].as_str().unwrap();
    let url = body["downloadUrl"].as_str().unwrap();
    assert_eq!(url, format!("/api/download/{filename}"));

    let response = server.app.clone().oneshot(get(url)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/pdf"
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    // Pages 0 and 2 in order, cover (width 603) last
    let merged = Document::load_mem(&bytes).unwrap();
    let info = DocumentInfo::from_document(&merged);
    let widths: Vec<f32> = info.page_sizes.iter().map(|s| s.width).collect();
    assert_eq!(widths, vec![600.0, 602.0, 603.0]);
}

#[tokio::test]
async fn test_compose_rejects_non_pdf_export() {
    let server = server();
    let file_id = upload(&server.app, 2).await;
    let (status, body) = send_json(
        &server.app,
        compose_request(json!({
            "fileId": file_id,
            "selectedPages": [0],
            "exportFormat": "png",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
}

#[tokio::test]
async fn test_compose_rejects_empty_selection() {
    let server = server();
    let file_id = upload(&server.app, 2).await;
    let (status, body) = send_json(
        &server.app,
        compose_request(json!({
            "fileId": file_id,
            "selectedPages": [],
            "coverPage": 1,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "empty_selection");
}

#[tokio::test]
async fn test_compose_rejects_unknown_placement() {
    let server = server();
    let file_id = upload(&server.app, 2).await;
    let (status, _) = send_json(
        &server.app,
        compose_request(json!({
            "fileId": file_id,
            "selectedPages": [0],
            "coverPage": 1,
            "coverPlacement": "sideways",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_compose_unknown_file() {
    let server = server();
    let (status, body) = send_json(
        &server.app,
        compose_request(json!({
            "fileId": uuid::Uuid::new_v4().to_string(),
            "selectedPages": [0],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "file_not_found");

    let (status, _) = send_json(
        &server.app,
        compose_request(json!({
            "fileId": "../../etc/passwd",
            "selectedPages": [0],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_download_guards() {
    let server = server();

    let (status, _) = send(&server.app, get("/api/download/missing.pdf")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&server.app, get("/api/download/..%2Fuploads")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
