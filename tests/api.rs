//! HTTP-level tests for the qpsolve service.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`. The AI
//! backend and OCR engine are stubs, so no network access or tesseract
//! binary is needed.
//!
//! Run with:
//!   cargo test --test api

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use qpsolve::prompts::READINESS_PROMPT;
use qpsolve::server::{build_routes, AppState};
use qpsolve::{
    BackendError, ChatBackend, GenerationParams, OcrEngine, SolveError, Solver, SolverConfig,
};
use serde_json::{json, Value};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

// ── Stubs ────────────────────────────────────────────────────────────────────

/// Scripted AI backend: one reply for the readiness probe, one for generation.
struct StubBackend {
    probe: Result<&'static str, BackendError>,
    answer: Result<&'static str, BackendError>,
    generations: AtomicUsize,
}

impl StubBackend {
    fn answering(answer: &'static str) -> Self {
        Self {
            probe: Ok("OK"),
            answer: Ok(answer),
            generations: AtomicUsize::new(0),
        }
    }

    fn failing(err: BackendError) -> Self {
        Self {
            probe: Ok("OK"),
            answer: Err(err),
            generations: AtomicUsize::new(0),
        }
    }

    fn unreachable(err: BackendError) -> Self {
        Self {
            probe: Err(err),
            answer: Ok("never used"),
            generations: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ChatBackend for StubBackend {
    async fn complete(
        &self,
        prompt: &str,
        _params: GenerationParams,
    ) -> Result<String, BackendError> {
        if prompt == READINESS_PROMPT {
            return self.probe.clone().map(str::to_string);
        }
        self.generations.fetch_add(1, Ordering::SeqCst);
        self.answer.clone().map(str::to_string)
    }
}

struct StubOcr(&'static str);

#[async_trait]
impl OcrEngine for StubOcr {
    async fn recognize(&self, _png: Vec<u8>) -> Result<String, SolveError> {
        Ok(self.0.to_string())
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

const BOUNDARY: &str = "qpsolve-test-boundary";

fn app_with(backend: Arc<StubBackend>, ocr: &'static str, config: SolverConfig) -> Router {
    let solver = Solver::new(backend, Arc::new(StubOcr(ocr)), config);
    build_routes(AppState::new(Arc::new(solver)))
}

fn app(backend: Arc<StubBackend>) -> Router {
    app_with(backend, "Q1. OCR text", SolverConfig::default())
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body: Value = tokio_test::assert_ok!(serde_json::from_slice(&bytes));
    (status, body)
}

fn text_request(body: Value) -> Request<Body> {
    Request::post("/api/process-text")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// One multipart part: (field name, filename, content type, bytes).
type Part<'a> = (&'a str, &'a str, &'a str, &'a [u8]);

fn upload_request(parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, filename, content_type, bytes) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                 Content-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::post("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn encoded(pixel: u8, format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 8, Luma([pixel])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

fn png(pixel: u8) -> Vec<u8> {
    encoded(pixel, ImageFormat::Png)
}

/// A one-page PDF that draws `line` in Courier.
fn pdf(line: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new("Tj", vec![Object::string_literal(line)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

// ── Health and job status ────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_connected_backend() {
    let backend = Arc::new(StubBackend::answering("unused"));
    let req = Request::get("/api/health").body(Body::empty()).unwrap();
    let (status, body) = send(app(backend), req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["aiConnected"], true);
    assert!(body.get("apiError").is_none());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn health_is_200_when_degraded() {
    let backend = Arc::new(StubBackend::unreachable(
        BackendError::new("bad key").with_status(401),
    ));
    let req = Request::get("/api/health").body(Body::empty()).unwrap();
    let (status, body) = send(app(backend), req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["aiConnected"], false);
    assert_eq!(
        body["apiError"],
        "Invalid API key. Please check your AI provider credentials."
    );
}

#[tokio::test]
async fn job_status_always_completed() {
    let backend = Arc::new(StubBackend::answering("unused"));
    let req = Request::get("/api/status/job-42").body(Body::empty()).unwrap();
    let (status, body) = send(app(backend), req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"jobId": "job-42", "status": "completed", "progress": 100})
    );
}

// ── Text flow ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn text_submission_is_solved() {
    let backend = Arc::new(StubBackend::answering("Step 1: Add 2 and 2. Answer: 4."));
    let (status, body) = send(app(backend.clone()), text_request(json!({"text": "2+2=?"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["extractedText"], "2+2=?");
    assert_eq!(body["solutions"], "Step 1: Add 2 and 2. Answer: 4.");
    assert_eq!(body["filename"], "Manual Input");
    assert!(body["processedAt"].is_string());
    assert_eq!(backend.generations.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_text_is_400() {
    let backend = Arc::new(StubBackend::answering("unused"));
    for payload in [json!({"text": ""}), json!({"text": "  \n"}), json!({})] {
        let (status, body) = send(app(backend.clone()), text_request(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Question text is required");
    }
    assert_eq!(backend.generations.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_json_is_400() {
    let backend = Arc::new(StubBackend::answering("unused"));
    let req = Request::post("/api/process-text")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(app(backend), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn unreachable_backend_is_503() {
    let backend = Arc::new(StubBackend::unreachable(BackendError::new(
        "connection refused",
    )));
    let (status, body) = send(app(backend.clone()), text_request(json!({"text": "2+2=?"}))).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert_eq!(body["retryAfter"], 60);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("AI service validation failed: connection refused"));
    assert_eq!(backend.generations.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn rate_limited_generation_is_429() {
    let backend = Arc::new(StubBackend::failing(
        BackendError::new("Too Many Requests").with_status(429),
    ));
    let (status, body) = send(app(backend), text_request(json!({"text": "2+2=?"}))).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        body,
        json!({
            "success": false,
            "message": "Rate limit exceeded. Please try again later.",
            "retryAfter": 120
        })
    );
}

#[tokio::test]
async fn unknown_generation_failure_is_500() {
    let backend = Arc::new(StubBackend::failing(BackendError::new("socket hang up")));
    let (status, body) = send(app(backend), text_request(json!({"text": "2+2=?"}))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to generate solutions: socket hang up");
    assert!(body.get("retryAfter").is_none());
}

// ── File flow ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn text_file_is_passed_through() {
    let backend = Arc::new(StubBackend::answering("Q1: 9"));
    let req = upload_request(&[("file", "paper.txt", "text/plain", &b"Q1. What is 3x3?\n"[..])]);
    let (status, body) = send(app(backend), req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filename"], "paper.txt");
    assert_eq!(body["fileType"], "text/plain");
    assert_eq!(body["extractedText"], "Q1. What is 3x3?\n");
    assert_eq!(body["solutions"], "Q1: 9");
}

#[tokio::test]
async fn pdf_text_is_extracted() {
    let backend = Arc::new(StubBackend::answering("x = 3"));
    let bytes = pdf("Q1. Solve x + 2 = 5");
    let req = upload_request(&[("file", "paper.pdf", "application/pdf", bytes.as_slice())]);
    let (status, body) = send(app(backend), req).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["fileType"], "application/pdf");
    assert!(body["extractedText"]
        .as_str()
        .unwrap()
        .contains("Solve x + 2 = 5"));
    assert_eq!(body["solutions"], "x = 3");
}

#[tokio::test]
async fn image_is_read_with_ocr() {
    let backend = Arc::new(StubBackend::answering("Answer: 7"));
    let bytes = png(255);
    let req = upload_request(&[("file", "scan.png", "image/png", bytes.as_slice())]);
    let (status, body) = send(
        app_with(backend, "Q1. What is 3 + 4?", SolverConfig::default()),
        req,
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["fileType"], "image/png");
    assert_eq!(body["extractedText"], "Q1. What is 3 + 4?");
}

#[tokio::test]
async fn jpeg_photo_is_read_with_ocr() {
    let backend = Arc::new(StubBackend::answering("Answer: 12"));
    let bytes = encoded(200, ImageFormat::Jpeg);
    assert!(bytes.starts_with(&[0xFF, 0xD8]));
    let req = upload_request(&[("file", "photo.jpg", "image/jpeg", bytes.as_slice())]);
    let (status, body) = send(
        app_with(backend, "Q1. What is 3 x 4?", SolverConfig::default()),
        req,
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["fileType"], "image/jpeg");
    assert_eq!(body["extractedText"], "Q1. What is 3 x 4?");
}

#[tokio::test]
async fn blank_ocr_result_is_400() {
    let backend = Arc::new(StubBackend::answering("unused"));
    let bytes = png(128);
    let req = upload_request(&[("file", "blank.png", "image/png", bytes.as_slice())]);
    let (status, body) = send(app_with(backend.clone(), "  \n ", SolverConfig::default()), req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "success": false,
            "message": "No text could be extracted from the uploaded file"
        })
    );
    assert_eq!(backend.generations.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn media_type_mentioning_quota_is_400() {
    let backend = Arc::new(StubBackend::answering("unused"));
    let req = upload_request(&[("file", "odd.bin", "application/x-quota", &b"data"[..])]);
    let (status, body) = send(app(backend), req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Unsupported file type: application/x-quota"));
    assert!(body.get("retryAfter").is_none());
}

#[tokio::test]
async fn unsupported_type_is_400() {
    let backend = Arc::new(StubBackend::answering("unused"));
    let req = upload_request(&[("file", "papers.zip", "application/zip", &b"PK\x03\x04"[..])]);
    let (status, body) = send(app(backend.clone()), req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Unsupported file type"));
    assert_eq!(backend.generations.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_file_is_400() {
    let backend = Arc::new(StubBackend::answering("unused"));
    let req = upload_request(&[("note", "note.txt", "text/plain", &b"hello"[..])]);
    let (status, body) = send(app(backend), req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "No file uploaded. Please attach a PDF, image or text file."
    );
}

#[tokio::test]
async fn two_files_are_400() {
    let backend = Arc::new(StubBackend::answering("unused"));
    let req = upload_request(&[
        ("file", "a.txt", "text/plain", &b"Q1"[..]),
        ("file", "b.txt", "text/plain", &b"Q2"[..]),
    ]);
    let (status, _) = send(app(backend), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversize_file_is_400() {
    let backend = Arc::new(StubBackend::answering("unused"));
    let config = SolverConfig::builder().max_upload_bytes(16).build().unwrap();
    let req = upload_request(&[("file", "long.txt", "text/plain", &[b'a'; 32][..])]);
    let (status, body) = send(app_with(backend, "unused", config), req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "File too large. Maximum upload size is 16 bytes."
    );
}

#[tokio::test]
async fn body_over_transport_limit_is_oversize() {
    let backend = Arc::new(StubBackend::answering("unused"));
    let config = SolverConfig::builder().max_upload_bytes(16).build().unwrap();
    let huge = vec![b'a'; 128 * 1024];
    let req = upload_request(&[("file", "huge.txt", "text/plain", huge.as_slice())]);
    let (status, body) = send(app_with(backend, "unused", config), req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "File too large. Maximum upload size is 16 bytes."
    );
}

#[tokio::test]
async fn file_flow_probes_before_intake() {
    let backend = Arc::new(StubBackend::unreachable(
        BackendError::new("quota exhausted").with_code("RESOURCE_EXHAUSTED"),
    ));
    let req = upload_request(&[("file", "papers.zip", "application/zip", &b"PK"[..])]);
    let (status, body) = send(app(backend), req).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["retryAfter"], 60);
}
