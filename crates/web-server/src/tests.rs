//! HTTP API Tests
//!
//! Drives the full router in-process, middleware included, so status codes,
//! bodies and headers are exactly what a browser would see.

use crate::{AppState, router};
use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use core_types::Student;
use database::{DbError, StudentGateway};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

// ============================================================
// TEST GATEWAYS
// ============================================================

#[derive(Default)]
struct RecordingGateway {
    saved: Mutex<Vec<Student>>,
}

#[async_trait]
impl StudentGateway for RecordingGateway {
    async fn insert_student(&self, student: &Student) -> Result<(), DbError> {
        self.saved.lock().unwrap().push(student.clone());
        Ok(())
    }
}

struct FailingGateway;

#[async_trait]
impl StudentGateway for FailingGateway {
    async fn insert_student(&self, _student: &Student) -> Result<(), DbError> {
        Err(DbError::ConnectionConfigError("DATABASE_URL must be set.".into()))
    }
}

struct PanickingGateway;

#[async_trait]
impl StudentGateway for PanickingGateway {
    async fn insert_student(&self, _student: &Student) -> Result<(), DbError> {
        panic!("gateway exploded");
    }
}

// ============================================================
// HELPERS
// ============================================================

fn app_with(gateway: Arc<dyn StudentGateway>) -> Router {
    router(Arc::new(AppState::new(gateway, "frontend-does-not-exist")))
}

fn app() -> Router {
    app_with(Arc::new(RecordingGateway::default()))
}

fn request(method: Method, uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

fn student_body(roll_no: i32, name: &str, marks: [i32; 3]) -> String {
    format!(
        r#"{{"rollNo":{roll_no},"name":"{name}","subject1":{},"subject2":{},"subject3":{}}}"#,
        marks[0], marks[1], marks[2]
    )
}

async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

fn assert_cors(response: &Response) {
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_METHODS],
        "GET, POST, PUT, DELETE, OPTIONS"
    );
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
        "Content-Type, Authorization"
    );
}

// ============================================================
// STUDENT API TESTS
// ============================================================

#[tokio::test]
async fn empty_collection_lists_as_empty_array() {
    let app = app();
    let response = send(&app, request(Method::GET, "/api/students", Body::empty())).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    assert_eq!(body_text(response).await, "[]");
}

#[tokio::test]
async fn created_student_carries_derived_fields() {
    let app = app();
    let response = send(
        &app,
        request(Method::POST, "/api/students", student_body(101, "Asha", [95, 95, 95])),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        body_text(response).await,
        r#"{"rollNo":101,"name":"Asha","subject1":95,"subject2":95,"subject3":95,"total":285,"percentage":95.0,"grade":"A+"}"#
    );
}

#[tokio::test]
async fn duplicate_roll_number_conflicts_and_is_not_stored_twice() {
    let app = app();
    let first = send(
        &app,
        request(Method::POST, "/api/students", student_body(101, "Asha", [80, 70, 60])),
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = send(
        &app,
        request(Method::POST, "/api/students", student_body(101, "Other", [10, 10, 10])),
    )
    .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(second).await["error"],
        "Student with this roll number already exists"
    );

    let list = body_json(send(&app, request(Method::GET, "/api/students", Body::empty())).await).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["name"], "Asha");
}

#[tokio::test]
async fn lookup_by_roll_number() {
    let app = app();
    send(
        &app,
        request(Method::POST, "/api/students", student_body(101, "Asha", [50, 50, 50])),
    )
    .await;

    let found = send(&app, request(Method::GET, "/api/students/101", Body::empty())).await;
    assert_eq!(found.status(), StatusCode::OK);
    let found = body_json(found).await;
    assert_eq!(found["rollNo"], 101);
    assert_eq!(found["grade"], "C");

    let missing = send(&app, request(Method::GET, "/api/students/999", Body::empty())).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(missing).await, r#"{"error":"Student not found"}"#);

    for uri in ["/api/students/abc", "/api/students/", "/api/students/1/2"] {
        let invalid = send(&app, request(Method::GET, uri, Body::empty())).await;
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(invalid.headers()[header::CONTENT_TYPE], "application/json", "{uri}");
        assert_cors(&invalid);
        assert_eq!(body_text(invalid).await, r#"{"error":"Invalid roll number"}"#, "{uri}");
    }
}

#[tokio::test]
async fn extreme_marks_are_accepted_and_wrap() {
    let app = app();
    let response = send(
        &app,
        request(
            Method::POST,
            "/api/students",
            r#"{"rollNo":1,"name":"X","subject1":2147483647,"subject2":1,"subject3":0}"#,
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["total"], i64::from(i32::MIN));
    assert_eq!(created["grade"], "F");
}

#[tokio::test]
async fn list_keeps_insertion_order() {
    let app = app();
    for roll_no in [30, 10, 20] {
        send(
            &app,
            request(Method::POST, "/api/students", student_body(roll_no, "S", [40, 40, 40])),
        )
        .await;
    }

    let list = body_json(send(&app, request(Method::GET, "/api/students", Body::empty())).await).await;
    let rolls: Vec<i64> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["rollNo"].as_i64().unwrap())
        .collect();
    assert_eq!(rolls, vec![30, 10, 20]);
}

#[tokio::test]
async fn created_student_is_handed_to_the_gateway() {
    let gateway = Arc::new(RecordingGateway::default());
    let app = app_with(gateway.clone());

    send(
        &app,
        request(Method::POST, "/api/students", student_body(7, "Kiran", [60, 70, 80])),
    )
    .await;

    let saved = gateway.saved.lock().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].roll_no, 7);
    assert_eq!(saved[0].total, 210);
}

#[tokio::test]
async fn gateway_failure_still_creates_the_student() {
    let app = app_with(Arc::new(FailingGateway));
    let response = send(
        &app,
        request(Method::POST, "/api/students", student_body(101, "Asha", [70, 70, 70])),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let found = send(&app, request(Method::GET, "/api/students/101", Body::empty())).await;
    assert_eq!(found.status(), StatusCode::OK);
    assert_eq!(body_json(found).await["name"], "Asha");
}

#[tokio::test]
async fn malformed_bodies_are_rejected() {
    let app = app();

    let missing = send(
        &app,
        request(Method::POST, "/api/students", r#"{"rollNo":1,"name":"X","subject1":1}"#),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(missing).await["error"], "Invalid student data");

    let wrong_type = send(
        &app,
        request(
            Method::POST,
            "/api/students",
            r#"{"rollNo":"1","name":"X","subject1":1,"subject2":2,"subject3":3}"#,
        ),
    )
    .await;
    assert_eq!(wrong_type.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(wrong_type).await["error"], "Invalid student data format");

    let not_utf8 = send(&app, request(Method::POST, "/api/students", vec![0xff, 0xfe])).await;
    assert_eq!(not_utf8.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(not_utf8).await["error"], "Invalid student data format");

    let list = body_json(send(&app, request(Method::GET, "/api/students", Body::empty())).await).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn comma_in_name_is_a_known_decoder_limitation() {
    let app = app();
    let response = send(
        &app,
        request(Method::POST, "/api/students", student_body(5, "Doe, John", [50, 50, 50])),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid student data format");
}

#[tokio::test]
async fn preflight_is_empty_and_ok() {
    let app = app();
    for uri in ["/api/students", "/api/students/5", "/anything/else"] {
        let response = send(&app, request(Method::OPTIONS, uri, Body::empty())).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        assert_cors(&response);
        assert_eq!(body_text(response).await, "");
    }
}

#[tokio::test]
async fn unsupported_methods_are_405() {
    let app = app();
    for (method, uri) in [
        (Method::DELETE, "/api/students"),
        (Method::PUT, "/api/students"),
        (Method::POST, "/api/students/5"),
        (Method::DELETE, "/api/students/5"),
        (Method::POST, "/api/students/"),
        (Method::DELETE, "/api/students/1/2"),
    ] {
        let response = send(&app, request(method.clone(), uri, Body::empty())).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
        assert_cors(&response);
        assert_eq!(body_json(response).await["error"], "Method not allowed");
    }
}

#[tokio::test]
async fn every_response_carries_cors_headers() {
    let app = app();
    let cases = [
        (Method::GET, "/api/students", String::new()),
        (Method::POST, "/api/students", student_body(1, "A", [1, 2, 3])),
        (Method::POST, "/api/students", student_body(1, "A", [1, 2, 3])),
        (Method::POST, "/api/students", "{}".to_string()),
        (Method::GET, "/api/students/1", String::new()),
        (Method::GET, "/api/students/2", String::new()),
        (Method::GET, "/api/students/x", String::new()),
        (Method::GET, "/missing.html", String::new()),
    ];

    for (method, uri, body) in cases {
        let response = send(&app, request(method, uri, body)).await;
        assert_cors(&response);
    }
}

#[tokio::test]
async fn panics_become_500_with_cors() {
    let app = app_with(Arc::new(PanickingGateway));
    let response = send(
        &app,
        request(Method::POST, "/api/students", student_body(1, "Boom", [1, 1, 1])),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors(&response);
    assert_eq!(body_text(response).await, r#"{"error":"Internal server error"}"#);

    // The listener keeps serving after a failed request.
    let list = send(&app, request(Method::GET, "/api/students", Body::empty())).await;
    assert_eq!(list.status(), StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_duplicate_posts_admit_exactly_one() {
    let app = app();
    let mut handles = Vec::new();
    for i in 0..16 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let req = request(
                Method::POST,
                "/api/students",
                student_body(42, &format!("racer{i}"), [50, 60, 70]),
            );
            app.oneshot(req).await.unwrap().status()
        }));
    }

    let mut created = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            StatusCode::CREATED => created += 1,
            StatusCode::CONFLICT => conflicts += 1,
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!((created, conflicts), (1, 15));

    let list = body_json(send(&app, request(Method::GET, "/api/students", Body::empty())).await).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

// ============================================================
// STATIC FRONT END TESTS
// ============================================================

fn app_serving(dir: &std::path::Path) -> Router {
    router(Arc::new(AppState::new(
        Arc::new(RecordingGateway::default()),
        dir.to_path_buf(),
    )))
}

#[tokio::test]
async fn root_serves_index_html() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>SRMS</h1>").unwrap();
    let app = app_serving(dir.path());

    let response = send(&app, request(Method::GET, "/", Body::empty())).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html");
    assert_cors(&response);
    assert_eq!(body_text(response).await, "<h1>SRMS</h1>");
}

#[tokio::test]
async fn assets_get_content_type_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("css")).unwrap();
    std::fs::write(dir.path().join("css/site.css"), "body{}").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
    let app = app_serving(dir.path());

    let css = send(&app, request(Method::GET, "/css/site.css", Body::empty())).await;
    assert_eq!(css.status(), StatusCode::OK);
    assert_eq!(css.headers()[header::CONTENT_TYPE], "text/css");

    let txt = send(&app, request(Method::GET, "/notes.txt", Body::empty())).await;
    assert_eq!(txt.headers()[header::CONTENT_TYPE], "text/plain");
    assert_eq!(body_text(txt).await, "hello");
}

#[tokio::test]
async fn missing_files_and_directories_are_404_plain_text() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("css")).unwrap();
    let app = app_serving(dir.path());

    let missing = send(&app, request(Method::GET, "/nope.js", Body::empty())).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(missing.headers()[header::CONTENT_TYPE], "text/plain");
    assert_eq!(body_text(missing).await, "File not found: /nope.js");

    let directory = send(&app, request(Method::GET, "/css", Body::empty())).await;
    assert_eq!(directory.status(), StatusCode::NOT_FOUND);

    let no_index = send(&app, request(Method::GET, "/", Body::empty())).await;
    assert_eq!(body_text(no_index).await, "File not found: /index.html");
}

#[tokio::test]
async fn traversal_outside_the_front_end_is_refused() {
    let outer = tempfile::tempdir().unwrap();
    let public = outer.path().join("public");
    std::fs::create_dir(&public).unwrap();
    std::fs::write(outer.path().join("secret.txt"), "top secret").unwrap();
    let app = app_serving(&public);

    let response = send(&app, request(Method::GET, "/../secret.txt", Body::empty())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(!body_text(response).await.contains("top secret"));
}
