use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use services::{
    DispatchError, DocumentCookies, HttpTransport, LessonId, ProgressReporter, ReporterConfig,
    StaticCookies, ValidationPolicy,
};

#[derive(Debug, Clone)]
struct Captured {
    lesson_id: u64,
    content_type: Option<String>,
    csrf_token: Option<String>,
    cookie: Option<String>,
    body: Value,
}

#[derive(Clone)]
struct ServerState {
    status: StatusCode,
    captured: Arc<Mutex<Vec<Captured>>>,
}

async fn record_progress(
    State(state): State<ServerState>,
    Path(lesson_id): Path<u64>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    let captured = Captured {
        lesson_id,
        content_type: header("content-type"),
        csrf_token: header("x-csrftoken"),
        cookie: header("cookie"),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    };
    state.captured.lock().expect("lock").push(captured);
    state.status
}

async fn spawn_server(status: StatusCode) -> (String, Arc<Mutex<Vec<Captured>>>) {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let state = ServerState {
        status,
        captured: Arc::clone(&captured),
    };
    let app = Router::new()
        .route("/api/lessons/:lesson_id/progress/", post(record_progress))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    (format!("http://{addr}"), captured)
}

fn captured(store: &Arc<Mutex<Vec<Captured>>>) -> Vec<Captured> {
    store.lock().expect("lock").clone()
}

#[tokio::test]
async fn posts_json_with_csrf_header() {
    let (base_url, store) = spawn_server(StatusCode::OK).await;
    let reporter = ProgressReporter::new(
        ReporterConfig::parse(&base_url).expect("config"),
        Arc::new(DocumentCookies::new("sessionid=s1; csrftoken=abc%2Fdef")),
    )
    .expect("reporter");

    let outcome = reporter
        .report(LessonId::new(42), 30.0, 60.0)
        .expect("report")
        .outcome()
        .await
        .expect("delivered");
    assert_eq!(outcome.status.as_u16(), 200);

    let requests = captured(&store);
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.lesson_id, 42);
    assert_eq!(request.content_type.as_deref(), Some("application/json"));
    assert_eq!(request.csrf_token.as_deref(), Some("abc/def"));
    assert_eq!(
        request.cookie.as_deref(),
        Some("sessionid=s1; csrftoken=abc%2Fdef")
    );
    assert_eq!(request.body, json!({ "progress": 50.0, "current_time": 30.0 }));
}

#[tokio::test]
async fn omits_csrf_header_without_token() {
    let (base_url, store) = spawn_server(StatusCode::OK).await;
    let reporter = ProgressReporter::new(
        ReporterConfig::parse(&base_url).expect("config"),
        Arc::new(StaticCookies::new()),
    )
    .expect("reporter");

    reporter
        .report(LessonId::new(7), 3.0, 6.0)
        .expect("report")
        .outcome()
        .await
        .expect("delivered");

    let requests = captured(&store);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].csrf_token, None);
    assert_eq!(requests[0].cookie, None);
}

#[tokio::test]
async fn zero_duration_sends_null_progress() {
    let (base_url, store) = spawn_server(StatusCode::OK).await;
    let config = ReporterConfig::parse(&base_url)
        .expect("config")
        .with_validation(ValidationPolicy::PassThrough);
    let reporter =
        ProgressReporter::new(config, Arc::new(StaticCookies::new())).expect("reporter");

    reporter
        .report(LessonId::new(1), 4.0, 0.0)
        .expect("report")
        .outcome()
        .await
        .expect("delivered");

    let requests = captured(&store);
    assert_eq!(requests[0].body, json!({ "progress": null, "current_time": 4.0 }));
}

#[tokio::test]
async fn server_rejection_surfaces_status() {
    let (base_url, store) = spawn_server(StatusCode::FORBIDDEN).await;
    let reporter = ProgressReporter::new(
        ReporterConfig::parse(&base_url).expect("config"),
        Arc::new(StaticCookies::new().with("csrftoken", "stale")),
    )
    .expect("reporter");

    let result = reporter
        .report(LessonId::new(2), 1.0, 2.0)
        .expect("report")
        .outcome()
        .await;
    match result {
        Err(DispatchError::HttpStatus(status)) => assert_eq!(status.as_u16(), 403),
        other => panic!("expected rejected status, got {other:?}"),
    }
    assert_eq!(captured(&store).len(), 1);
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let reporter = ProgressReporter::new(
        ReporterConfig::parse(&format!("http://{addr}")).expect("config"),
        Arc::new(StaticCookies::new()),
    )
    .expect("reporter");

    let result = reporter
        .report(LessonId::new(2), 1.0, 2.0)
        .expect("report")
        .outcome()
        .await;
    assert!(matches!(result, Err(DispatchError::Http(_))));
}

#[tokio::test]
async fn custom_client_is_used_for_delivery() {
    let (base_url, store) = spawn_server(StatusCode::OK).await;
    let client = reqwest::Client::builder()
        .user_agent("wim-progress-test")
        .build()
        .expect("client");
    let reporter = ProgressReporter::with_transport(
        ReporterConfig::parse(&base_url).expect("config"),
        Arc::new(StaticCookies::new().with("csrftoken", "tok")),
        Arc::new(HttpTransport::with_client(client)),
    );

    reporter
        .report(LessonId::new(15), 9.0, 36.0)
        .expect("report")
        .outcome()
        .await
        .expect("delivered");

    let requests = captured(&store);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].lesson_id, 15);
    assert_eq!(requests[0].csrf_token.as_deref(), Some("tok"));
    assert_eq!(requests[0].body, json!({ "progress": 25.0, "current_time": 9.0 }));
}
