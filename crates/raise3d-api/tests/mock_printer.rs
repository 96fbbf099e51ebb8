//! Client behavior against a mock printer server
//!
//! The mock speaks the printer's envelope protocol: token auth via query
//! parameter, `{status, data, error}` bodies, HTTP errors for auth and
//! throttling.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use raise3d_api::{generate_sign, CameraClient, PrinterClient};
use raise3d_core::JobAction;

const PASSWORD: &str = "printer-pass";

#[derive(Default)]
struct MockPrinter {
    login_count: AtomicU32,
    basic_429_remaining: AtomicU32,
    current_token: Mutex<Option<String>>,
}

impl MockPrinter {
    fn issue_token(&self) -> String {
        let n = self.login_count.fetch_add(1, Ordering::SeqCst) + 1;
        let token = format!("tok{n}");
        *self.current_token.lock().unwrap() = Some(token.clone());
        token
    }

    fn token_valid(&self, query: &HashMap<String, String>) -> bool {
        match (&*self.current_token.lock().unwrap(), query.get("token")) {
            (Some(current), Some(sent)) => current == sent,
            _ => false,
        }
    }

    fn revoke_token(&self) {
        *self.current_token.lock().unwrap() = Some("revoked".to_string());
    }
}

fn envelope(data: Value) -> Json<Value> {
    Json(json!({ "status": 1, "data": data }))
}

async fn login(
    State(mock): State<Arc<MockPrinter>>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let timestamp: i64 = match query.get("timestamp").and_then(|t| t.parse().ok()) {
        Some(t) => t,
        None => return StatusCode::BAD_REQUEST.into_response(),
    };
    if query.get("sign") != Some(&generate_sign(PASSWORD, timestamp)) {
        return (
            StatusCode::OK,
            Json(json!({
                "status": 0,
                "error": { "code": 403, "msg": "password is incorrect" }
            })),
        )
            .into_response();
    }
    envelope(json!({ "token": mock.issue_token() })).into_response()
}

async fn system_info(
    State(mock): State<Arc<MockPrinter>>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !mock.token_valid(&query) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    envelope(json!({
        "Serial_number": "R3D-0042",
        "api_version": "0.1.0.1015",
        "firmware_version": "1.5.2",
        "machine_id": "mock-machine-1",
        "machine_name": "Mock Pro2",
        "model": "Pro2",
        "nozzies_num": 2,
        "version": "1.2.3"
    }))
    .into_response()
}

async fn basic_info(
    State(mock): State<Arc<MockPrinter>>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !mock.token_valid(&query) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if mock
        .basic_429_remaining
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
    {
        return StatusCode::TOO_MANY_REQUESTS.into_response();
    }
    envelope(json!({
        "fan_cur_speed": 100,
        "heatbed_cur_temp": 60,
        "heatbed_tar_temp": 60
    }))
    .into_response()
}

async fn nozzle1() -> Response {
    StatusCode::NOT_FOUND.into_response()
}

async fn running_status() -> Response {
    (
        StatusCode::OK,
        Json(json!({
            "status": 0,
            "error": { "code": 403, "msg": "not allowed" }
        })),
    )
        .into_response()
}

async fn set_heatbed(
    State(mock): State<Arc<MockPrinter>>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    if !mock.token_valid(&query) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    envelope(body).into_response()
}

async fn current_job_operate(
    State(mock): State<Arc<MockPrinter>>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !mock.token_valid(&query) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    envelope(json!({ "operate": query.get("operate") })).into_response()
}

async fn axis_control(
    State(mock): State<Arc<MockPrinter>>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    if !mock.token_valid(&query) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    envelope(body).into_response()
}

async fn dashboard_job(
    State(mock): State<Arc<MockPrinter>>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !mock.token_valid(&query) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    envelope(json!({
        "start_pos": query.get("start_pos"),
        "max_num": query.get("max_num"),
        "jobs": []
    }))
    .into_response()
}

async fn fileops_list(
    State(mock): State<Arc<MockPrinter>>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !mock.token_valid(&query) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    envelope(json!({
        "dir": query.get("dir"),
        "file_count": 2,
        "files": [{"name": "benchy.gcode"}, {"name": "vase.gcode"}]
    }))
    .into_response()
}

async fn camera_state(headers: HeaderMap) -> Response {
    if !headers.contains_key("authorization") {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({ "streaming": false })).into_response()
}

async fn camera_takeshot(headers: HeaderMap) -> Response {
    if !headers.contains_key("authorization") {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    (StatusCode::OK, b"JPEGDATA".to_vec()).into_response()
}

async fn camera_auth_stream(headers: HeaderMap) -> Response {
    if !headers.contains_key("authorization") {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    StatusCode::NOT_IMPLEMENTED.into_response()
}

async fn spawn_mock(mock: Arc<MockPrinter>) -> u16 {
    let app = Router::new()
        .route("/v1/login", get(login))
        .route("/v1/printer/system", get(system_info))
        .route("/v1/printer/basic", get(basic_info))
        .route("/v1/printer/nozzle1", get(nozzle1))
        .route("/v1/printer/runningstatus", get(running_status))
        .route("/v1/printer/heatbedtemp/set", post(set_heatbed))
        .route("/v1/printer/axiscontrol/set", post(axis_control))
        .route("/v1/job/currentjob", post(current_job_operate))
        .route("/v1/dashboard/job", get(dashboard_job))
        .route("/v1/fileops/list", get(fileops_list))
        .route("/api/v1/camera/takeshot", get(camera_takeshot))
        .route("/api/v1/camera/state", get(camera_state))
        .route("/api/v1/camera/auth_stream", get(camera_auth_stream))
        .with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    port
}

#[tokio::test]
async fn test_login_happens_lazily_on_first_call() {
    let mock = Arc::new(MockPrinter::default());
    let port = spawn_mock(mock.clone()).await;
    let client = PrinterClient::new("127.0.0.1", port, PASSWORD).unwrap();

    assert!(!client.has_token().await);
    let data = client.get_system_info().await.unwrap();
    assert_eq!(data["machine_id"], "mock-machine-1");
    assert!(client.has_token().await);
    assert_eq!(mock.login_count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_reauthenticates_when_token_revoked() {
    let mock = Arc::new(MockPrinter::default());
    let port = spawn_mock(mock.clone()).await;
    let client = PrinterClient::new("127.0.0.1", port, PASSWORD).unwrap();

    client.get_system_info().await.unwrap();
    mock.revoke_token();

    let data = client.get_system_info().await.unwrap();
    assert_eq!(data["machine_id"], "mock-machine-1");
    assert_eq!(mock.login_count.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_wrong_password_surfaces_envelope_error() {
    let mock = Arc::new(MockPrinter::default());
    let port = spawn_mock(mock).await;
    let client = PrinterClient::new("127.0.0.1", port, "wrong").unwrap();

    let err = client.login().await.unwrap_err();
    assert_eq!(err.status_code(), Some(403));
}

#[tokio::test]
async fn test_throttled_request_is_retried_once() {
    let mock = Arc::new(MockPrinter::default());
    mock.basic_429_remaining.store(1, Ordering::SeqCst);
    let port = spawn_mock(mock).await;
    let client = PrinterClient::new("127.0.0.1", port, PASSWORD).unwrap();

    let data = client.get_basic_info().await.unwrap();
    assert_eq!(data["heatbed_cur_temp"], 60);
}

#[tokio::test]
async fn test_unsupported_endpoint_is_not_found() {
    let mock = Arc::new(MockPrinter::default());
    let port = spawn_mock(mock).await;
    let client = PrinterClient::new("127.0.0.1", port, PASSWORD).unwrap();

    client.login().await.unwrap();
    let err = client.get_left_nozzle_info().await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_envelope_error_is_not_retried_as_auth() {
    let mock = Arc::new(MockPrinter::default());
    let port = spawn_mock(mock.clone()).await;
    let client = PrinterClient::new("127.0.0.1", port, PASSWORD).unwrap();

    let err = client.get_running_status().await.unwrap_err();
    assert_eq!(err.status_code(), Some(403));
    assert_eq!(mock.login_count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_set_commands_carry_json_body_and_query() {
    let mock = Arc::new(MockPrinter::default());
    let port = spawn_mock(mock).await;
    let client = PrinterClient::new("127.0.0.1", port, PASSWORD).unwrap();

    let echoed = client.set_heatbed_temp(85).await.unwrap();
    assert_eq!(echoed["temperature"], 85);

    let echoed = client.set_current_job(JobAction::Pause).await.unwrap();
    assert_eq!(echoed["operate"], "pause");
}

#[tokio::test]
async fn test_axis_control_wire_format() {
    let mock = Arc::new(MockPrinter::default());
    let port = spawn_mock(mock).await;
    let client = PrinterClient::new("127.0.0.1", port, PASSWORD).unwrap();

    let echoed = client
        .axis_control(&raise3d_api::AxisControl::relative().z(-1))
        .await
        .unwrap();
    assert_eq!(echoed["is_relative_pos"], 1);
    assert_eq!(echoed["z"], -1);
    assert!(!echoed.contains_key("x"));

    let echoed = client.move_home().await.unwrap();
    assert_eq!(echoed["is_relative_pos"], 0);
    assert_eq!(echoed["x"], 0);
    assert_eq!(echoed["y"], 0);
    assert_eq!(echoed["z"], 0);
}

#[tokio::test]
async fn test_job_history_and_file_listing_paging() {
    let mock = Arc::new(MockPrinter::default());
    let port = spawn_mock(mock).await;
    let client = PrinterClient::new("127.0.0.1", port, PASSWORD).unwrap();

    let page = client.list_jobs(24, 12).await.unwrap();
    assert_eq!(page["start_pos"], "24");
    assert_eq!(page["max_num"], "12");

    let listing = client.list_directory("Local/", 0, 24).await.unwrap();
    assert_eq!(listing["dir"], "Local/");
    assert_eq!(listing["file_count"], 2);
}

#[tokio::test]
async fn test_camera_snapshot_state_and_auth_probe() {
    let mock = Arc::new(MockPrinter::default());
    let port = spawn_mock(mock).await;
    let camera = CameraClient::new("127.0.0.1", port, "camera", "secret").unwrap();

    let image = camera.snapshot().await.unwrap();
    assert_eq!(image, b"JPEGDATA");

    let state = camera.state().await.unwrap();
    assert_eq!(state["streaming"], false);

    assert!(camera.check_auth().await.unwrap());
}
