//! Printer API client
//!
//! All printer endpoints live under `/v1` and answer with a
//! `{status, data, error}` envelope. Authenticated calls carry a `token`
//! query parameter obtained from `/login`; a 401 triggers one transparent
//! re-login when auto-auth is enabled. Connection aborts and the printer's
//! 429 throttling response are retried once after a short delay, since the
//! firmware drops connections under load.

use std::time::Duration;

use reqwest::{Client, Method, Url};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use raise3d_core::{ApiData, JobAction};

use crate::error::{ApiError, ApiResult};
use crate::sign::sign_now;

/// Delay before the single retry of a transient failure
const RETRY_DELAY: Duration = Duration::from_millis(1500);

/// Parameters for POST `/printer/axiscontrol/set`
///
/// Omitted axes are left untouched by the printer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AxisControl {
    #[serde(serialize_with = "bool_as_int")]
    pub is_relative_pos: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nozzle: Option<i64>,
}

impl AxisControl {
    /// Absolute positioning move
    pub fn absolute() -> Self {
        Self::default()
    }

    /// Relative positioning move
    pub fn relative() -> Self {
        Self {
            is_relative_pos: true,
            ..Self::default()
        }
    }

    /// Move all axes to their origin
    pub fn home() -> Self {
        Self {
            is_relative_pos: false,
            x: Some(0),
            y: Some(0),
            z: Some(0),
            ..Self::default()
        }
    }

    pub fn x(mut self, x: i64) -> Self {
        self.x = Some(x);
        self
    }

    pub fn y(mut self, y: i64) -> Self {
        self.y = Some(y);
        self
    }

    pub fn z(mut self, z: i64) -> Self {
        self.z = Some(z);
        self
    }
}

fn bool_as_int<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*value))
}

/// The printer's response envelope
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    status: Option<i64>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<EnvelopeError>,
}

#[derive(Debug, Default, Deserialize)]
struct EnvelopeError {
    #[serde(default)]
    code: Option<Value>,
    #[serde(default)]
    msg: Option<String>,
}

/// Unwrap the response envelope into its data payload
fn decode_envelope(endpoint: &str, body: Value) -> ApiResult<Value> {
    let envelope: Envelope = serde_json::from_value(body)
        .map_err(|err| ApiError::Protocol(format!("invalid envelope from {endpoint}: {err}")))?;

    if envelope.status == Some(1) {
        return Ok(envelope.data.unwrap_or(Value::Null));
    }

    let error = envelope.error.unwrap_or_default();
    let message = error.msg.unwrap_or_else(|| "Unknown error".to_string());
    let code = match error.code {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    };
    match code {
        Some(code) => Err(ApiError::Printer { code, message }),
        None => Err(ApiError::Protocol(format!(
            "API error from {endpoint}: {message}"
        ))),
    }
}

/// Client for the printer's `/v1` HTTP API
pub struct PrinterClient {
    http: Client,
    base_url: Url,
    password: String,
    token: RwLock<Option<String>>,
    auto_auth: bool,
}

impl std::fmt::Debug for PrinterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrinterClient")
            .field("base_url", &self.base_url.as_str())
            .field("auto_auth", &self.auto_auth)
            .finish_non_exhaustive()
    }
}

impl PrinterClient {
    /// Create a client for `http://<host>:<port>` with auto-auth enabled
    pub fn new(host: &str, port: u16, password: impl Into<String>) -> ApiResult<Self> {
        Self::with_http(Client::new(), host, port, password)
    }

    /// Create a client reusing an existing reqwest client
    pub fn with_http(
        http: Client,
        host: &str,
        port: u16,
        password: impl Into<String>,
    ) -> ApiResult<Self> {
        let base_url = Url::parse(&format!("http://{host}:{port}"))
            .map_err(|err| ApiError::Protocol(format!("invalid printer address: {err}")))?;
        Ok(Self {
            http,
            base_url,
            password: password.into(),
            token: RwLock::new(None),
            auto_auth: true,
        })
    }

    /// Disable automatic re-login on 401
    pub fn without_auto_auth(mut self) -> Self {
        self.auto_auth = false;
        self
    }

    /// The printer's base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Whether a login has produced a token
    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Authenticate against the printer and store the session token
    pub async fn login(&self) -> ApiResult<ApiData> {
        let (sign, timestamp) = sign_now(&self.password);
        let data = self
            .send_with_retry(
                Method::GET,
                "/login",
                &[("sign", sign), ("timestamp", timestamp.to_string())],
                None,
                false,
            )
            .await?;

        let token = data
            .get("token")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::Protocol("login response missing token".to_string()))?
            .to_string();
        info!(printer = %self.base_url, "Authenticated against printer");
        *self.token.write().await = Some(token);

        match data {
            Value::Object(map) => Ok(map),
            _ => Ok(ApiData::new()),
        }
    }

    /// Perform one request without auth recovery
    async fn send(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
        auth: bool,
    ) -> ApiResult<Value> {
        let url = self
            .base_url
            .join(&format!("/v1{endpoint}"))
            .map_err(|err| ApiError::Protocol(format!("invalid endpoint {endpoint}: {err}")))?;

        let mut request = self.http.request(method, url);

        if auth {
            let token = self
                .token
                .read()
                .await
                .clone()
                .ok_or(ApiError::AuthRequired)?;
            request = request.query(&[("token", token)]);
        }
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::HttpStatus {
                status,
                endpoint: endpoint.to_string(),
            });
        }

        let body: Value = response.json().await?;
        debug!(endpoint, %body, "Printer response");
        decode_envelope(endpoint, body)
    }

    /// Perform a request, retrying once after a delay on transient failures
    async fn send_with_retry(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
        auth: bool,
    ) -> ApiResult<Value> {
        match self
            .send(method.clone(), endpoint, query, body, auth)
            .await
        {
            Err(err) if err.is_transient() => {
                warn!(endpoint, error = %err, "Transient failure, retrying once");
                tokio::time::sleep(RETRY_DELAY).await;
                self.send(method, endpoint, query, body, auth).await
            }
            other => other,
        }
    }

    /// Perform an authenticated request, re-logging-in once on 401
    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> ApiResult<Value> {
        let needs_login = !self.has_token().await;
        if !needs_login {
            match self
                .send_with_retry(method.clone(), endpoint, query, body, true)
                .await
            {
                Err(err) if self.auto_auth && err.is_unauthorized() => {
                    warn!(endpoint, "Authentication lost, re-authenticating");
                }
                other => return other,
            }
        } else if !self.auto_auth {
            return Err(ApiError::AuthRequired);
        } else {
            debug!(endpoint, "No session token yet, logging in first");
        }

        self.login().await?;
        self.send_with_retry(method, endpoint, query, body, true)
            .await
    }

    async fn get_data(&self, endpoint: &str) -> ApiResult<ApiData> {
        self.get_data_with_query(endpoint, &[]).await
    }

    async fn get_data_with_query(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> ApiResult<ApiData> {
        let value = self.request(Method::GET, endpoint, query, None).await?;
        into_data(endpoint, value)
    }

    async fn post_json(&self, endpoint: &str, body: Value) -> ApiResult<ApiData> {
        let value = self
            .request(Method::POST, endpoint, &[], Some(&body))
            .await?;
        into_data(endpoint, value)
    }

    async fn post_with_query(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> ApiResult<ApiData> {
        let value = self.request(Method::POST, endpoint, query, None).await?;
        into_data(endpoint, value)
    }

    // Printer state and statistics

    pub async fn get_system_info(&self) -> ApiResult<ApiData> {
        self.get_data("/printer/system").await
    }

    pub async fn get_camera_info(&self) -> ApiResult<ApiData> {
        self.get_data("/printer/camera").await
    }

    pub async fn get_running_status(&self) -> ApiResult<ApiData> {
        self.get_data("/printer/runningstatus").await
    }

    pub async fn get_basic_info(&self) -> ApiResult<ApiData> {
        self.get_data("/printer/basic").await
    }

    pub async fn get_statistics(&self) -> ApiResult<ApiData> {
        self.get_data("/dashboard/statistics").await
    }

    // Nozzle state and control

    pub async fn get_left_nozzle_info(&self) -> ApiResult<ApiData> {
        self.get_data("/printer/nozzle1").await
    }

    pub async fn get_right_nozzle_info(&self) -> ApiResult<ApiData> {
        self.get_data("/printer/nozzle2").await
    }

    pub async fn set_left_nozzle_temp(&self, temperature: i64) -> ApiResult<ApiData> {
        self.post_json("/printer/nozzle1/temp/set", json!({ "temperature": temperature }))
            .await
    }

    pub async fn set_right_nozzle_temp(&self, temperature: i64) -> ApiResult<ApiData> {
        self.post_json("/printer/nozzle2/temp/set", json!({ "temperature": temperature }))
            .await
    }

    pub async fn set_left_nozzle_flowrate(&self, flowrate: i64) -> ApiResult<ApiData> {
        self.post_json("/printer/nozzle1/flowrate/set", json!({ "flowrate": flowrate }))
            .await
    }

    pub async fn set_right_nozzle_flowrate(&self, flowrate: i64) -> ApiResult<ApiData> {
        self.post_json("/printer/nozzle2/flowrate/set", json!({ "flowrate": flowrate }))
            .await
    }

    // Printer control

    pub async fn set_heatbed_temp(&self, temperature: i64) -> ApiResult<ApiData> {
        self.post_json("/printer/heatbedtemp/set", json!({ "temperature": temperature }))
            .await
    }

    pub async fn set_feedrate(&self, feedrate: i64) -> ApiResult<ApiData> {
        self.post_json("/printer/feedrate/set", json!({ "feedrate": feedrate }))
            .await
    }

    pub async fn set_fan_speed(&self, fanspeed: i64) -> ApiResult<ApiData> {
        self.post_json("/printer/fanspeed/set", json!({ "fanspeed": fanspeed }))
            .await
    }

    pub async fn axis_control(&self, control: &AxisControl) -> ApiResult<ApiData> {
        let body = serde_json::to_value(control)
            .map_err(|err| ApiError::Protocol(format!("invalid axis control: {err}")))?;
        self.post_json("/printer/axiscontrol/set", body).await
    }

    pub async fn move_home(&self) -> ApiResult<ApiData> {
        self.axis_control(&AxisControl::home()).await
    }

    // Job management

    pub async fn get_current_job(&self) -> ApiResult<ApiData> {
        self.get_data("/job/currentjob").await
    }

    pub async fn set_current_job(&self, action: JobAction) -> ApiResult<ApiData> {
        self.post_with_query(
            "/job/currentjob",
            &[("operate", action.as_str().to_string())],
        )
        .await
    }

    pub async fn recover_last_job(&self) -> ApiResult<ApiData> {
        self.post_with_query("/job/recover/set", &[]).await
    }

    pub async fn list_jobs(&self, start_pos: u32, max_num: u32) -> ApiResult<ApiData> {
        self.get_data_with_query(
            "/dashboard/job",
            &[
                ("start_pos", start_pos.to_string()),
                ("max_num", max_num.to_string()),
            ],
        )
        .await
    }

    pub async fn get_job(&self, job_id: &str, pos: u32) -> ApiResult<ApiData> {
        self.get_data_with_query(
            "/dashboard/job",
            &[("job_id", job_id.to_string()), ("pos", pos.to_string())],
        )
        .await
    }

    pub async fn get_job_image(
        &self,
        job_id: &str,
        width: Option<u32>,
        height: Option<u32>,
    ) -> ApiResult<ApiData> {
        let (width, height) = square_default(width, height);
        self.get_data_with_query(
            "/dashboard/imagedownload",
            &[
                ("job_id", job_id.to_string()),
                ("width", width.to_string()),
                ("height", height.to_string()),
            ],
        )
        .await
    }

    // File listing

    pub async fn list_directory(
        &self,
        directory_path: &str,
        start_pos: u32,
        max_num: u32,
    ) -> ApiResult<ApiData> {
        self.get_data_with_query(
            "/fileops/list",
            &[
                ("dir", directory_path.to_string()),
                ("start_pos", start_pos.to_string()),
                ("max_num", max_num.to_string()),
            ],
        )
        .await
    }

    pub async fn download_image(
        &self,
        data_path: &str,
        width: Option<u32>,
        height: Option<u32>,
    ) -> ApiResult<ApiData> {
        let (width, height) = square_default(width, height);
        self.get_data_with_query(
            "/fileops/imagedownload",
            &[
                ("data_path", data_path.to_string()),
                ("width", width.to_string()),
                ("height", height.to_string()),
            ],
        )
        .await
    }
}

/// Default image dimensions: a missing side mirrors the other, 32 when both absent
fn square_default(width: Option<u32>, height: Option<u32>) -> (u32, u32) {
    let height = height.or(width).unwrap_or(32);
    let width = width.unwrap_or(height);
    (width, height)
}

fn into_data(endpoint: &str, value: Value) -> ApiResult<ApiData> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(ApiData::new()),
        other => Err(ApiError::Protocol(format!(
            "expected object payload from {endpoint}, got {other}"
        ))),
    }
}
