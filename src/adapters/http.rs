use crate::config::toml_config::EndpointConfig;
use crate::domain::model::InferenceRequest;
use crate::domain::ports::InferenceTransport;
use crate::utils::error::{FailureKind, Result, RouterError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// 424 是 serving container 回報模型錯誤的方式，503 表示暫時過載
pub const DEFAULT_TRANSIENT_STATUS_CODES: [u16; 2] = [424, 503];
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 120;

/// JSON-over-HTTP transport for the inference endpoint.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    url: String,
    auth_token: Option<String>,
    headers: HashMap<String, String>,
    transient_status_codes: Vec<u16>,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, Duration::from_secs(DEFAULT_TIMEOUT_SECONDS))
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            RouterError::configuration(format!("failed to build HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            url: url.into(),
            auth_token: None,
            headers: HashMap::new(),
            transient_status_codes: DEFAULT_TRANSIENT_STATUS_CODES.to_vec(),
        })
    }

    pub fn from_config(config: &EndpointConfig) -> Result<Self> {
        let mut transport = Self::with_timeout(&config.url, config.timeout())?;
        transport.auth_token = config.auth_token.clone();
        if let Some(headers) = &config.headers {
            transport.headers = headers.clone();
        }
        transport.transient_status_codes = config.transient_status_codes();
        Ok(transport)
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_transient_status_codes(mut self, codes: Vec<u16>) -> Self {
        self.transient_status_codes = codes;
        self
    }

    /// Sends the fixed smoke-test payload (no adapter) and returns the raw
    /// JSON response.
    pub async fn probe(&self) -> Result<serde_json::Value> {
        let payload = serde_json::json!({
            "inputs": "Hello, how are you?",
            "parameters": {
                "max_new_tokens": 50,
                "temperature": 0.7
            }
        });
        self.post_json(&payload).await
    }

    async fn post_json<B: Serialize + ?Sized>(&self, body: &B) -> Result<serde_json::Value> {
        let mut request = self.client.post(&self.url).json(body);

        for (key, value) in &self.headers {
            request = request.header(key, value);
        }
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(classify_reqwest_error)?;
        let status = response.status();
        tracing::debug!("Endpoint response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body, &self.transient_status_codes));
        }

        let bytes = response.bytes().await.map_err(classify_reqwest_error)?;
        serde_json::from_slice(&bytes).map_err(|e| {
            RouterError::fatal(
                FailureKind::Decode,
                format!("response body is not valid JSON: {}", e),
            )
        })
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("url", &self.url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("transient_status_codes", &self.transient_status_codes)
            .finish()
    }
}

#[async_trait]
impl InferenceTransport for HttpTransport {
    async fn send(&self, request: &InferenceRequest) -> Result<serde_json::Value> {
        self.post_json(request).await
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

/// Maps a non-2xx status to the error taxonomy.
pub fn classify_status(status: StatusCode, body: &str, transient_codes: &[u16]) -> RouterError {
    let message = if body.trim().is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, body.trim())
    };

    if transient_codes.contains(&status.as_u16()) {
        return RouterError::transient(Some(status.as_u16()), message);
    }

    let kind = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FailureKind::Authentication,
        StatusCode::NOT_FOUND => FailureKind::NotFound,
        StatusCode::BAD_REQUEST
        | StatusCode::PAYLOAD_TOO_LARGE
        | StatusCode::UNSUPPORTED_MEDIA_TYPE
        | StatusCode::UNPROCESSABLE_ENTITY => FailureKind::MalformedRequest,
        _ => FailureKind::Endpoint,
    };
    RouterError::fatal(kind, message)
}

fn classify_reqwest_error(error: reqwest::Error) -> RouterError {
    let kind = if error.is_timeout() {
        FailureKind::Timeout
    } else if error.is_decode() {
        FailureKind::Decode
    } else if error.is_builder() {
        FailureKind::MalformedRequest
    } else {
        FailureKind::Transport
    };
    RouterError::fatal(kind, error.to_string())
}
