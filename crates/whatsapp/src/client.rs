//! HTTP client for the WAHA gateway.

use std::fmt;

use {
    reqwest::{Client, Response, StatusCode},
    secrecy::{ExposeSecret, Secret},
    serde_json::Value,
    tracing::{debug, warn},
    waha_config::WahaConfig,
};

use crate::{
    error::{Error, Result},
    file_kind::FileKind,
    payload::Payload,
};

/// Header carrying the gateway API key.
const API_KEY_HEADER: &str = "X-Api-Key";

/// Description reported when a rejection body has none.
const NO_DESCRIPTION: &str = "no description given";

/// Authenticated client for a single WAHA gateway.
///
/// Holds no per-request state; one instance can serve concurrent sends.
#[derive(Clone)]
pub struct WahaClient {
    http: Client,
    api_key: Option<Secret<String>>,
    api_base_uri: String,
    session: String,
}

impl fmt::Debug for WahaClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WahaClient")
            .field("api_key", &"[REDACTED]")
            .field("api_base_uri", &self.api_base_uri)
            .field("session", &self.session)
            .finish()
    }
}

impl WahaClient {
    pub fn new(config: &WahaConfig) -> Self {
        Self {
            http: Client::new(),
            api_key: config.api_key.clone(),
            api_base_uri: format!("{}/api", config.url.trim_end_matches('/')),
            session: config.session.clone(),
        }
    }

    /// Use a preconfigured HTTP client (proxies, timeouts, TLS settings).
    #[must_use]
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    /// Session injected into payloads that do not name one.
    pub fn session(&self) -> &str {
        &self.session
    }

    /// Base URI every endpoint is appended to (`<url>/api`).
    pub fn api_base_uri(&self) -> &str {
        &self.api_base_uri
    }

    /// Send a text message.
    pub async fn send_message(&self, payload: Payload) -> Result<Response> {
        self.send_request("sendText", payload).await
    }

    /// Send an attachment through the endpoint for `kind`.
    pub async fn send_file(&self, payload: Payload, kind: FileKind) -> Result<Response> {
        let endpoint = kind
            .endpoint()
            .ok_or(Error::UnsupportedFileKind { kind })?;
        self.send_request(endpoint, payload).await
    }

    /// POST `payload` as JSON to `<base>/api/<endpoint>`.
    ///
    /// The configured session is filled in when the payload has none. A 2xx
    /// response is returned untouched; 4xx becomes a gateway rejection and
    /// anything else a transport error.
    pub async fn send_request(&self, endpoint: &str, mut payload: Payload) -> Result<Response> {
        let url = format!("{}/{endpoint}", self.api_base_uri);

        if payload.session.is_none() {
            payload.session = Some(self.session.clone());
        }

        debug!(
            endpoint,
            chat_id = payload.chat_id.as_deref().unwrap_or_default(),
            session = payload.session.as_deref().unwrap_or_default(),
            "sending WAHA request"
        );

        let mut request = self.http.post(&url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key.expose_secret());
        }

        let response = request.send().await.map_err(|e| {
            warn!(endpoint, error = %e, "WAHA request failed");
            Error::transport(e.without_url().to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(endpoint, status = status.as_u16(), "WAHA request accepted");
            return Ok(response);
        }

        if status.is_client_error() {
            let err = rejection(status, response).await;
            warn!(endpoint, status = status.as_u16(), error = %err, "WAHA rejected request");
            return Err(err);
        }

        warn!(endpoint, status = status.as_u16(), "WAHA server error");
        Err(Error::transport(format!(
            "server responded with status {status} on {endpoint}"
        )))
    }
}

/// Map a 4xx response to the matching rejection error.
async fn rejection(status: StatusCode, response: Response) -> Error {
    let status = status.as_u16();
    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) => {
            return Error::transport(format!("failed to read error body: {}", e.without_url()));
        },
    };
    if body.is_empty() {
        return Error::GatewayRejectedOpaque { status };
    }

    match serde_json::from_slice::<Value>(&body) {
        Ok(value) => {
            let description = match value.get("description") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => NO_DESCRIPTION.to_string(),
                Some(other) => other.to_string(),
            };
            Error::GatewayRejected {
                status,
                description,
            }
        },
        Err(_) => Error::GatewayRejectedOpaque { status },
    }
}
