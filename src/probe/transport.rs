use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, Proxy,
    header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
    redirect,
};
use tracing::error;

use crate::args::{DEFAULT_USER_AGENT, HttpMethod};
use crate::error::{HttpError, TaskError};

use super::body::{BodyCapture, NO_BODY, binary_marker, pretty_json};

const REQUESTED_WITH_HEADER: &str = "x-requested-with";
const REQUESTED_WITH_VALUE: &str = "XMLHttpRequest";

/// What a transport captured for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

/// The single outbound call the runner makes per task.
///
/// Implementations capture the body according to [`BodyCapture::select`].
/// Deadlines are enforced by the runner, which drops the future on expiry.
#[async_trait]
pub trait ProbeTransport: Send + Sync {
    async fn execute(&self, method: HttpMethod, url: &str) -> Result<ProbeResponse, TaskError>;
}

#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    /// Unset leaves connecting to the runner's per-task deadline.
    pub connect_timeout: Option<Duration>,
    pub proxy_url: Option<String>,
    pub headers: Vec<(String, String)>,
    pub insecure: bool,
}

/// reqwest-backed transport. Redirects are never followed.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    connect_timeout: Option<Duration>,
}

impl HttpTransport {
    /// Builds the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error when a header or the proxy URL is invalid, or the
    /// client cannot be built.
    pub fn new(config: &TransportConfig) -> Result<Self, HttpError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            HeaderName::from_static(REQUESTED_WITH_HEADER),
            HeaderValue::from_static(REQUESTED_WITH_VALUE),
        );
        for (key, value) in &config.headers {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|err| {
                HttpError::InvalidHeaderName {
                    header: key.clone(),
                    source: err,
                }
            })?;
            let val = HeaderValue::from_str(value).map_err(|err| HttpError::InvalidHeaderValue {
                header: key.clone(),
                source: err,
            })?;
            default_headers.insert(name, val);
        }

        let mut client_builder = Client::builder()
            .redirect(redirect::Policy::none())
            .user_agent(DEFAULT_USER_AGENT)
            .default_headers(default_headers);

        if let Some(connect_timeout) = config.connect_timeout {
            client_builder = client_builder.connect_timeout(connect_timeout);
        }

        if config.insecure {
            client_builder = client_builder
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true);
        }

        if let Some(proxy_url) = config.proxy_url.as_ref() {
            let proxy = Proxy::all(proxy_url).map_err(|err| {
                error!("Invalid proxy URL '{}': {}", proxy_url, err);
                HttpError::InvalidProxyUrl {
                    url: proxy_url.clone(),
                    source: err,
                }
            })?;
            client_builder = client_builder.proxy(proxy);
        }

        let client = client_builder
            .build()
            .map_err(|err| HttpError::BuildClientFailed { source: err })?;
        Ok(Self {
            client,
            connect_timeout: config.connect_timeout,
        })
    }

    /// Connect timeouts are reported as timeouts.
    fn send_error(&self, err: &reqwest::Error) -> TaskError {
        match self.connect_timeout {
            Some(connect_timeout) if err.is_connect() && err.is_timeout() => TaskError::Timeout {
                timeout_ms: u64::try_from(connect_timeout.as_millis()).unwrap_or(u64::MAX),
            },
            Some(_) | None => TaskError::from_reqwest(err),
        }
    }
}

#[async_trait]
impl ProbeTransport for HttpTransport {
    async fn execute(&self, method: HttpMethod, url: &str) -> Result<ProbeResponse, TaskError> {
        let response = self
            .client
            .request(method.to_reqwest(), url)
            .send()
            .await
            .map_err(|err| self.send_error(&err))?;

        let status = response.status();
        let headers = collect_headers(response.headers());
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .unwrap_or_default();

        let body = match BodyCapture::select(method, status.as_u16(), &content_type) {
            BodyCapture::Skip => NO_BODY.to_owned(),
            BodyCapture::Json => {
                let bytes = response.bytes().await.map_err(|err| body_error(&err))?;
                pretty_json(&bytes)?
            }
            BodyCapture::Text => response.text().await.map_err(|err| body_error(&err))?,
            BodyCapture::Binary(content_type) => binary_marker(&content_type),
        };

        Ok(ProbeResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_owned(),
            headers,
            body,
        })
    }
}

/// Flattens the header map; repeated names are joined with ", ".
pub(crate) fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut collected = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        match collected.entry(name.as_str().to_owned()) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => {
                let joined = slot.get_mut();
                joined.push_str(", ");
                joined.push_str(&value);
            }
        }
    }
    collected
}

fn body_error(err: &reqwest::Error) -> TaskError {
    TaskError::Body {
        message: TaskError::from_reqwest(err).to_string(),
    }
}
