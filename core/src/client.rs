//! Client construction and the JSON request/response cycle.
//!
//! # Design
//! `RestClient` is immutable once built: host, prefix, credentials, user
//! agent, logger and transport are fixed at construction, and every call
//! works on its own `HttpRequest`/`HttpResponse` pair. Each call is split
//! into [`RestClient::build_request`] (pure, no I/O) and
//! [`RestClient::execute`] (send, classify, decode) so request construction
//! can be checked without a server.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::config::{ClientConfig, DEFAULT_USER_AGENT};
use crate::error::ClientError;
use crate::http::{dump_request, dump_response, HttpMethod, HttpRequest, HttpResponse};
use crate::logger::{Logger, NoopLogger};
use crate::tls::TrustPolicy;
use crate::transport::{default_agent, Transport};

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Blocking JSON client bound to one host and one set of credentials.
///
/// Cheap to clone; clones share the transport. Safe to use from many threads
/// at once.
#[derive(Clone)]
pub struct RestClient {
    host: Url,
    path_prefix: String,
    username: String,
    password: String,
    user_agent: Option<String>,
    logger: Arc<dyn Logger>,
    transport: Arc<dyn Transport>,
}

impl RestClient {
    pub fn builder(host: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(host)
    }

    pub fn host(&self) -> &Url {
        &self.host
    }

    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }

    /// The `User-Agent` value sent with every request.
    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    /// `GET prefix+path`, decoding the body into `out` when given.
    pub fn get<T: DeserializeOwned>(&self, path: &str, out: Option<&mut T>) -> Result<(), ClientError> {
        self.do_request(HttpMethod::Get, path, None, out)
    }

    /// `PUT prefix+path` with `body` sent as-is (pre-encoded JSON).
    pub fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&[u8]>,
        out: Option<&mut T>,
    ) -> Result<(), ClientError> {
        self.do_request(HttpMethod::Put, path, body, out)
    }

    /// `POST prefix+path` with `body` sent as-is (pre-encoded JSON).
    pub fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&[u8]>,
        out: Option<&mut T>,
    ) -> Result<(), ClientError> {
        self.do_request(HttpMethod::Post, path, body, out)
    }

    /// `DELETE prefix+path`.
    ///
    /// The response body is always discarded, whatever the server returns.
    /// `body` is accepted for symmetry with `put`/`post` but is not
    /// transmitted: DELETE requests go out without a body.
    pub fn delete(&self, path: &str, body: Option<&[u8]>) -> Result<(), ClientError> {
        self.do_request::<IgnoredAny>(HttpMethod::Delete, path, body, None)
    }

    fn do_request<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&[u8]>,
        out: Option<&mut T>,
    ) -> Result<(), ClientError> {
        let request = self.build_request(method, path, body)?;
        self.execute(request, out)
    }

    /// Build the request for `method` on `prefix+path` without sending it.
    ///
    /// The reference is resolved against the host with RFC 3986 rules, so an
    /// absolute reference (`/x`) replaces the host's own path. Basic auth is
    /// always attached, even for empty credentials. Only POST and PUT carry a
    /// body and a `Content-Type`.
    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&[u8]>,
    ) -> Result<HttpRequest, ClientError> {
        let reference = format!("{}{}", self.path_prefix, path);
        let url = self
            .host
            .join(&reference)
            .map_err(|source| ClientError::InvalidPath { reference, source })?;

        let mut headers = vec![
            (
                "Authorization".to_string(),
                basic_auth(&self.username, &self.password),
            ),
            ("User-Agent".to_string(), self.user_agent().to_string()),
            ("Accept".to_string(), "application/json".to_string()),
            ("Accept-Charset".to_string(), "utf-8".to_string()),
        ];
        if method.sends_body() {
            headers.push(("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()));
        }

        Ok(HttpRequest {
            method,
            url: url.into(),
            headers,
            body: body.filter(|_| method.sends_body()).map(<[u8]>::to_vec),
        })
    }

    /// Send `request`, classify the status and decode into `out` on success.
    ///
    /// On any error `out` keeps its previous value: the body is decoded into
    /// a fresh value that only replaces `out` once decoding succeeded.
    pub fn execute<T: DeserializeOwned>(
        &self,
        request: HttpRequest,
        out: Option<&mut T>,
    ) -> Result<(), ClientError> {
        if self.logger.enabled() {
            self.logger.record(&dump_request(&request));
        }

        debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let response = self.transport.send(request)?;

        if self.logger.enabled() {
            self.logger.record(&dump_response(&response));
        }

        check_status(&response)?;

        match out {
            Some(out) => decode_into(&response.body, out),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("host", &self.host.as_str())
            .field("path_prefix", &self.path_prefix)
            .field("username", &self.username)
            .field("user_agent", &self.user_agent())
            .finish_non_exhaustive()
    }
}

/// Map a status outside `200..=299` to [`ClientError::Status`].
pub fn check_status(response: &HttpResponse) -> Result<(), ClientError> {
    if (200..=299).contains(&response.status) {
        return Ok(());
    }
    Err(ClientError::Status(response.status))
}

/// Decode the first JSON value in `body`. Trailing bytes after that value are
/// not inspected.
fn decode_into<T: DeserializeOwned>(body: &[u8], out: &mut T) -> Result<(), ClientError> {
    let mut de = serde_json::Deserializer::from_slice(body);
    *out = Deserialize::deserialize(&mut de)?;
    Ok(())
}

fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

/// Configures and builds a [`RestClient`].
///
/// ```no_run
/// use rest_facade::RestClient;
///
/// # fn main() -> Result<(), rest_facade::ClientError> {
/// let client = RestClient::builder("https://inventory.internal:8443")
///     .path_prefix("/api/v1")
///     .credentials("sync", "s3cret")
///     .cert_file("/etc/inventory/ca.pem")
///     .build()?;
///
/// let mut count = 0u64;
/// client.get("/widgets/count", Some(&mut count))?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct ClientBuilder {
    config: ClientConfig,
    logger: Option<Arc<dyn Logger>>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    pub fn new(host: impl Into<String>) -> Self {
        Self::from(ClientConfig::new(host))
    }

    pub fn path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.path_prefix = prefix.into();
        self
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.username = username.into();
        self.config.password = password.into();
        self
    }

    /// Override the default `User-Agent`. An empty string keeps the default.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// Disable certificate verification. Never use against production hosts.
    pub fn insecure(mut self, insecure: bool) -> Self {
        self.config.insecure = insecure;
        self
    }

    /// PEM bundle of extra trusted roots, added to the platform roots.
    pub fn cert_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.cert_file = Some(path.into());
        self
    }

    /// Record request and response dumps.
    ///
    /// Dumps include the `Authorization` header, i.e. the Basic credentials
    /// in reversible encoding.
    pub fn logger(mut self, logger: impl Logger + 'static) -> Self {
        self.logger = Some(Arc::new(logger));
        self
    }

    /// Use `transport` as-is instead of building a ureq agent. The TLS
    /// settings (`insecure`, `cert_file`) are ignored in that case.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn build(self) -> Result<RestClient, ClientError> {
        let ClientBuilder {
            config,
            logger,
            transport,
        } = self;
        let logger: Arc<dyn Logger> = match logger {
            Some(logger) => logger,
            None => Arc::new(NoopLogger),
        };

        let transport = match transport {
            Some(transport) => transport,
            None => {
                let policy = TrustPolicy::new(config.insecure, config.cert_file.as_deref());
                let tls = policy.tls_config(logger.as_ref())?;
                Arc::new(default_agent(tls)) as Arc<dyn Transport>
            }
        };

        let host = Url::parse(&config.host).map_err(|source| ClientError::InvalidHost {
            host: config.host.clone(),
            source,
        })?;

        debug!(host = %host, insecure = config.insecure, "built rest client");

        Ok(RestClient {
            host,
            path_prefix: config.path_prefix,
            username: config.username,
            password: config.password,
            user_agent: config.user_agent.filter(|ua| !ua.is_empty()),
            logger,
            transport,
        })
    }
}

impl From<ClientConfig> for ClientBuilder {
    fn from(config: ClientConfig) -> Self {
        Self {
            config,
            logger: None,
            transport: None,
        }
    }
}
