//! Blocking JSON REST client facade.
//!
//! # Overview
//! [`ClientBuilder`] validates the host, sets up TLS trust (platform roots,
//! an optional extra PEM bundle, or no verification at all) and produces an
//! immutable [`RestClient`]. The client issues GET/PUT/POST/DELETE calls with
//! Basic auth and JSON headers, maps any status outside `200..=299` to an
//! error whose message is the bare status code, and decodes successful
//! bodies into a caller-supplied destination.
//!
//! # Design
//! - Transport is a trait ([`Transport`]) implemented for `ureq::Agent`;
//!   callers may inject their own.
//! - Wire dumps go through a [`Logger`]; [`NoopLogger`] is used when none is
//!   configured. Dumps include credentials.
//! - No retries, timeouts or background work live in this layer.

mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod logger;
mod tls;
mod transport;

pub use client::{check_status, ClientBuilder, RestClient};
pub use config::{ClientConfig, DEFAULT_USER_AGENT};
pub use error::{ClientError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use logger::{Logger, NoopLogger, TracingLogger};
pub use tls::TrustPolicy;
pub use transport::Transport;
