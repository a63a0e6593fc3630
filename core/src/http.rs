//! HTTP request/response values exchanged with a [`crate::Transport`].
//!
//! # Design
//! Requests and responses are plain owned data. `RestClient` builds an
//! `HttpRequest`, the transport turns it into an `HttpResponse` whose body has
//! already been read to completion, and the client classifies and decodes it.
//! Keeping the wire values inert makes request construction testable without
//! a socket and lets the debug dumps below render exactly what was sent.

use std::fmt::Write as _;

use url::Url;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether requests with this method carry a JSON body.
    pub fn sends_body(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

/// An HTTP request described as plain data.
///
/// Built by [`crate::RestClient::build_request`]; `url` is absolute and
/// headers keep insertion order.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// First value of the header `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data. The body is fully read.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Render a request as HTTP/1.1 text: request line, `Host`, headers, blank
/// line, body. Credentials in `Authorization` are included verbatim.
pub fn dump_request(request: &HttpRequest) -> String {
    let (target, host) = match Url::parse(&request.url) {
        Ok(url) => {
            let mut target = url.path().to_string();
            if let Some(query) = url.query() {
                target.push('?');
                target.push_str(query);
            }
            let host = match (url.host_str(), url.port()) {
                (Some(host), Some(port)) => format!("{host}:{port}"),
                (Some(host), None) => host.to_string(),
                (None, _) => String::new(),
            };
            (target, host)
        }
        Err(_) => (request.url.clone(), String::new()),
    };

    let mut out = String::new();
    let _ = write!(out, "{} {target} HTTP/1.1\r\n", request.method.as_str());
    let _ = write!(out, "Host: {host}\r\n");
    write_headers(&mut out, &request.headers);
    if let Some(body) = &request.body {
        out.push_str(&String::from_utf8_lossy(body));
    }
    out
}

/// Render a response as HTTP/1.1 text: status line, headers, blank line, body.
pub fn dump_response(response: &HttpResponse) -> String {
    let mut out = String::new();
    let _ = write!(out, "HTTP/1.1 {}", response.status);
    if let Some(reason) = ureq::http::StatusCode::from_u16(response.status)
        .ok()
        .and_then(|status| status.canonical_reason())
    {
        let _ = write!(out, " {reason}");
    }
    out.push_str("\r\n");
    write_headers(&mut out, &response.headers);
    out.push_str(&String::from_utf8_lossy(&response.body));
    out
}

fn write_headers(out: &mut String, headers: &[(String, String)]) {
    for (name, value) in headers {
        let _ = write!(out, "{name}: {value}\r\n");
    }
    out.push_str("\r\n");
}
