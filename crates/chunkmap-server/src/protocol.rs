//! HTTP framing for the map endpoints - request line parsing, routing, responses

use serde::Serialize;

/// Request methods the server distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Options,
    Other,
}

impl Method {
    fn parse(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            "OPTIONS" => Method::Options,
            _ => Method::Other,
        }
    }
}

/// A parsed HTTP request line. Headers and body are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    /// Request path with any query string removed
    pub path: String,
}

impl Request {
    /// Parse `METHOD /path HTTP/1.x`. Returns None for anything malformed.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.trim_end().split_whitespace();
        let method = Method::parse(parts.next()?);
        let target = parts.next()?;
        let version = parts.next()?;
        if !version.starts_with("HTTP/") || parts.next().is_some() {
            return None;
        }
        if !target.starts_with('/') {
            return None;
        }
        let path = target.split(['?', '#']).next().unwrap_or("/").to_string();
        Some(Self { method, path })
    }
}

/// Endpoints served by the map server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Visualization page
    Index,
    /// Aggregated unit document
    Chunks,
    /// Store counters
    Stats,
    NotFound,
}

impl Route {
    pub fn resolve(path: &str) -> Self {
        match path {
            "/" | "/index.html" => Route::Index,
            "/api/chunks" => Route::Chunks,
            "/api/stats" => Route::Stats,
            _ => Route::NotFound,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// An HTTP response ready to be written to the socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: Option<&'static str>,
    /// Whether to emit `Access-Control-Allow-*` headers
    pub cors: bool,
    pub body: Vec<u8>,
}

impl Response {
    pub fn html(body: &str) -> Self {
        Self {
            status: 200,
            content_type: Some("text/html; charset=utf-8"),
            cors: false,
            body: body.as_bytes().to_vec(),
        }
    }

    /// JSON document readable from any origin
    pub fn json(body: String) -> Self {
        Self {
            status: 200,
            content_type: Some("application/json"),
            cors: true,
            body: body.into_bytes(),
        }
    }

    pub fn error(status: u16, message: &str) -> Self {
        let body = serde_json::to_vec(&ErrorBody { error: message })
            .unwrap_or_else(|_| b"{\"error\":\"internal\"}".to_vec());
        Self {
            status,
            content_type: Some("application/json"),
            cors: true,
            body,
        }
    }

    /// Reply to a CORS preflight
    pub fn preflight() -> Self {
        Self {
            status: 204,
            content_type: None,
            cors: true,
            body: Vec::new(),
        }
    }

    /// Serialize status line, headers and body
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!("HTTP/1.1 {} {}\r\n", self.status, reason_phrase(self.status));
        if let Some(content_type) = self.content_type {
            head.push_str(&format!("Content-Type: {}\r\n", content_type));
        }
        if self.cors {
            head.push_str("Access-Control-Allow-Origin: *\r\n");
            head.push_str("Access-Control-Allow-Methods: GET, OPTIONS\r\n");
        }
        head.push_str("Cache-Control: no-store\r\n");
        head.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        head.push_str("Connection: close\r\n\r\n");

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
