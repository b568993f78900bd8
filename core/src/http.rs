//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The core
//! builds `HttpRequest` values and classifies `HttpResponse` values without
//! touching the network; whoever executes the request (the async `Session`,
//! a C host through the FFI crate, or a test) returns the response as data.
//!
//! An empty response body is treated as an absent one. HTTP stacks hand back
//! an empty buffer where the original callback API handed back no data.

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
}

/// An HTTP request described as plain data.
///
/// Built by `CarsClient::build_*` methods. The caller executes it and hands
/// the matching `HttpResponse` to the corresponding `parse_*` method.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// True when the status is a real HTTP status code.
    pub fn is_http(&self) -> bool {
        (100..=599).contains(&self.status)
    }

    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }
}
