//! HTTP plumbing shared by the dispatcher and handlers.
//!
//! Handlers never touch `hyper::Request<Incoming>` directly. The server
//! reads each request fully into a [`RouteRequest`] before dispatch, so
//! handler code (and its unit tests) works on plain data.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;

/// A fully-read incoming request, detached from the transport.
///
/// Header names are lower-cased on construction; the query string is split
/// off the path.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl RouteRequest {
    /// Build a request from parts. Used directly by tests; the server goes
    /// through [`RouteRequest::from_hyper`].
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            headers: HashMap::new(),
            body: Bytes::new(),
        }
    }

    /// Read a hyper request to completion.
    pub async fn from_hyper(req: Request<Incoming>) -> Result<Self, hyper::Error> {
        let method = req.method().clone();
        let uri = req.uri().clone();
        let headers: HashMap<String, String> = req
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_ascii_lowercase(),
                    v.to_str().unwrap_or("").to_string(),
                )
            })
            .collect();

        let body = req.into_body().collect().await?.to_bytes();

        Ok(Self {
            method,
            path: uri.path().to_string(),
            query: uri.query().map(|q| q.to_string()),
            headers,
            body,
        })
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Body as UTF-8, `None` when empty.
    pub fn body_string(&self) -> Option<String> {
        if self.body.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&self.body).to_string())
        }
    }
}

/// Error body shape used by every non-2xx response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// Build a JSON response with `Content-Type: application/json`.
///
/// `Response::builder` cannot fail for a valid status and these headers,
/// but degrade to a bare 500 rather than panic if it ever does.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("Internal Server Error"))))
}

/// An empty JSON object body. The confirmation response for mutations that
/// have nothing to report.
pub fn empty_json(status: StatusCode) -> Response<Full<Bytes>> {
    json_response(status, &serde_json::json!({}))
}

/// Structured error response.
pub fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    let body = ErrorBody {
        errors: vec![ErrorDetail {
            code: status.as_str().to_string(),
            message: message.to_string(),
        }],
    };
    json_response(status, &body)
}

/// The designed no-match fallback: 404 naming the method and path.
pub fn not_found(method: &Method, path: &str) -> Response<Full<Bytes>> {
    error_response(
        StatusCode::NOT_FOUND,
        &format!("no handler for {method} {path}"),
    )
}
