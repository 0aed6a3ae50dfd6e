//! Common types shared by the workload simulator and the framework adapters.

use bytes::Bytes;
use http::StatusCode;

/// Fixed body returned by every successful `/hello` request
pub const HELLO_PAYLOAD: &[u8] = b"hello world";

/// Path of the single benchmark route
pub const HELLO_PATH: &str = "/hello";

/// Framework-neutral response produced by the workload simulator.
///
/// Adapters translate this into their own response type; no headers are
/// carried so each framework writes only what it adds by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub body: Bytes,
}

impl Response {
    /// Create a new response with an empty body
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            body: Bytes::new(),
        }
    }

    /// Create a response with status 200 OK
    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    /// Create a 404 response
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND)
    }

    /// Set the body
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn status_u16(&self) -> u16 {
        self.status.as_u16()
    }
}

/// A GET route registration: the path and the handler behind it
#[derive(Clone)]
pub struct Route {
    pub path: String,
    pub handler: crate::core::HandlerFn,
}

impl Route {
    pub fn get(path: impl Into<String>, handler: crate::core::HandlerFn) -> Self {
        Self {
            path: path.into(),
            handler,
        }
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &"GET")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
