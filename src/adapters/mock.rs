//! Mock adapter for exercising routes in-process, without a socket.

use crate::core::HandlerFn;
use crate::error::{HarnessError, Result};
use crate::types::{Response, Route};
use std::collections::HashMap;
use std::net::SocketAddr;
use tracing::info;

/// Mock web server adapter for testing
pub struct MockAdapter {
    routes: HashMap<String, HandlerFn>,
    addr: Option<SocketAddr>,
}

impl Default for MockAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAdapter {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            addr: None,
        }
    }

    /// Record the address; nothing is actually bound
    pub fn bind(&mut self, addr: SocketAddr) -> Result<SocketAddr> {
        self.addr = Some(addr);
        Ok(addr)
    }

    /// Returns immediately; there is no listener to serve
    pub async fn run(self) -> Result<()> {
        let addr = self
            .addr
            .ok_or_else(|| HarnessError::bind_error("No address bound"))?;
        info!(
            "mock server on {} with {} routes has nothing to serve",
            addr,
            self.routes.len()
        );
        Ok(())
    }

    pub fn route(&mut self, route: Route) -> &mut Self {
        self.routes.insert(route.path, route.handler);
        self
    }

    /// Dispatch a GET request for `path` the way a framework would
    pub async fn simulate_request(&self, path: &str) -> Response {
        match self.routes.get(path) {
            Some(handler) => handler().await,
            None => Response::not_found(),
        }
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn bound_address(&self) -> Option<SocketAddr> {
        self.addr
    }
}
