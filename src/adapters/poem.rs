//! Poem framework adapter.

use crate::core::HandlerFn;
use crate::error::{HarnessError, Result};
use crate::types::{Response, Route};
use poem::{
    endpoint::Endpoint, http::StatusCode, listener::TcpAcceptor, middleware::Tracing, Body,
    EndpointExt, Route as PoemRoute, Server,
};
use std::net::SocketAddr;
use tracing::{debug, info, Level};

/// Poem framework adapter
pub struct PoemAdapter {
    routes: Vec<Route>,
    listener: Option<std::net::TcpListener>,
}

impl Default for PoemAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl PoemAdapter {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            listener: None,
        }
    }

    /// Bind the listener, returning the actual local address
    pub fn bind(&mut self, addr: SocketAddr) -> Result<SocketAddr> {
        let listener = super::bind_listener(addr)?;
        let local_addr = listener.local_addr()?;
        self.listener = Some(listener);
        Ok(local_addr)
    }

    /// Add a GET route to the server
    pub fn route(&mut self, route: Route) -> &mut Self {
        debug!("Added Poem route: GET {}", route.path);
        self.routes.push(route);
        self
    }

    /// Serve until the process is terminated
    pub async fn run(self) -> Result<()> {
        let listener = self
            .listener
            .ok_or_else(|| HarnessError::bind_error("No address bound"))?;
        let local_addr = listener.local_addr()?;

        let mut app = PoemRoute::new();
        for route in self.routes {
            let endpoint = PoemHandlerWrapper {
                path: route.path.clone(),
                handler: route.handler,
            };
            app = app.at(&route.path, poem::get(endpoint));
        }

        let app = if tracing::enabled!(Level::DEBUG) {
            app.with(Tracing).boxed()
        } else {
            app.boxed()
        };

        let acceptor = TcpAcceptor::from_std(listener)?;
        info!("Poem server starting on {}", local_addr);

        Server::new_with_acceptor(acceptor)
            .run(app)
            .await
            .map_err(|e| HarnessError::server_error(format!("Poem server error: {}", e)))
    }
}

/// Wrapper to adapt our HandlerFn to Poem's endpoint
#[derive(Clone)]
struct PoemHandlerWrapper {
    path: String,
    handler: HandlerFn,
}

impl Endpoint for PoemHandlerWrapper {
    type Output = poem::Response;

    async fn call(&self, req: poem::Request) -> poem::Result<Self::Output> {
        // The router tolerates a trailing slash; only the exact path is served.
        if req.uri().path() != self.path {
            return Ok(convert_response(Response::not_found()));
        }
        Ok(convert_response((self.handler)().await))
    }
}

/// Convert our Response to Poem response
fn convert_response(response: Response) -> poem::Response {
    let status = StatusCode::from_u16(response.status_u16())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    poem::Response::builder()
        .status(status)
        .body(Body::from_bytes(response.body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_support::{get, hello_route, loopback, spawn_server};
    use crate::workload::WorkloadMode;

    #[tokio::test]
    async fn test_poem_adapter_route_addition() {
        let mut adapter = PoemAdapter::new();
        adapter.route(hello_route(WorkloadMode::Yield));
        assert_eq!(adapter.routes.len(), 1);
    }

    #[tokio::test]
    async fn test_poem_serves_hello() {
        let mut adapter = PoemAdapter::new();
        adapter.route(hello_route(WorkloadMode::Yield));
        let addr = adapter.bind(loopback()).unwrap();
        spawn_server(move || adapter.run());

        let (status, body) = get(addr, "/hello").await;
        assert_eq!(status, 200);
        assert_eq!(body, b"hello world");

        for path in ["/other", "/hello/", "/HELLO"] {
            let (status, _) = get(addr, path).await;
            assert_eq!(status, 404, "{}", path);
        }
    }

    #[test]
    fn test_response_conversion() {
        let response = convert_response(Response::ok().body("hello world"));
        assert_eq!(response.status(), StatusCode::OK);
    }
}
