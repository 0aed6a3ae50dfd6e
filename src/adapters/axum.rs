//! Axum framework adapter, the `default` binding.

use crate::core::HandlerFn;
use crate::error::{HarnessError, Result};
use crate::types::{Response, Route};
use axum::{
    http::StatusCode as AxumStatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, Level};

/// Axum framework adapter
pub struct AxumAdapter {
    router: Router,
    listener: Option<std::net::TcpListener>,
}

impl Default for AxumAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl AxumAdapter {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
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

    /// Serve until the process is terminated
    pub async fn run(self) -> Result<()> {
        let listener = self
            .listener
            .ok_or_else(|| HarnessError::bind_error("No address bound"))?;
        let listener = tokio::net::TcpListener::from_std(listener)?;

        let mut app = self.router;
        if tracing::enabled!(Level::DEBUG) {
            app = app.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));
        }

        info!("Axum server starting on {}", listener.local_addr()?);

        axum::serve(listener, app)
            .await
            .map_err(|e| HarnessError::server_error(format!("Axum server error: {}", e)))
    }

    /// Add a GET route to the server
    pub fn route(&mut self, route: Route) -> &mut Self {
        let handler: HandlerFn = route.handler;
        let endpoint = move || {
            let handler = Arc::clone(&handler);
            async move { convert_response_to_axum(handler().await) }
        };

        self.router = self.router.clone().route(&route.path, get(endpoint));
        debug!("Added Axum route: GET {}", route.path);
        self
    }
}

/// Convert our Response to Axum response format
fn convert_response_to_axum(response: Response) -> axum::response::Response {
    let status = AxumStatusCode::from_u16(response.status_u16())
        .unwrap_or(AxumStatusCode::INTERNAL_SERVER_ERROR);
    (status, response.body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_support::{get, hello_route, loopback, spawn_server};
    use crate::workload::WorkloadMode;

    #[tokio::test]
    async fn test_axum_adapter_creation() {
        let adapter = AxumAdapter::new();
        assert!(adapter.listener.is_none());
    }

    #[tokio::test]
    async fn test_axum_run_without_bind_fails() {
        let adapter = AxumAdapter::new();
        let err = adapter.run().await.unwrap_err();
        assert!(matches!(err, HarnessError::BindError(_)));
    }

    #[tokio::test]
    async fn test_axum_serves_hello() {
        let mut adapter = AxumAdapter::new();
        adapter.route(hello_route(WorkloadMode::Yield));
        let addr = adapter.bind(loopback()).unwrap();
        spawn_server(move || adapter.run());

        let (status, body) = get(addr, "/hello").await;
        assert_eq!(status, 200);
        assert_eq!(body, b"hello world");

        for path in ["/missing", "/hello/", "/HELLO"] {
            let (status, _) = get(addr, path).await;
            assert_eq!(status, 404, "{}", path);
        }
    }

    #[test]
    fn test_response_conversion() {
        let response = convert_response_to_axum(Response::ok().body("hello world"));
        assert_eq!(response.status(), AxumStatusCode::OK);
        assert!(response.headers().get("x-powered-by").is_none());
    }
}
