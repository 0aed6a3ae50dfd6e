//! Actix-Web framework adapter, the `actix` binding.
//!
//! This is the tuned binding: actix-web runs one worker per core, each on its
//! own single-threaded runtime accepting from the shared listener, which is
//! the closest Rust analogue to a pre-forked server. Routing stays strict and
//! case-sensitive; no path normalization middleware is installed.

use crate::error::{HarnessError, Result};
use crate::types::{Response, Route};
use actix_web::{
    middleware::{Condition, Logger},
    web, App, HttpResponse, HttpServer,
};
use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, info, Level};

/// Worker tuning applied to the actix-web server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActixProfile {
    /// Worker threads, each with its own event loop
    pub workers: usize,
}

impl Default for ActixProfile {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
        }
    }
}

/// Actix-Web adapter for the benchmark harness
pub struct ActixWebAdapter {
    routes: Vec<Route>,
    listener: Option<std::net::TcpListener>,
    profile: ActixProfile,
}

impl Default for ActixWebAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ActixWebAdapter {
    /// Create a new Actix-Web adapter with the per-core profile
    pub fn new() -> Self {
        Self::with_profile(ActixProfile::default())
    }

    pub fn with_profile(profile: ActixProfile) -> Self {
        Self {
            routes: Vec::new(),
            listener: None,
            profile,
        }
    }

    /// Add a GET route to the server
    pub fn route(&mut self, route: Route) -> &mut Self {
        debug!("Added Actix-Web route: GET {}", route.path);
        self.routes.push(route);
        self
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
        let local_addr = listener.local_addr()?;

        let routes = Arc::new(self.routes);
        let log_requests = tracing::enabled!(Level::DEBUG);

        let server = HttpServer::new(move || {
            let mut app = App::new().wrap(Condition::new(log_requests, Logger::default()));

            for route in routes.iter() {
                let handler = Arc::clone(&route.handler);
                app = app.route(
                    &route.path,
                    web::get().to(move || {
                        let handler = Arc::clone(&handler);
                        async move { convert_response_to_actix(handler().await) }
                    }),
                );
            }

            app
        })
        .workers(self.profile.workers)
        .listen(listener)
        .map_err(|e| {
            HarnessError::bind_error(format!("Failed to listen on {}: {}", local_addr, e))
        })?
        .run();

        info!(
            "Actix-Web server starting on {} with {} workers",
            local_addr, self.profile.workers
        );

        server
            .await
            .map_err(|e| HarnessError::server_error(format!("Actix-Web server error: {}", e)))
    }
}

fn convert_response_to_actix(response: Response) -> HttpResponse {
    let status = actix_web::http::StatusCode::from_u16(response.status_u16())
        .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status).body(response.body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_support::{get, hello_route, loopback, spawn_server};
    use crate::workload::WorkloadMode;

    #[test]
    fn test_default_profile_uses_every_core() {
        let profile = ActixProfile::default();
        assert!(profile.workers >= 1);
    }

    #[tokio::test]
    async fn test_actix_web_adapter_route_addition() {
        let mut adapter = ActixWebAdapter::new();
        adapter.route(hello_route(WorkloadMode::Yield));
        assert_eq!(adapter.routes.len(), 1);
        assert!(adapter.listener.is_none());
    }

    #[tokio::test]
    async fn test_actix_web_serves_hello() {
        let mut adapter = ActixWebAdapter::with_profile(ActixProfile { workers: 1 });
        adapter.route(hello_route(WorkloadMode::Yield));
        let addr = adapter.bind(loopback()).unwrap();
        spawn_server(move || adapter.run());

        let (status, body) = get(addr, "/hello").await;
        assert_eq!(status, 200);
        assert_eq!(body, b"hello world");

        // Strict, case-sensitive routing
        let (status, _) = get(addr, "/hello/").await;
        assert_eq!(status, 404);
        let (status, _) = get(addr, "/HELLO").await;
        assert_eq!(status, 404);
    }

    #[test]
    fn test_status_code_conversion() {
        let response = convert_response_to_actix(Response::ok().body("hello world"));
        assert_eq!(response.status(), actix_web::http::StatusCode::OK);

        let response = convert_response_to_actix(Response::not_found());
        assert_eq!(response.status(), actix_web::http::StatusCode::NOT_FOUND);
    }
}
