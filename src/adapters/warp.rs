//! Warp framework adapter.

use crate::error::{HarnessError, Result};
use crate::types::{Response, Route};
use std::{net::SocketAddr, sync::Arc};
use tokio_stream::wrappers::TcpListenerStream;
use tracing::{debug, info};
use warp::{http::StatusCode as WarpStatusCode, hyper::Body, path::FullPath, Filter, Rejection};

/// Warp framework adapter
pub struct WarpAdapter {
    routes: Vec<Route>,
    listener: Option<std::net::TcpListener>,
}

impl Default for WarpAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl WarpAdapter {
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

    /// Serve until the process is terminated
    pub async fn run(self) -> Result<()> {
        let listener = self
            .listener
            .ok_or_else(|| HarnessError::bind_error("No address bound"))?;
        let listener = tokio::net::TcpListener::from_std(listener)?;

        info!("Warp server starting on {}", listener.local_addr()?);

        // GET on any path, dispatched against the registered routes; misses
        // fall through to warp's own not-found rejection.
        let routes = Arc::new(self.routes);
        let routes_filter = warp::get()
            .and(warp::path::full())
            .and_then(move |path: FullPath| {
                let routes = Arc::clone(&routes);
                async move { handle_warp_request(path, routes).await }
            });

        warp::serve(routes_filter)
            .run_incoming(TcpListenerStream::new(listener))
            .await;

        Ok(())
    }

    /// Add a GET route to the server
    pub fn route(&mut self, route: Route) -> &mut Self {
        debug!("Added Warp route: GET {}", route.path);
        self.routes.push(route);
        self
    }
}

async fn handle_warp_request(
    path: FullPath,
    routes: Arc<Vec<Route>>,
) -> std::result::Result<warp::reply::Response, Rejection> {
    let handler = routes
        .iter()
        .find(|route| route.path == path.as_str())
        .map(|route| Arc::clone(&route.handler));

    match handler {
        Some(handler) => Ok(convert_response_to_warp(handler().await)),
        None => Err(warp::reject::not_found()),
    }
}

fn convert_response_to_warp(response: Response) -> warp::reply::Response {
    let status = WarpStatusCode::from_u16(response.status_u16())
        .unwrap_or(WarpStatusCode::INTERNAL_SERVER_ERROR);
    let mut reply = warp::reply::Response::new(Body::from(response.body));
    *reply.status_mut() = status;
    reply
}
