//! Salvo framework adapter.

use crate::core::HandlerFn;
use crate::error::{HarnessError, Result};
use crate::types::{Response, Route};
use salvo::prelude::*;
use salvo::{
    conn::tcp::TcpAcceptor, http::StatusCode as SalvoStatusCode, Request as SalvoRequest,
    Response as SalvoResponse, Router, Server,
};
use std::net::SocketAddr;
use tracing::{debug, info};

/// Salvo framework adapter
pub struct SalvoAdapter {
    routes: Vec<Route>,
    listener: Option<std::net::TcpListener>,
}

impl Default for SalvoAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SalvoAdapter {
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
        debug!("Added Salvo route: GET {}", route.path);
        self.routes.push(route);
        self
    }

    /// Serve until the process is terminated
    pub async fn run(self) -> Result<()> {
        let listener = self
            .listener
            .ok_or_else(|| HarnessError::bind_error("No address bound"))?;
        let local_addr = listener.local_addr()?;

        let mut router = Router::new();
        for route in self.routes {
            // Salvo paths are relative to the parent router
            let path = route.path.trim_start_matches('/').to_string();
            router = router.push(Router::with_path(path).get(SalvoHandlerWrapper {
                path: route.path,
                handler: route.handler,
            }));
        }

        let listener = tokio::net::TcpListener::from_std(listener)?;
        let acceptor = TcpAcceptor::try_from(listener)?;
        info!("Salvo server starting on {}", local_addr);

        Server::new(acceptor)
            .try_serve(router)
            .await
            .map_err(|e| HarnessError::server_error(format!("Salvo server error: {}", e)))
    }
}

/// Wrapper to adapt our HandlerFn to Salvo's Handler trait
#[derive(Clone)]
struct SalvoHandlerWrapper {
    path: String,
    handler: HandlerFn,
}

#[salvo::async_trait]
impl Handler for SalvoHandlerWrapper {
    async fn handle(
        &self,
        req: &mut SalvoRequest,
        _depot: &mut Depot,
        res: &mut SalvoResponse,
        _ctrl: &mut FlowCtrl,
    ) {
        // Salvo matches `/hello/` against `hello`; only the exact path is served.
        if req.uri().path() != self.path {
            convert_response_to_salvo(Response::not_found(), res);
            return;
        }
        let response = (self.handler)().await;
        convert_response_to_salvo(response, res);
    }
}

fn convert_response_to_salvo(response: Response, res: &mut SalvoResponse) {
    let status = SalvoStatusCode::from_u16(response.status_u16())
        .unwrap_or(SalvoStatusCode::INTERNAL_SERVER_ERROR);
    res.status_code(status);
    res.body(response.body);
}
