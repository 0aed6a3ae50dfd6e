//! Core handler types and adapter dispatch.

use crate::config::{BenchConfig, ServerChoice};
use crate::error::{HarnessError, Result};
use crate::types::{Response, Route, HELLO_PATH};
use crate::workload::Workload;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tracing::info;

/// A boxed future that returns a `T`
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// The shared request handler injected into every adapter.
///
/// It takes no request input and cannot fail: the workload is the same for
/// every request.
pub type HandlerFn = Arc<dyn Fn() -> BoxFuture<Response> + Send + Sync>;

/// One variant per framework binding; exactly one is chosen per process
pub enum AdapterType {
    Mock(crate::adapters::mock::MockAdapter),
    #[cfg(feature = "axum")]
    Axum(crate::adapters::axum::AxumAdapter),
    #[cfg(feature = "actix-web")]
    ActixWeb(crate::adapters::actix_web::ActixWebAdapter),
    #[cfg(feature = "warp")]
    Warp(crate::adapters::warp::WarpAdapter),
    #[cfg(feature = "poem")]
    Poem(crate::adapters::poem::PoemAdapter),
    #[cfg(feature = "salvo")]
    Salvo(crate::adapters::salvo::SalvoAdapter),
}

impl AdapterType {
    /// Select the adapter for a known choice.
    ///
    /// Fails for unknown selectors and for frameworks whose cargo feature is
    /// disabled.
    pub fn for_choice(choice: &ServerChoice) -> Result<Self> {
        match choice {
            #[cfg(feature = "axum")]
            ServerChoice::Default => Ok(AdapterType::Axum(
                crate::adapters::axum::AxumAdapter::new(),
            )),
            #[cfg(feature = "actix-web")]
            ServerChoice::ActixWeb => Ok(AdapterType::ActixWeb(
                crate::adapters::actix_web::ActixWebAdapter::new(),
            )),
            #[cfg(feature = "warp")]
            ServerChoice::Warp => Ok(AdapterType::Warp(
                crate::adapters::warp::WarpAdapter::new(),
            )),
            #[cfg(feature = "poem")]
            ServerChoice::Poem => Ok(AdapterType::Poem(
                crate::adapters::poem::PoemAdapter::new(),
            )),
            #[cfg(feature = "salvo")]
            ServerChoice::Salvo => Ok(AdapterType::Salvo(
                crate::adapters::salvo::SalvoAdapter::new(),
            )),
            ServerChoice::Unknown(name) => Err(HarnessError::adapter_error(format!(
                "Unknown framework: {}",
                name
            ))),
            #[allow(unreachable_patterns)]
            other => Err(HarnessError::adapter_error(format!(
                "{} support not compiled in; enable the `{}` feature",
                other.framework(),
                other.framework()
            ))),
        }
    }

    fn route(&mut self, route: Route) {
        match self {
            AdapterType::Mock(adapter) => {
                adapter.route(route);
            }
            #[cfg(feature = "axum")]
            AdapterType::Axum(adapter) => {
                adapter.route(route);
            }
            #[cfg(feature = "actix-web")]
            AdapterType::ActixWeb(adapter) => {
                adapter.route(route);
            }
            #[cfg(feature = "warp")]
            AdapterType::Warp(adapter) => {
                adapter.route(route);
            }
            #[cfg(feature = "poem")]
            AdapterType::Poem(adapter) => {
                adapter.route(route);
            }
            #[cfg(feature = "salvo")]
            AdapterType::Salvo(adapter) => {
                adapter.route(route);
            }
        }
    }

    fn bind(&mut self, addr: SocketAddr) -> Result<SocketAddr> {
        match self {
            AdapterType::Mock(adapter) => adapter.bind(addr),
            #[cfg(feature = "axum")]
            AdapterType::Axum(adapter) => adapter.bind(addr),
            #[cfg(feature = "actix-web")]
            AdapterType::ActixWeb(adapter) => adapter.bind(addr),
            #[cfg(feature = "warp")]
            AdapterType::Warp(adapter) => adapter.bind(addr),
            #[cfg(feature = "poem")]
            AdapterType::Poem(adapter) => adapter.bind(addr),
            #[cfg(feature = "salvo")]
            AdapterType::Salvo(adapter) => adapter.bind(addr),
        }
    }

    async fn run(self) -> Result<()> {
        match self {
            AdapterType::Mock(adapter) => adapter.run().await,
            #[cfg(feature = "axum")]
            AdapterType::Axum(adapter) => adapter.run().await,
            #[cfg(feature = "actix-web")]
            AdapterType::ActixWeb(adapter) => adapter.run().await,
            #[cfg(feature = "warp")]
            AdapterType::Warp(adapter) => adapter.run().await,
            #[cfg(feature = "poem")]
            AdapterType::Poem(adapter) => adapter.run().await,
            #[cfg(feature = "salvo")]
            AdapterType::Salvo(adapter) => adapter.run().await,
        }
    }

    /// Framework name for log lines
    pub fn name(&self) -> &'static str {
        match self {
            AdapterType::Mock(_) => "mock",
            #[cfg(feature = "axum")]
            AdapterType::Axum(_) => "axum",
            #[cfg(feature = "actix-web")]
            AdapterType::ActixWeb(_) => "actix-web",
            #[cfg(feature = "warp")]
            AdapterType::Warp(_) => "warp",
            #[cfg(feature = "poem")]
            AdapterType::Poem(_) => "poem",
            #[cfg(feature = "salvo")]
            AdapterType::Salvo(_) => "salvo",
        }
    }
}

/// Web server builder around a single adapter
pub struct WebServer {
    adapter: AdapterType,
    routes: Vec<Route>,
}

impl WebServer {
    /// Create a server for the selected framework
    pub fn new(choice: &ServerChoice) -> Result<Self> {
        Ok(Self::with_adapter(AdapterType::for_choice(choice)?))
    }

    /// Create a new web server with the mock adapter
    pub fn with_mock_adapter() -> Self {
        Self::with_adapter(AdapterType::Mock(crate::adapters::mock::MockAdapter::new()))
    }

    pub fn with_adapter(adapter: AdapterType) -> Self {
        Self {
            adapter,
            routes: Vec::new(),
        }
    }

    /// Register a GET route
    pub fn get(mut self, path: impl Into<String>, handler: HandlerFn) -> Self {
        self.routes.push(Route::get(path, handler));
        self
    }

    /// Apply routes to the adapter and bind its listener
    pub fn bind(mut self, addr: SocketAddr) -> Result<BoundServer> {
        for route in self.routes {
            self.adapter.route(route);
        }
        let local_addr = self.adapter.bind(addr)?;

        Ok(BoundServer {
            adapter: self.adapter,
            local_addr,
        })
    }
}

/// A bound server ready to run
pub struct BoundServer {
    adapter: AdapterType,
    local_addr: SocketAddr,
}

impl BoundServer {
    /// The address actually bound; differs from the requested one for port 0
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn framework(&self) -> &'static str {
        self.adapter.name()
    }

    /// Borrow the mock adapter, if that is what this server runs
    pub fn as_mock(&self) -> Option<&crate::adapters::mock::MockAdapter> {
        match &self.adapter {
            AdapterType::Mock(adapter) => Some(adapter),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }

    /// Serve until the process is terminated
    pub async fn run(self) -> Result<()> {
        self.adapter.run().await
    }
}

/// Wire `/hello` to the configured workload on the selected framework and
/// bind it to the configured port.
pub fn build_server(config: &BenchConfig) -> Result<BoundServer> {
    let workload = Arc::new(Workload::from_config(config));
    let mode = workload.mode();

    let server = WebServer::new(&config.server)?
        .get(HELLO_PATH, workload.handler())
        .bind(config.listen_addr()?)?;

    info!(
        "{} serving GET {} on {} ({:?})",
        server.framework(),
        HELLO_PATH,
        server.local_addr(),
        mode
    );
    Ok(server)
}

#[cfg(test)]
mod tests;
