//! Framework adapters.
//!
//! Every adapter takes the same inputs: GET routes carrying a shared
//! [`HandlerFn`](crate::core::HandlerFn), and a listener bound up front by
//! [`bind_listener`]. Binding before the framework starts keeps bind failures
//! uniform across frameworks and makes the real port known for port `0`.

use crate::error::{HarnessError, Result};
use std::net::{SocketAddr, TcpListener};

pub mod mock;

#[cfg(feature = "axum")]
pub mod axum;

#[cfg(feature = "actix-web")]
pub mod actix_web;

#[cfg(feature = "warp")]
pub mod warp;

#[cfg(feature = "poem")]
pub mod poem;

#[cfg(feature = "salvo")]
pub mod salvo;

/// Bind a non-blocking TCP listener ready to hand to an async runtime.
pub(crate) fn bind_listener(addr: SocketAddr) -> Result<TcpListener> {
    let listener = TcpListener::bind(addr)
        .map_err(|e| HarnessError::bind_error(format!("Failed to bind to {}: {}", addr, e)))?;
    listener.set_nonblocking(true)?;
    Ok(listener)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::types::{Route, HELLO_PATH};
    use crate::workload::{Workload, WorkloadMode};
    use std::future::Future;
    use std::net::SocketAddr;
    use std::sync::Arc;

    pub fn hello_route(mode: WorkloadMode) -> Route {
        Route::get(HELLO_PATH, Arc::new(Workload::new(mode)).handler())
    }

    pub fn loopback() -> SocketAddr {
        "127.0.0.1:0".parse().unwrap()
    }

    /// Run a server on its own thread and runtime for the rest of the test
    /// process. The listener is already bound, so requests can be sent
    /// immediately.
    pub fn spawn_server<F, Fut>(start: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = crate::error::Result<()>>,
    {
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .unwrap();
            let _ = runtime.block_on(start());
        });
    }

    /// Issue a GET and return status plus body
    pub async fn get(addr: SocketAddr, path: &str) -> (u16, Vec<u8>) {
        let response = reqwest::get(format!("http://{}{}", addr, path))
            .await
            .unwrap();
        let status = response.status().as_u16();
        let body = response.bytes().await.unwrap().to_vec();
        (status, body)
    }
}
