//! # Web Framework Bench
//!
//! A hello-world HTTP harness for comparing Rust web frameworks under an
//! external load generator.
//!
//! One process serves exactly one framework. Every framework binding wires
//! `GET /hello` to the same [`Workload`], which applies a uniform artificial
//! load before answering `hello world`:
//!
//! - **CPU-bound**: a fixed deterministic computation
//! - **Sleep**: suspend the request task for the configured latency
//! - **Yield**: hand the worker back to the scheduler once
//!
//! A one-shot [`MemorySampler`] prints allocation statistics at a fixed
//! offset after startup.
//!
//! ## Supported Frameworks
//!
//! - Axum (`default`)
//! - Actix-Web (`actix`)
//! - Warp (`warp`)
//! - Poem (`poem`)
//! - Salvo (`salvo`)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use web_framework_bench::{build_server, BenchConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BenchConfig::from_args(&["default", "10", "8080"]);
//!     let server = build_server(&config)?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod config;
pub mod core;
pub mod error;
pub mod memory;
pub mod types;
pub mod workload;

pub use config::{BenchConfig, ServerChoice};
pub use core::{build_server, AdapterType, BoundServer, BoxFuture, HandlerFn, WebServer};
pub use error::{HarnessError, Result};
pub use memory::{
    CountingAllocator, HeapStats, MemoryReport, MemorySampler, MemorySource, MemoryStats,
};
pub use types::{Response, Route, HELLO_PATH, HELLO_PAYLOAD};
pub use workload::{Workload, WorkloadMode};

pub use adapters::mock::MockAdapter;

#[cfg(feature = "axum")]
pub use adapters::axum::AxumAdapter;

#[cfg(feature = "actix-web")]
pub use adapters::actix_web::{ActixProfile, ActixWebAdapter};

#[cfg(feature = "warp")]
pub use adapters::warp::WarpAdapter;

#[cfg(feature = "poem")]
pub use adapters::poem::PoemAdapter;

#[cfg(feature = "salvo")]
pub use adapters::salvo::SalvoAdapter;

/// Printed when the adapter selector is not recognized
pub const UNKNOWN_FRAMEWORK_BANNER: &str = "\
--------------------------------------------------------------------
------------- Unknown framework given!!! Check libs.sh -------------
------------- Unknown framework given!!! Check libs.sh -------------
------------- Unknown framework given!!! Check libs.sh -------------
--------------------------------------------------------------------";
