//! Per-request workload simulation.
//!
//! Every adapter calls into the same [`Workload`], so the only thing that
//! differs between benchmark runs is the framework's own dispatch cost.

use crate::config::BenchConfig;
use crate::core::{BoxFuture, HandlerFn};
use crate::types::{Response, HELLO_PAYLOAD};
use bytes::Bytes;
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

/// Exponent and series length for the CPU-bound computation
pub const CPU_TARGET: u32 = 15;

/// What a request does before responding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadMode {
    /// Run [`burn_cpu`] with the given target
    CpuBound { target: u32 },
    /// Suspend the request task for a fixed duration
    Sleep(Duration),
    /// Hand the worker back to the scheduler once
    Yield,
}

impl WorkloadMode {
    pub fn from_config(config: &BenchConfig) -> Self {
        if config.cpu_bound {
            WorkloadMode::CpuBound { target: CPU_TARGET }
        } else if !config.simulated_latency.is_zero() {
            WorkloadMode::Sleep(config.simulated_latency)
        } else {
            WorkloadMode::Yield
        }
    }
}

/// The shared request handler body
#[derive(Debug, Clone)]
pub struct Workload {
    mode: WorkloadMode,
    payload: Bytes,
}

impl Workload {
    pub fn new(mode: WorkloadMode) -> Self {
        Self {
            mode,
            payload: Bytes::from_static(HELLO_PAYLOAD),
        }
    }

    pub fn from_config(config: &BenchConfig) -> Self {
        Self::new(WorkloadMode::from_config(config))
    }

    pub fn mode(&self) -> WorkloadMode {
        self.mode
    }

    /// Apply the configured load, then produce the fixed payload.
    pub async fn simulate(&self) -> Response {
        match self.mode {
            WorkloadMode::CpuBound { target } => {
                let _ = black_box(burn_cpu(target));
            }
            WorkloadMode::Sleep(duration) => tokio::time::sleep(duration).await,
            WorkloadMode::Yield => tokio::task::yield_now().await,
        }

        // Bytes clones share the static payload.
        Response::ok().body(self.payload.clone())
    }

    /// Wrap the workload as the handler injected into every adapter
    pub fn handler(self: Arc<Self>) -> HandlerFn {
        Arc::new(move || {
            let workload = Arc::clone(&self);
            Box::pin(async move { workload.simulate().await }) as BoxFuture<Response>
        })
    }
}

/// Fixed CPU workload: a wrapping power series over `2^target` bases.
///
/// The result is deterministic for a given target. Inputs go through
/// `black_box` so the loop cannot be folded at compile time.
pub fn burn_cpu(target: u32) -> u64 {
    let target = black_box(target);
    let count = 1u64 << target.min(31);
    let mut acc = 0u64;
    for base in 0..count {
        acc = acc.wrapping_add(black_box(base).wrapping_pow(target));
    }
    acc
}
