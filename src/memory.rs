//! One-shot memory sampling.
//!
//! The binary installs a [`CountingAllocator`] as its global allocator. A
//! single [`MemorySampler`] task waits for the configured delay, reads the
//! counters plus whatever the backing allocator reports about its heap, and
//! prints four labeled MiB values to standard output.

use std::alloc::{GlobalAlloc, Layout, System};
use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const MIB: u64 = 1024 * 1024;

/// Global allocator wrapper that tracks cumulative and live bytes.
pub struct CountingAllocator<A> {
    inner: A,
    total: AtomicU64,
    current: AtomicU64,
}

impl<A> CountingAllocator<A> {
    pub const fn new(inner: A) -> Self {
        Self {
            inner,
            total: AtomicU64::new(0),
            current: AtomicU64::new(0),
        }
    }

    /// Bytes ever handed out, never decreasing
    pub fn total_allocated(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Bytes handed out and not yet returned
    pub fn currently_allocated(&self) -> u64 {
        self.current.load(Ordering::Relaxed)
    }

    #[inline]
    fn record_alloc(&self, size: usize) {
        self.total.fetch_add(size as u64, Ordering::Relaxed);
        self.current.fetch_add(size as u64, Ordering::Relaxed);
    }

    #[inline]
    fn record_dealloc(&self, size: usize) {
        self.current.fetch_sub(size as u64, Ordering::Relaxed);
    }
}

unsafe impl<A: GlobalAlloc> GlobalAlloc for CountingAllocator<A> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = self.inner.alloc(layout);
        if !ptr.is_null() {
            self.record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = self.inner.alloc_zeroed(layout);
        if !ptr.is_null() {
            self.record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        self.inner.dealloc(ptr, layout);
        self.record_dealloc(layout.size());
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = self.inner.realloc(ptr, layout, new_size);
        if !new_ptr.is_null() {
            self.record_dealloc(layout.size());
            self.record_alloc(new_size);
        }
        new_ptr
    }
}

/// Heap figures only the backing allocator knows about.
///
/// `None` means the allocator cannot tell; the sampler then falls back to the
/// counting wrapper's own numbers.
pub trait HeapStats {
    /// Bytes currently allocated by the application
    fn heap_allocated(&self) -> Option<u64>;
    /// Bytes the allocator has mapped from the operating system
    fn heap_reserved(&self) -> Option<u64>;
}

impl HeapStats for System {
    fn heap_allocated(&self) -> Option<u64> {
        None
    }

    fn heap_reserved(&self) -> Option<u64> {
        None
    }
}

#[cfg(target_family = "unix")]
impl HeapStats for jemallocator::Jemalloc {
    fn heap_allocated(&self) -> Option<u64> {
        refresh_jemalloc_stats()?;
        jemalloc_ctl::stats::allocated::read()
            .ok()
            .map(|bytes| bytes as u64)
    }

    fn heap_reserved(&self) -> Option<u64> {
        refresh_jemalloc_stats()?;
        jemalloc_ctl::stats::mapped::read()
            .ok()
            .map(|bytes| bytes as u64)
    }
}

/// jemalloc caches its statistics until the epoch is advanced.
#[cfg(target_family = "unix")]
fn refresh_jemalloc_stats() -> Option<()> {
    match jemalloc_ctl::epoch::advance() {
        Ok(_) => Some(()),
        Err(e) => {
            debug!("jemalloc epoch advance failed: {}", e);
            None
        }
    }
}

/// Anything the sampler can read a snapshot from
pub trait MemorySource: Send + Sync {
    fn capture(&self) -> MemoryStats;
}

impl<A: HeapStats + Send + Sync> MemorySource for CountingAllocator<A> {
    fn capture(&self) -> MemoryStats {
        let total_alloc = self.total_allocated();
        let alloc = self.currently_allocated();
        let heap_alloc = self.inner.heap_allocated().unwrap_or(alloc);
        let heap_sys = self.inner.heap_reserved().unwrap_or(heap_alloc);

        MemoryStats {
            total_alloc,
            alloc,
            heap_alloc,
            heap_sys,
        }
    }
}

/// Raw byte counts at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryStats {
    pub total_alloc: u64,
    pub alloc: u64,
    pub heap_alloc: u64,
    pub heap_sys: u64,
}

impl MemoryStats {
    pub fn report(&self) -> MemoryReport {
        MemoryReport::from_stats(self)
    }
}

/// The printed snapshot, in whole mebibytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryReport {
    pub total_alloc_mib: u64,
    pub alloc_mib: u64,
    pub heap_alloc_mib: u64,
    pub heap_sys_mib: u64,
}

impl MemoryReport {
    pub fn from_stats(stats: &MemoryStats) -> Self {
        Self {
            total_alloc_mib: stats.total_alloc / MIB,
            alloc_mib: stats.alloc / MIB,
            heap_alloc_mib: stats.heap_alloc / MIB,
            heap_sys_mib: stats.heap_sys / MIB,
        }
    }
}

impl fmt::Display for MemoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TotalAlloc: {}", self.total_alloc_mib)?;
        writeln!(f, "Alloc: {}", self.alloc_mib)?;
        writeln!(f, "HeapAlloc: {}", self.heap_alloc_mib)?;
        writeln!(f, "HeapSys: {}", self.heap_sys_mib)
    }
}

/// Background task that prints exactly one [`MemoryReport`]
pub struct MemorySampler {
    delay: Duration,
    source: &'static dyn MemorySource,
}

impl MemorySampler {
    pub fn new(delay: Duration, source: &'static dyn MemorySource) -> Self {
        Self { delay, source }
    }

    /// Detach the sampler onto the runtime, reporting to standard output.
    ///
    /// Nothing waits on the handle; if the process ends first the report is
    /// simply never printed.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run(std::io::stdout()))
    }

    /// Wait for the sampling point, then write the report once.
    pub async fn run<W: Write + Send>(self, mut out: W) {
        debug!("memory sample scheduled in {:?}", self.delay);
        tokio::time::sleep(self.delay).await;

        let report = self.source.capture().report();
        // Single write so the four lines are never interleaved or partial.
        let text = report.to_string();
        if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
            warn!("failed to write memory report: {}", e);
        }
    }
}
