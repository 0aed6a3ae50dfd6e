//! Startup configuration.
//!
//! Four positional values are read once at process start and frozen into a
//! [`BenchConfig`]. Everything downstream (the memory sampler and every
//! adapter's handler) receives this value; nothing mutates it afterwards.

use crate::error::{HarnessError, Result};
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

/// Default listen port
pub const DEFAULT_PORT: u16 = 8080;
/// Default delay before the memory snapshot, in seconds
pub const DEFAULT_SAMPLING_DELAY_SECS: u64 = 20;
/// Latency argument that switches the simulator into CPU-bound mode
pub const CPU_BOUND_SENTINEL: i64 = -1;

/// Which framework binding serves `/hello`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerChoice {
    /// axum, the baseline binding
    Default,
    ActixWeb,
    Warp,
    Poem,
    Salvo,
    /// An unrecognized selector; no server is started
    Unknown(String),
}

impl ServerChoice {
    /// Every selectable adapter, in display order
    pub const ALL: [ServerChoice; 5] = [
        ServerChoice::Default,
        ServerChoice::ActixWeb,
        ServerChoice::Warp,
        ServerChoice::Poem,
        ServerChoice::Salvo,
    ];

    /// The selector string accepted on the command line
    pub fn selector(&self) -> &str {
        match self {
            ServerChoice::Default => "default",
            ServerChoice::ActixWeb => "actix",
            ServerChoice::Warp => "warp",
            ServerChoice::Poem => "poem",
            ServerChoice::Salvo => "salvo",
            ServerChoice::Unknown(name) => name,
        }
    }

    /// Human readable framework name
    pub fn framework(&self) -> &'static str {
        match self {
            ServerChoice::Default => "axum",
            ServerChoice::ActixWeb => "actix-web",
            ServerChoice::Warp => "warp",
            ServerChoice::Poem => "poem",
            ServerChoice::Salvo => "salvo",
            ServerChoice::Unknown(_) => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ServerChoice::Unknown(_))
    }
}

impl FromStr for ServerChoice {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "default" => ServerChoice::Default,
            "actix" => ServerChoice::ActixWeb,
            "warp" => ServerChoice::Warp,
            "poem" => ServerChoice::Poem,
            "salvo" => ServerChoice::Salvo,
            other => ServerChoice::Unknown(other.to_string()),
        })
    }
}

impl fmt::Display for ServerChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.selector())
    }
}

/// Immutable process-wide configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchConfig {
    pub server: ServerChoice,
    /// Per-request sleep; zero means cooperative yield
    pub simulated_latency: Duration,
    /// Burn CPU instead of sleeping
    pub cpu_bound: bool,
    /// Port as given; a value outside `0..=65535` fails at bind time
    pub port: i64,
    pub sampling_delay: Duration,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            server: ServerChoice::Default,
            simulated_latency: Duration::ZERO,
            cpu_bound: false,
            port: i64::from(DEFAULT_PORT),
            sampling_delay: Duration::from_secs(DEFAULT_SAMPLING_DELAY_SECS),
        }
    }
}

impl BenchConfig {
    /// Build the configuration from the positional arguments, in order:
    /// adapter selector, latency in ms, port, sampling delay in seconds.
    ///
    /// Absent trailing values keep their defaults. Numeric values that do
    /// not parse are read as `0` rather than rejected.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Self {
        let mut config = Self::default();
        let mut args = args.iter().map(AsRef::as_ref);

        if let Some(server) = args.next() {
            config.server = server.parse().unwrap_or(ServerChoice::Default);
        }

        if let Some(latency) = args.next() {
            let millis = parse_int_lossy(latency);
            if millis == CPU_BOUND_SENTINEL {
                config.cpu_bound = true;
                config.simulated_latency = Duration::ZERO;
            } else {
                config.simulated_latency = Duration::from_millis(clamp_non_negative(millis));
            }
        }

        if let Some(port) = args.next() {
            config.port = parse_int_lossy(port);
        }

        if let Some(delay) = args.next() {
            config.sampling_delay = Duration::from_secs(clamp_non_negative(parse_int_lossy(delay)));
        }

        config
    }

    /// Address every adapter binds: all interfaces on the configured port.
    ///
    /// A numeric port outside the TCP range cannot be listened on and is
    /// reported as a bind failure.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let port = u16::try_from(self.port).map_err(|_| {
            HarnessError::bind_error(format!(
                "Failed to bind to {}:{}: invalid port",
                Ipv4Addr::UNSPECIFIED,
                self.port
            ))
        })?;
        Ok(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))
    }
}

/// Parse a decimal integer, reading anything malformed as zero.
/// Surrounding whitespace counts as malformed.
fn parse_int_lossy(value: &str) -> i64 {
    value.parse().unwrap_or(0)
}

fn clamp_non_negative(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
