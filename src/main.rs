//! `bench-server [FRAMEWORK] [LATENCY_MS] [PORT] [SAMPLING_SECS]`
//!
//! Serves `GET /hello` on one framework until killed. Standard output carries
//! only the unknown-framework banner and the one-shot memory report;
//! diagnostics go to standard error (`RUST_LOG`, default `warn`).

use clap::Parser;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use web_framework_bench::{
    build_server, BenchConfig, CountingAllocator, MemorySampler, UNKNOWN_FRAMEWORK_BANNER,
};

#[cfg(target_family = "unix")]
#[global_allocator]
static ALLOC: CountingAllocator<jemallocator::Jemalloc> =
    CountingAllocator::new(jemallocator::Jemalloc);

#[cfg(not(target_family = "unix"))]
#[global_allocator]
static ALLOC: CountingAllocator<std::alloc::System> = CountingAllocator::new(std::alloc::System);

#[derive(Parser, Debug)]
#[command(
    name = "bench-server",
    version,
    about = "Hello-world HTTP server for web framework benchmarks",
    allow_negative_numbers = true
)]
struct Cli {
    /// Framework to serve with: default (axum), actix, warp, poem, salvo
    #[arg(value_name = "FRAMEWORK")]
    framework: Option<String>,

    /// Per-request latency in milliseconds; 0 yields, -1 burns CPU instead
    #[arg(value_name = "LATENCY_MS", allow_hyphen_values = true)]
    latency_ms: Option<String>,

    /// Port to listen on, all interfaces
    #[arg(value_name = "PORT", allow_hyphen_values = true)]
    port: Option<String>,

    /// Seconds after startup to print the memory report
    #[arg(value_name = "SAMPLING_SECS", allow_hyphen_values = true)]
    sampling_secs: Option<String>,

    #[arg(hide = true, allow_hyphen_values = true)]
    #[allow(dead_code)]
    ignored: Vec<String>,
}

impl Cli {
    fn positionals(&self) -> Vec<&str> {
        [
            &self.framework,
            &self.latency_ms,
            &self.port,
            &self.sampling_secs,
        ]
        .into_iter()
        .map_while(|arg| arg.as_deref())
        .collect()
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let config = BenchConfig::from_args(&cli.positionals());
    info!(?config, "starting benchmark server");

    MemorySampler::new(config.sampling_delay, &ALLOC).spawn();

    if !config.server.is_known() {
        println!("{}", UNKNOWN_FRAMEWORK_BANNER);
        warn!("unknown framework {:?}, no server started", config.server.selector());
        // Stay up with nothing listening until killed.
        std::future::pending::<()>().await;
        return ExitCode::SUCCESS;
    }

    let result = match build_server(&config) {
        Ok(server) => server.run().await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cpu_sentinel_is_a_value() {
        let cli = Cli::try_parse_from(["bench-server", "actix", "-1", "9000"]).unwrap();
        assert_eq!(cli.positionals(), vec!["actix", "-1", "9000"]);

        let config = BenchConfig::from_args(&cli.positionals());
        assert!(config.cpu_bound);
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_extra_arguments_are_ignored() {
        let cli =
            Cli::try_parse_from(["bench-server", "warp", "5", "8081", "3", "extra"]).unwrap();
        assert_eq!(cli.positionals(), vec!["warp", "5", "8081", "3"]);
    }

    #[test]
    fn test_no_arguments_means_defaults() {
        let cli = Cli::try_parse_from(["bench-server"]).unwrap();
        assert!(cli.positionals().is_empty());
        assert_eq!(
            BenchConfig::from_args(&cli.positionals()),
            BenchConfig::default()
        );
    }
}
