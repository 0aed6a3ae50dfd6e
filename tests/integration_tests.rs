use std::net::SocketAddr;
use std::time::{Duration, Instant};
use web_framework_bench::{build_server, BenchConfig, ServerChoice};

/// Start the configured server on an ephemeral port in its own runtime and
/// return the loopback address to reach it.
fn start(selector: &str, latency: &str) -> SocketAddr {
    let config = BenchConfig::from_args(&[selector, latency, "0"]);
    let server = build_server(&config).unwrap();
    let port = server.local_addr().port();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .unwrap();
        let _ = runtime.block_on(server.run());
    });

    SocketAddr::from(([127, 0, 0, 1], port))
}

async fn get(addr: SocketAddr, path: &str) -> (u16, Vec<u8>) {
    let response = reqwest::get(format!("http://{}{}", addr, path))
        .await
        .unwrap();
    let status = response.status().as_u16();
    (status, response.bytes().await.unwrap().to_vec())
}

#[tokio::test]
async fn test_every_framework_says_hello() {
    for choice in ServerChoice::ALL {
        let addr = start(choice.selector(), "0");
        let (status, body) = get(addr, "/hello").await;
        assert_eq!(status, 200, "{}", choice.framework());
        assert_eq!(body, b"hello world", "{}", choice.framework());
    }
}

#[tokio::test]
async fn test_repeated_requests_are_identical() {
    for choice in ServerChoice::ALL {
        let addr = start(choice.selector(), "0");
        let (_, first) = get(addr, "/hello").await;
        for _ in 0..5 {
            let (status, body) = get(addr, "/hello").await;
            assert_eq!(status, 200);
            assert_eq!(body, first, "{}", choice.framework());
        }
    }
}

#[tokio::test]
async fn test_latency_is_honored_by_every_framework() {
    for choice in ServerChoice::ALL {
        let addr = start(choice.selector(), "60");
        // Warm the connection path so the measurement is the handler.
        get(addr, "/hello").await;

        let started = Instant::now();
        let (status, body) = get(addr, "/hello").await;
        let elapsed = started.elapsed();

        assert_eq!(status, 200);
        assert_eq!(body, b"hello world");
        assert!(
            elapsed >= Duration::from_millis(60),
            "{} answered in {:?}",
            choice.framework(),
            elapsed
        );
    }
}

#[tokio::test]
async fn test_cpu_bound_mode_still_answers() {
    for choice in ServerChoice::ALL {
        let addr = start(choice.selector(), "-1");
        let (status, body) = get(addr, "/hello").await;
        assert_eq!(status, 200, "{}", choice.framework());
        assert_eq!(body, b"hello world");
    }
}

#[tokio::test]
async fn test_routing_is_exact_on_every_framework() {
    for choice in ServerChoice::ALL {
        let addr = start(choice.selector(), "0");
        for path in ["/goodbye", "/hello/", "/HELLO"] {
            let (status, _) = get(addr, path).await;
            assert_eq!(status, 404, "{} {}", choice.framework(), path);
        }
    }
}

#[test]
fn test_cpu_sentinel_wins_over_later_values() {
    let config = BenchConfig::from_args(&["salvo", "-1", "8088", "1"]);
    assert!(config.cpu_bound);
    assert_eq!(config.simulated_latency, Duration::ZERO);
    assert_eq!(config.port, 8088);
    assert_eq!(config.sampling_delay, Duration::from_secs(1));
}
