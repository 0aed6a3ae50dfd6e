use super::*;
use crate::workload::{Workload, WorkloadMode};

fn hello_handler() -> HandlerFn {
    Arc::new(Workload::new(WorkloadMode::Yield)).handler()
}

#[tokio::test]
async fn test_mock_server_routes_hello() {
    let server = WebServer::with_mock_adapter()
        .get("/hello", hello_handler())
        .bind("127.0.0.1:8080".parse().unwrap())
        .unwrap();

    assert_eq!(server.framework(), "mock");
    assert_eq!(server.local_addr().port(), 8080);

    let mock = server.as_mock().unwrap();
    let response = mock.simulate_request("/hello").await;
    assert_eq!(response.status_u16(), 200);
    assert_eq!(&response.body[..], b"hello world");

    let response = mock.simulate_request("/").await;
    assert_eq!(response.status_u16(), 404);
}

#[tokio::test]
async fn test_mock_server_run_returns() {
    let server = WebServer::with_mock_adapter()
        .get("/hello", hello_handler())
        .bind("127.0.0.1:0".parse().unwrap())
        .unwrap();
    assert!(server.run().await.is_ok());
}

#[test]
fn test_unknown_choice_is_rejected() {
    let choice = ServerChoice::Unknown("nonsense".to_string());
    let err = WebServer::new(&choice).err().unwrap();
    assert!(matches!(err, HarnessError::AdapterError(_)));
    assert!(err.to_string().contains("nonsense"));
}

#[cfg(all(
    feature = "axum",
    feature = "actix-web",
    feature = "warp",
    feature = "poem",
    feature = "salvo"
))]
#[test]
fn test_every_known_choice_has_an_adapter() {
    for choice in ServerChoice::ALL {
        let adapter = AdapterType::for_choice(&choice).unwrap();
        assert_eq!(adapter.name(), choice.framework());
    }
}

#[cfg(feature = "axum")]
#[test]
fn test_build_server_binds_ephemeral_port() {
    let config = BenchConfig::from_args(&["default", "0", "0"]);
    let server = build_server(&config).unwrap();
    assert_eq!(server.framework(), "axum");
    assert_ne!(server.local_addr().port(), 0);
    assert!(server.local_addr().ip().is_unspecified());
}

#[cfg(feature = "axum")]
#[test]
fn test_build_server_port_in_use_is_bind_error() {
    let taken = std::net::TcpListener::bind("0.0.0.0:0").unwrap();
    let port = taken.local_addr().unwrap().port();

    let args = ["default".to_string(), "0".to_string(), port.to_string()];
    let config = BenchConfig::from_args(&args);
    let err = build_server(&config).err().unwrap();
    assert!(matches!(err, HarnessError::BindError(_)));
}

#[cfg(feature = "axum")]
#[test]
fn test_build_server_out_of_range_port_is_bind_error() {
    let config = BenchConfig::from_args(&["default", "0", "70000"]);
    let err = build_server(&config).err().unwrap();
    assert!(matches!(err, HarnessError::BindError(_)));
}
