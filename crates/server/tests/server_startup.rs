use std::io::Write;
use std::net::TcpListener;
use std::time::Duration;

use reqwest::Client;
use tempfile::NamedTempFile;
use tokio::time::{sleep, timeout};

/// Find an available port
fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Write a small inventory feed
fn inventory_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(
        br#"{
  "dataGeracao": "2024-05-01T06:00:00",
  "veiculos": [
    {"sequencia": 1, "veiculo": "TOYOTA COROLLA XEI", "cor": "PRATA", "ano": "2020/2021", "km": 45000, "valorIdealVenda": 98500},
    {"sequencia": 2, "veiculo": "CHEVROLET ONIX LT", "cor": "AZUL", "ano": "2022/2023", "km": 15000, "valorIdealVenda": 75000}
  ]
}"#,
    )
    .unwrap();
    file.flush().unwrap();
    file
}

/// Create a minimal valid config
fn minimal_config(port: u16, inventory_path: &std::path::Path) -> String {
    format!(
        r#"
[server]
host = "127.0.0.1"
port = {}

[inventory]
source = "file"
path = "{}"
"#,
        port,
        inventory_path.display()
    )
}

fn write_config(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

/// Spawn the server and return a handle
async fn spawn_server(config_path: &std::path::Path) -> tokio::process::Child {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_estoque"))
        .env("ESTOQUE_CONFIG", config_path)
        .env("RUST_LOG", "error") // Quiet logs during tests
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn server")
}

/// Wait for server to be ready
async fn wait_for_server(port: u16, max_attempts: u32) -> bool {
    let client = Client::new();
    for _ in 0..max_attempts {
        if client
            .get(format!("http://127.0.0.1:{}/api/v1/health", port))
            .send()
            .await
            .is_ok()
        {
            return true;
        }
        sleep(Duration::from_millis(50)).await;
    }
    false
}

async fn run_to_exit(config_path: &std::path::Path) -> std::process::Output {
    timeout(
        Duration::from_secs(5),
        tokio::process::Command::new(env!("CARGO_BIN_EXE_estoque"))
            .env("ESTOQUE_CONFIG", config_path)
            .env("RUST_LOG", "error")
            .output(),
    )
    .await
    .expect("Command timed out")
    .expect("Failed to execute command")
}

#[tokio::test]
async fn test_health_reports_loaded_inventory() {
    let port = get_available_port();
    let inventory = inventory_file();
    let config = write_config(&minimal_config(port, inventory.path()));

    let mut server = spawn_server(config.path()).await;
    assert!(
        wait_for_server(port, 40).await,
        "Server did not start in time"
    );

    let client = Client::new();
    let response = client
        .get(format!("http://127.0.0.1:{}/api/v1/health", port))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let json: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["total_vehicles"], 2);

    // Cleanup
    server.kill().await.ok();
}

#[tokio::test]
async fn test_search_over_http() {
    let port = get_available_port();
    let inventory = inventory_file();
    let config = write_config(&minimal_config(port, inventory.path()));

    let mut server = spawn_server(config.path()).await;
    assert!(
        wait_for_server(port, 40).await,
        "Server did not start in time"
    );

    let client = Client::new();
    let response = client
        .get(format!(
            "http://127.0.0.1:{}/api/v1/search?modelo=corola",
            port
        ))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let json: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(json["outcome"], "strict");
    assert_eq!(json["vehicles"][0]["sequencia"], 1);

    server.kill().await.ok();
}

#[tokio::test]
async fn test_config_endpoint_returns_sanitized() {
    let port = get_available_port();
    let inventory = inventory_file();
    let config = write_config(&minimal_config(port, inventory.path()));

    let mut server = spawn_server(config.path()).await;
    assert!(
        wait_for_server(port, 40).await,
        "Server did not start in time"
    );

    let client = Client::new();
    let response = client
        .get(format!("http://127.0.0.1:{}/api/v1/config", port))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let json: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(json["server"]["port"], port);
    assert_eq!(json["inventory"]["url_configured"], false);
    assert_eq!(json["search"]["result_limit"], 6);

    server.kill().await.ok();
}

#[tokio::test]
async fn test_missing_config_file_exits_with_error() {
    let result = run_to_exit(std::path::Path::new("/nonexistent/config.toml")).await;
    assert!(!result.status.success());
}

#[tokio::test]
async fn test_http_source_without_url_exits_with_error() {
    let config = write_config(
        r#"
[server]
port = 8080

[inventory]
source = "http"
"#,
    );

    let result = run_to_exit(config.path()).await;
    assert!(!result.status.success());
}
