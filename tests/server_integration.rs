//! Integration tests for the NexoDrive web server over a real socket.

use nexodrive::{Config, FileStore, WebServer};
use serde_json::Value;
use tempfile::TempDir;

fn test_config() -> Config {
    let mut config = Config::default();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;
    config
}

async fn start_server(config: &Config, root: &TempDir) -> std::net::SocketAddr {
    let store = FileStore::open(root.path(), config.files.max_upload_size_bytes())
        .await
        .expect("Failed to open file store");
    WebServer::new(config, store)
        .expect("Failed to create web server")
        .run_with_addr()
        .await
        .expect("Failed to start web server")
}

#[tokio::test]
async fn test_upload_and_download_over_http() {
    let root = TempDir::new().unwrap();
    let addr = start_server(&test_config(), &root).await;
    let client = reqwest::Client::new();

    let form = reqwest::multipart::Form::new()
        .text("name", "report.pdf")
        .text("uploader", "alice")
        .text("ts", "1700000000")
        .part(
            "file",
            reqwest::multipart::Part::bytes(b"hello world!".to_vec()).file_name("report.pdf"),
        );
    let resp = client
        .post(format!("http://{}/api/upload", addr))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let listing: Value = client
        .get(format!("http://{}/api/list", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listing["files"][0]["name"], "/u/report.pdf");
    assert_eq!(listing["files"][0]["uploader"], "alice");

    let resp = client
        .get(format!("http://{}/api/download?path=/u/report.pdf", addr))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    assert_eq!(resp.headers()["content-length"], "12");
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"hello world!");
}

#[tokio::test]
async fn test_declared_oversize_is_rejected() {
    let root = TempDir::new().unwrap();
    let mut config = test_config();
    config.files.max_upload_size_mb = 1;
    let addr = start_server(&config, &root).await;

    let form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(vec![0u8; 2 * 1024 * 1024]).file_name("big.bin"),
    );
    let result = reqwest::Client::new()
        .post(format!("http://{}/api/upload", addr))
        .multipart(form)
        .send()
        .await;

    // The server may close the connection before the body is fully sent
    match result {
        Ok(resp) => assert_eq!(resp.status(), reqwest::StatusCode::PAYLOAD_TOO_LARGE),
        Err(e) => assert!(!e.is_builder(), "request was never sent: {e}"),
    }

    let listing: Value = reqwest::get(format!("http://{}/api/list", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let files = listing["files"].as_array().unwrap();
    assert!(files.iter().all(|f| f["name"] != "/u/big.bin"));
    assert!(!root.path().join("u").join("big.bin").exists());

    let ledger = std::fs::read_to_string(root.path().join("meta.json")).unwrap();
    assert!(!ledger.contains("big.bin"));
}

#[tokio::test]
async fn test_static_ui_served() {
    let root = TempDir::new().unwrap();
    let www = TempDir::new().unwrap();
    std::fs::write(www.path().join("index.html"), "<h1>drive</h1>").unwrap();

    let mut config = test_config();
    config.web.serve_static = true;
    config.web.static_path = www.path().to_string_lossy().into_owned();
    let addr = start_server(&config, &root).await;

    let body = reqwest::get(format!("http://{}/", addr))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "<h1>drive</h1>");

    let health = reqwest::get(format!("http://{}/health", addr))
        .await
        .unwrap();
    assert!(health.status().is_success());
}
