//! Delivery tests against a mock collector

use hostagent_api::{Filesystem, Host, HostData};
use hostagent_client::{DeliveryClient, DeliveryConfig, DeliveryOutcome};
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn document() -> HostData {
    let mut data = HostData::new(Host {
        hostname: "db01".to_string(),
        cpu_cores: 4,
        ..Host::default()
    });
    data.agent_version = "0.1.0".to_string();
    data.schema_version = 1;
    data.filesystems.push(Filesystem {
        filesystem: "/dev/sda1".to_string(),
        fs_type: "ext4".to_string(),
        size: 1024,
        used_space: 512,
        available_space: 512,
        mounted_on: "/".to_string(),
    });
    data
}

fn config(server: &MockServer) -> DeliveryConfig {
    DeliveryConfig::new(format!("{}/api", server.uri()), "agent", "secret")
}

#[tokio::test]
async fn test_send_success() {
    let server = MockServer::start().await;
    let data = document();

    Mock::given(method("POST"))
        .and(path("/api/hosts"))
        .and(header("content-type", "application/json"))
        // agent:secret
        .and(header("authorization", "Basic YWdlbnQ6c2VjcmV0"))
        .and(body_json(&data))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = DeliveryClient::new(&config(&server)).unwrap();
    let outcome = client.send(&data).await;

    assert_eq!(outcome, DeliveryOutcome::Success);
}

#[tokio::test]
async fn test_any_2xx_is_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/hosts"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = DeliveryClient::new(&config(&server)).unwrap();

    assert!(client.send(&document()).await.is_success());
}

#[tokio::test]
async fn test_rejection_is_failed_and_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/hosts"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = DeliveryClient::new(&config(&server)).unwrap();
    let outcome = client.send(&document()).await;

    assert_eq!(outcome, DeliveryOutcome::Failed);
    // expect(1) is verified when the server drops
}

#[tokio::test]
async fn test_unauthorized_is_failed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = DeliveryClient::new(&config(&server)).unwrap();

    assert_eq!(client.send(&document()).await, DeliveryOutcome::Failed);
}

#[tokio::test]
async fn test_transport_error_is_failed() {
    // Nothing listens on the discard port.
    let config = DeliveryConfig::new("http://127.0.0.1:9", "agent", "secret");
    let client = DeliveryClient::new(&config).unwrap();

    assert_eq!(client.send(&document()).await, DeliveryOutcome::Failed);
}

#[tokio::test]
async fn test_verbose_writes_diagnostic_copy() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config(&server);
    config.verbose = true;
    config.diagnostic_dir = Some(dir.path().to_path_buf());

    let client = DeliveryClient::new(&config).unwrap();
    assert!(client.send(&document()).await.is_success());

    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(entries.len(), 1);

    let text = std::fs::read_to_string(&entries[0]).unwrap();
    let parsed: HostData = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, document());
}

#[tokio::test]
async fn test_unwritable_diagnostic_dir_does_not_block_delivery() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config(&server);
    config.verbose = true;
    config.diagnostic_dir = Some(dir.path().join("missing").join("nested"));

    let client = DeliveryClient::new(&config).unwrap();

    assert!(client.send(&document()).await.is_success());
}
