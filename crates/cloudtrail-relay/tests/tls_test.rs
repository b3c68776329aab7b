// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use cloudtrail_relay::{Deliver, Event, HttpDeliveryClient, Metadata, RelayConfig, RelayError};
use reqwest::Url;
use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::ServerConfig;
use serde_json::Value;
use std::io::Write;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;

const OK_RESPONSE: &[u8] = b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n";

/// HTTPS endpoint on 127.0.0.1 presenting a freshly generated self-signed certificate.
struct SelfSignedEndpoint {
    url: Url,
    cert_pem: String,
    bodies: Arc<Mutex<Vec<String>>>,
}

impl SelfSignedEndpoint {
    async fn start() -> Self {
        let rcgen::CertifiedKey { cert, key_pair } = self_signed_certificate();
        let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_pair.serialize_der()));
        let server_config =
            ServerConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
                .with_safe_default_protocol_versions()
                .expect("failed to select protocol versions")
                .with_no_client_auth()
                .with_single_cert(vec![cert.der().clone()], key)
                .expect("failed to build server config");
        let acceptor = TlsAcceptor::from(Arc::new(server_config));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind listener");
        let port = listener.local_addr().expect("no local address").port();
        let bodies = Arc::new(Mutex::new(Vec::new()));

        let received = Arc::clone(&bodies);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let acceptor = acceptor.clone();
                let received = Arc::clone(&received);
                tokio::spawn(async move {
                    // A client that rejects the certificate aborts the handshake.
                    let Ok(mut stream) = acceptor.accept(stream).await else {
                        return;
                    };
                    if let Ok(body) = read_request_body(&mut stream).await {
                        received.lock().expect("lock poisoned").push(body);
                        let _ = stream.write_all(OK_RESPONSE).await;
                        let _ = stream.shutdown().await;
                    }
                });
            }
        });

        Self {
            url: Url::parse(&format!("https://127.0.0.1:{port}/v1/batch"))
                .expect("failed to parse endpoint"),
            cert_pem: cert.pem(),
            bodies,
        }
    }

    fn received(&self) -> Vec<String> {
        self.bodies.lock().expect("lock poisoned").clone()
    }
}

fn self_signed_certificate() -> rcgen::CertifiedKey {
    rcgen::generate_simple_self_signed(vec!["localhost".to_string(), "127.0.0.1".to_string()])
        .expect("failed to generate certificate")
}

/// Reads one HTTP/1.1 request and returns its body.
async fn read_request_body<S: AsyncRead + Unpin>(stream: &mut S) -> std::io::Result<String> {
    let mut request = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        request.extend_from_slice(&chunk[..read]);

        let Some(head_end) = request.windows(4).position(|window| window == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&request[..head_end]).to_ascii_lowercase();
        let content_length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        let body_start = head_end + 4;
        if request.len() >= body_start + content_length {
            let body = &request[body_start..body_start + content_length];
            return Ok(String::from_utf8_lossy(body).into_owned());
        }
    }
}

fn relay_config(endpoint: &Url, ca_cert_path: Option<PathBuf>) -> RelayConfig {
    RelayConfig {
        endpoint: endpoint.clone(),
        batch_size: NonZeroUsize::new(10).expect("batch size must be positive"),
        timeout: Duration::from_secs(5),
        ca_cert_path,
        log_level: "debug".to_string(),
    }
}

fn pem_file(pem: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp file");
    file.write_all(pem.as_bytes())
        .expect("failed to write certificate");
    file
}

fn event(source: &str) -> Event {
    Event {
        source: source.to_string(),
        timestamp: "2021-01-01T00:00:00Z".to_string(),
        message: "signin.amazonaws.com ConsoleLogin".to_string(),
        metadata: Metadata {
            event_version: "1.08".to_string(),
            aws_region: "us-east-1".to_string(),
            event_source: "signin.amazonaws.com".to_string(),
            source_ip_address: "203.0.113.7".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
        },
    }
}

#[tokio::test]
async fn default_client_accepts_self_signed_endpoint() {
    let endpoint = SelfSignedEndpoint::start().await;
    let client = HttpDeliveryClient::new(&relay_config(&endpoint.url, None))
        .expect("failed to build client");

    client
        .deliver(&[event("alice")])
        .await
        .expect("delivery to a self-signed endpoint should succeed");

    let bodies = endpoint.received();
    assert_eq!(bodies.len(), 1);
    let payload: Value = serde_json::from_str(&bodies[0]).expect("body is not JSON");
    assert_eq!(payload[0]["source"], "alice");
}

#[tokio::test]
async fn verifying_client_rejects_self_signed_endpoint() {
    let endpoint = SelfSignedEndpoint::start().await;
    let verifying = reqwest::Client::builder()
        .use_rustls_tls()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("failed to build client");
    let client = HttpDeliveryClient::with_client(verifying, endpoint.url.clone());

    let err = client
        .deliver(&[event("alice")])
        .await
        .expect_err("certificate verification should fail");

    assert!(matches!(err, RelayError::DeliveryFailure(_)));
    assert!(endpoint.received().is_empty());
}

#[tokio::test]
async fn pinned_certificate_is_trusted() {
    let endpoint = SelfSignedEndpoint::start().await;
    let pem = pem_file(&endpoint.cert_pem);
    let client = HttpDeliveryClient::new(&relay_config(
        &endpoint.url,
        Some(pem.path().to_path_buf()),
    ))
    .expect("failed to build client");

    client
        .deliver(&[event("alice"), event("bob")])
        .await
        .expect("delivery to the pinned endpoint should succeed");

    assert_eq!(endpoint.received().len(), 1);
}

#[tokio::test]
async fn pinned_certificate_rejects_other_certificates() {
    let endpoint = SelfSignedEndpoint::start().await;
    let other = pem_file(&self_signed_certificate().cert.pem());
    let client = HttpDeliveryClient::new(&relay_config(
        &endpoint.url,
        Some(other.path().to_path_buf()),
    ))
    .expect("failed to build client");

    let err = client
        .deliver(&[event("alice")])
        .await
        .expect_err("an endpoint with a different certificate must be rejected");

    assert!(matches!(err, RelayError::DeliveryFailure(_)));
    assert!(endpoint.received().is_empty());
}
