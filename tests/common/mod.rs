//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use pingguard::config::FilerConfig;
use pingguard::filer::{self, FilerState};
use pingguard::liveness::LivenessTracker;
use pingguard::server::HttpServer;

/// HTTP client that never routes through a proxy.
pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Start a filer over `root` on an ephemeral port with default credentials
/// ("filer"/"filer").
#[allow(dead_code)]
pub async fn start_filer(root: &Path) -> (HttpServer, Arc<LivenessTracker>) {
    let config = FilerConfig {
        bind_address: "127.0.0.1:0".to_string(),
        root: root.to_path_buf(),
        ..Default::default()
    };

    let tracker = Arc::new(LivenessTracker::new());
    let state = Arc::new(FilerState::new(&config, tracker.clone()));
    let server = HttpServer::start(
        &config.bind_address,
        filer::router(state, config.upload_limit),
    )
    .await
    .unwrap();

    (server, tracker)
}

/// Send a raw HTTP/1.1 request and return the status line.
///
/// reqwest normalizes away interesting request targets (dot segments), so
/// path-handling tests go through a plain TCP stream instead.
#[allow(dead_code)]
pub async fn raw_status(
    addr: SocketAddr,
    method: &str,
    target: &str,
    auth: Option<(&str, &str)>,
) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();

    let mut request = format!("{method} {target} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    if let Some((user, pass)) = auth {
        let token = BASE64.encode(format!("{user}:{pass}"));
        request.push_str(&format!("Authorization: Basic {token}\r\n"));
    }
    request.push_str("\r\n");

    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    let response = String::from_utf8_lossy(&response);
    response.lines().next().unwrap_or_default().to_string()
}
