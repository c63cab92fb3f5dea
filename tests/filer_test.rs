//! Integration tests for the filer file server.

use std::time::Duration;

use serde_json::Value;

mod common;

const CONTENT: &[u8] = b"hello filer";

#[tokio::test]
async fn test_unauthorized_request_gets_challenge() {
    let root = tempfile::tempdir().unwrap();
    let (server, _tracker) = common::start_filer(root.path()).await;
    let base = format!("http://{}", server.local_addr());

    let client = common::test_client();
    let response = client.get(format!("{base}/?action=list")).send().await.unwrap();

    assert_eq!(response.status(), 401);
    let challenge = response
        .headers()
        .get("www-authenticate")
        .expect("challenge header missing")
        .to_str()
        .unwrap();
    assert!(challenge.starts_with("Basic"));

    let response = client
        .get(format!("{base}/?action=list"))
        .basic_auth("filer", Some("wrong"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    server.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_upload_get_list_delete_roundtrip() {
    let root = tempfile::tempdir().unwrap();
    let (server, _tracker) = common::start_filer(root.path()).await;
    let base = format!("http://{}", server.local_addr());
    let client = common::test_client();

    // Upload into a nested path that does not exist yet.
    let part = reqwest::multipart::Part::bytes(CONTENT.to_vec()).file_name("hello.txt");
    let form = reqwest::multipart::Form::new().part("file", part);
    let response = client
        .post(format!("{base}/aaa/bbb"))
        .basic_auth("filer", Some("filer"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200, "upload failed");

    // Download it back.
    let response = client
        .get(format!("{base}/aaa/bbb/hello.txt?action=get"))
        .basic_auth("filer", Some("filer"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/octet-stream"
    );
    assert_eq!(response.bytes().await.unwrap().as_ref(), CONTENT);

    // The listing shows it with size and type.
    let response = client
        .get(format!("{base}/aaa/bbb?action=list"))
        .basic_auth("filer", Some("filer"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let listing: Value = response.json().await.unwrap();
    let entries = listing.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["name"], "hello.txt");
    assert_eq!(entries[0]["type"], "file");
    assert_eq!(entries[0]["size"], CONTENT.len() as u64);
    assert!(entries[0]["timestamp"].as_str().unwrap().contains('T'));

    // Getting a directory is not a file download.
    let response = client
        .get(format!("{base}/aaa/bbb?action=get"))
        .basic_auth("filer", Some("filer"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    // Delete the whole subtree, then the file is gone.
    let response = client
        .delete(format!("{base}/aaa"))
        .basic_auth("filer", Some("filer"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = client
        .get(format!("{base}/aaa/bbb/hello.txt?action=get"))
        .basic_auth("filer", Some("filer"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    // Deleting again is still not an error.
    let response = client
        .delete(format!("{base}/aaa"))
        .basic_auth("filer", Some("filer"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    server.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_unknown_action_rejected() {
    let root = tempfile::tempdir().unwrap();
    let (server, _tracker) = common::start_filer(root.path()).await;
    let base = format!("http://{}", server.local_addr());
    let client = common::test_client();

    for url in [format!("{base}/"), format!("{base}/?action=frobnicate")] {
        let response = client
            .get(url)
            .basic_auth("filer", Some("filer"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400);
    }

    server.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_path_traversal_rejected() {
    let root = tempfile::tempdir().unwrap();
    let (server, _tracker) = common::start_filer(root.path()).await;
    let addr = server.local_addr();

    // reqwest collapses dot segments, so talk raw HTTP.
    let status = common::raw_status(
        addr,
        "GET",
        "/../../etc/passwd?action=get",
        Some(("filer", "filer")),
    )
    .await;
    assert!(status.contains("400"), "expected 400, got: {status}");

    server.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_only_authenticated_requests_reset_idle_window() {
    let root = tempfile::tempdir().unwrap();
    let (server, tracker) = common::start_filer(root.path()).await;
    let base = format!("http://{}", server.local_addr());
    let client = common::test_client();

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(tracker.elapsed() >= Duration::from_millis(300));

    // Failed auth does not count as activity.
    client.get(format!("{base}/?action=list")).send().await.unwrap();
    assert!(tracker.elapsed() >= Duration::from_millis(300));

    // Authenticated traffic does.
    client
        .get(format!("{base}/?action=list"))
        .basic_auth("filer", Some("filer"))
        .send()
        .await
        .unwrap();
    assert!(tracker.elapsed() < Duration::from_millis(200));

    server.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_oversized_upload_rejected() {
    let root = tempfile::tempdir().unwrap();
    let (server, _tracker) = common::start_filer(root.path()).await;
    let base = format!("http://{}", server.local_addr());
    let client = common::test_client();

    // Default limit is 32<<16 bytes; push well past it.
    let part = reqwest::multipart::Part::bytes(vec![0u8; (32 << 16) + 4096]).file_name("big.bin");
    let form = reqwest::multipart::Form::new().part("file", part);
    let outcome = client
        .post(format!("{base}/big"))
        .basic_auth("filer", Some("filer"))
        .multipart(form)
        .send()
        .await;
    match outcome {
        Ok(response) => assert!(
            response.status().is_client_error(),
            "oversized upload got {}",
            response.status()
        ),
        // The server may drop the connection mid-body once the limit is hit;
        // either way the upload was refused.
        Err(_) => {}
    }

    assert!(
        !root.path().join("big/big.bin").exists(),
        "oversized upload was written"
    );

    server.shutdown(Duration::from_secs(1)).await;
}
