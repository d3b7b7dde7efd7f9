//! End-to-end test of the gateway over a real TCP socket.

use shmgate_api::{select_bridge, serve};
use shmgate_segment::SegmentRegistry;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

async fn request(addr: std::net::SocketAddr, method: &str, path: &str, body: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let raw = format!(
        "{method} {path} HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(raw.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

fn body(response: &str) -> serde_json::Value {
    let (_, body) = response.split_once("\r\n\r\n").unwrap();
    serde_json::from_str(body).unwrap()
}

#[tokio::test]
async fn test_serve_create_write_read_and_shutdown() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let registry = Arc::new(SegmentRegistry::new(select_bridge(true)));
    let (stop, stopped) = oneshot::channel::<()>();

    let server = tokio::spawn(serve(listener, registry.clone(), async move {
        let _ = stopped.await;
    }));

    let created = request(
        addr,
        "POST",
        "/create",
        r#"{"shm_key": 5678, "shm_segsz": 1024, "mode": "644"}"#,
    )
    .await;
    assert!(created.starts_with("HTTP/1.1 200"));
    let shmid = body(&created)["shm_shmid"].as_str().unwrap().to_string();

    let written = request(addr, "POST", &format!("/write/5678/{shmid}"), r#"{"data": "hello"}"#).await;
    assert!(written.starts_with("HTTP/1.1 200"));

    let read = request(addr, "GET", &format!("/read/5678/{shmid}"), "").await;
    assert_eq!(body(&read)["data"], "hello");

    let failed = request(addr, "GET", "/read/5678/999999", "").await;
    assert!(failed.starts_with("HTTP/1.1 500"));
    assert!(body(&failed)["err"].is_string());

    stop.send(()).unwrap();
    server.await.unwrap().unwrap();
    assert_eq!(registry.len(), 1);
}
