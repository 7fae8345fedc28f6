use peg_harness::readiness::{is_ready, wait_for_url, Poll, Readiness};
use peg_harness::{HarnessError, ProcessState, SupervisedProcess};
use reqwest::Client;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::process::Command;

/// Answer every request with `status` and an empty body.
async fn respond_with(status: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf).await;
                let head = format!(
                    "HTTP/1.1 {status}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                );
                let _ = stream.write_all(head.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });
    format!("http://{addr}/")
}

fn quick() -> Poll {
    Poll {
        interval: Duration::from_millis(20),
        timeout: Duration::from_millis(300),
    }
}

#[tokio::test]
async fn neo4j_style_readiness_accepts_unauthorized() {
    let url = respond_with("401 Unauthorized").await;
    let client = Client::new();

    assert!(is_ready(&client, &url, Readiness::BelowServerError).await);
    assert!(!is_ready(&client, &url, Readiness::Success).await);
    wait_for_url(&client, &url, Readiness::BelowServerError, quick())
        .await
        .unwrap();
}

#[tokio::test]
async fn server_errors_never_become_ready() {
    let url = respond_with("503 Service Unavailable").await;
    let err = wait_for_url(&Client::new(), &url, Readiness::BelowServerError, quick())
        .await
        .unwrap_err();
    assert!(matches!(err, HarnessError::Timeout { .. }), "{err:?}");
}

#[cfg(unix)]
#[tokio::test]
async fn process_lifecycle() {
    let url = respond_with("200 OK").await;
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg("sleep 30");

    let mut server = SupervisedProcess::spawn("dev-server", cmd).unwrap();
    assert_eq!(server.name(), "dev-server");
    assert_eq!(server.state(), &ProcessState::Starting);

    server
        .wait_ready(&Client::new(), &url, Readiness::Success, quick())
        .await
        .unwrap();
    assert_eq!(server.state(), &ProcessState::Ready);

    server.stop(Duration::from_secs(2)).await;
    assert_eq!(server.state(), &ProcessState::Stopped);
    assert_eq!(server.state().to_string(), "stopped");
}
