use anyhow::Result;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use zymeflow::adapters::{ResolverClient, RetryPolicy};

/// Serves the given raw responses, one connection each, in order.
async fn scripted_server(responses: Vec<&'static str>) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?;

    tokio::spawn(async move {
        for response in responses {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut buffer = [0u8; 4096];
            let _ = socket.read(&mut buffer).await;
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    Ok(format!("http://{}/search", address))
}

fn client(max_retries: u32) -> ResolverClient {
    ResolverClient::new(RetryPolicy {
        max_retries,
        backoff_base: Duration::from_millis(5),
        ..RetryPolicy::default()
    })
}

#[tokio::test]
async fn test_service_unavailable_then_ok_succeeds() -> Result<()> {
    let url = scripted_server(vec![
        "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 15\r\nConnection: close\r\n\r\n{\"results\": []}",
    ])
    .await?;

    let response = client(2).get(&url, &[], Duration::from_secs(5)).await?;

    assert_eq!(response.status, 200);
    assert_eq!(response.body, "{\"results\": []}");
    Ok(())
}

#[tokio::test]
async fn test_unreachable_host_is_transient() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let err = client(1)
        .get(&format!("http://{}/search", address), &[], Duration::from_secs(2))
        .await
        .unwrap_err();

    assert!(err.is_transient());
    assert_eq!(err.status(), None);
}

#[test]
fn test_backoff_doubles_per_attempt() {
    let policy = RetryPolicy {
        backoff_base: Duration::from_millis(250),
        ..RetryPolicy::default()
    };

    assert_eq!(policy.delay_for(1), Duration::from_millis(250));
    assert_eq!(policy.delay_for(2), Duration::from_millis(500));
    assert_eq!(policy.delay_for(3), Duration::from_millis(1000));
}
