//! Minimal HTTP/1.1 servers for exercising outbound calls.

#![allow(dead_code)]

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Serve one request with a canned response. The handle yields the raw
/// request text.
pub async fn serve_once(
  status: u16,
  content_type: &'static str,
  body: &'static str,
) -> (String, JoinHandle<String>) {
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();

  let handle = tokio::spawn(async move {
    let (mut socket, _) = listener.accept().await.unwrap();
    let request = read_request(&mut socket).await;
    let reason = if status < 400 { "OK" } else { "Error" };
    let response = format!(
      "HTTP/1.1 {status} {reason}\r\ncontent-type: {content_type}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
      body.len()
    );
    socket.write_all(response.as_bytes()).await.unwrap();
    let _ = socket.shutdown().await;
    request
  });

  (format!("http://{addr}"), handle)
}

/// Accept connections and never answer.
pub async fn serve_silent() -> String {
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();

  tokio::spawn(async move {
    while let Ok((socket, _)) = listener.accept().await {
      tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(30)).await;
        drop(socket);
      });
    }
  });

  format!("http://{addr}")
}

/// A client that ignores proxy settings from the environment.
pub fn client() -> reqwest::Client {
  reqwest::Client::builder().no_proxy().build().unwrap()
}

async fn read_request(socket: &mut TcpStream) -> String {
  let mut buf = Vec::new();
  let mut chunk = [0u8; 1024];

  loop {
    let n = socket.read(&mut chunk).await.unwrap();
    if n == 0 {
      break;
    }
    buf.extend_from_slice(&chunk[..n]);

    if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
      let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
      let length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
      if buf.len() >= end + 4 + length {
        break;
      }
    }
  }

  String::from_utf8_lossy(&buf).into_owned()
}
