//! Minimal in-process HTTP/1.1 server for integration tests. No mocks: the
//! client talks to a real socket. Each connection serves one request and is
//! closed.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

#[derive(Debug, Clone)]
pub struct Route {
    pub method: &'static str,
    pub path: &'static str,
    pub status: u16,
    pub body: String,
    pub delay: Option<Duration>,
    /// Send headers and the first body byte, then wait this long before the rest.
    pub stall_body: Option<Duration>,
}

impl Route {
    pub fn json(method: &'static str, path: &'static str, status: u16, body: &str) -> Self {
        Self {
            method,
            path,
            status,
            body: body.to_string(),
            delay: None,
            stall_body: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn stalled_body(mut self, stall: Duration) -> Self {
        self.stall_body = Some(stall);
        self
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

pub struct TestServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    connections: Arc<AtomicUsize>,
}

impl TestServer {
    /// Bind to a free port and serve `routes` on a background thread.
    pub fn start(routes: Vec<Route>) -> Self {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        std_listener.set_nonblocking(true).unwrap();
        let port = std_listener.local_addr().unwrap().port();

        let requests = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));
        let (req_clone, conn_clone) = (requests.clone(), connections.clone());

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
                let routes = Arc::new(routes);
                loop {
                    let Ok((tcp, _)) = listener.accept().await else {
                        break;
                    };
                    conn_clone.fetch_add(1, Ordering::SeqCst);
                    let routes = routes.clone();
                    let requests = req_clone.clone();
                    tokio::spawn(async move {
                        serve(tcp, &routes, &requests).await;
                    });
                }
            });
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            requests,
            connections,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

/// A port with nothing listening on it.
pub fn free_port() -> u16 {
    let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    l.local_addr().unwrap().port()
}

pub fn healthy_route() -> Route {
    Route::json(
        "GET",
        "/health",
        200,
        r#"{"status":"healthy","ollama_accessible":true}"#,
    )
}

async fn serve(mut tcp: TcpStream, routes: &[Route], requests: &Mutex<Vec<RecordedRequest>>) {
    let Some(request) = read_request(&mut tcp).await else {
        return;
    };
    requests.lock().unwrap().push(request.clone());

    let route = routes
        .iter()
        .find(|r| r.method == request.method && r.path == request.path);
    let (status, body, delay, stall) = match route {
        Some(r) => (r.status, r.body.clone(), r.delay, r.stall_body),
        None => (404, r#"{"detail":"Not Found"}"#.to_string(), None, None),
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        reason(status),
        body.len(),
    );
    let _ = tcp.write_all(head.as_bytes()).await;
    let mut rest = body.as_bytes();
    if let Some(stall) = stall {
        let split = rest.len().min(1);
        let _ = tcp.write_all(&rest[..split]).await;
        let _ = tcp.flush().await;
        tokio::time::sleep(stall).await;
        rest = &rest[split..];
    }
    let _ = tcp.write_all(rest).await;
    let _ = tcp.shutdown().await;
}

async fn read_request(tcp: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = tcp.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let content_length = lines
        .filter_map(|l| l.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = tcp.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

    Some(RecordedRequest { method, path, body })
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
